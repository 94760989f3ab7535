use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// who made a change, and when
///
/// rendered as `name <email> timestamp ±HHMM`. the offset is stored the way it
/// is printed: `530` means `+0530`, `-300` means `-0300`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub email: String,
    /// seconds since the unix epoch
    pub timestamp: i64,
    /// utc offset as signed HHMM
    pub offset: i32,
}

impl Identity {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        timestamp: i64,
        offset: i32,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            timestamp,
            offset,
        }
    }

    /// same person, different point in time
    pub fn at(&self, timestamp: i64) -> Self {
        Self {
            timestamp,
            ..self.clone()
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} <{}> {} {:+05}",
            self.name, self.email, self.timestamp, self.offset
        )
    }
}

impl FromStr for Identity {
    type Err = Error;

    /// parse `name <email> timestamp ±HHMM`
    fn from_str(s: &str) -> Result<Self> {
        let malformed = || Error::CorruptObjectMessage(format!("malformed identity: {s}"));

        let open = s.find(" <").ok_or_else(malformed)?;
        let close = s.rfind("> ").ok_or_else(malformed)?;
        if close < open {
            return Err(malformed());
        }

        let mut when = s[close + 2..].split(' ');
        let timestamp = when
            .next()
            .and_then(|t| t.parse::<i64>().ok())
            .ok_or_else(malformed)?;
        let offset = when
            .next()
            .filter(|o| o.len() == 5 && (o.starts_with('+') || o.starts_with('-')))
            .and_then(|o| o.parse::<i32>().ok())
            .ok_or_else(malformed)?;
        if when.next().is_some() {
            return Err(malformed());
        }

        Ok(Self {
            name: s[..open].to_string(),
            email: s[open + 2..close].to_string(),
            timestamp,
            offset,
        })
    }
}
