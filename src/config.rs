use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{IoResultExt, Result};
use crate::types::{Identity, MODE_REGULAR};

/// generator configuration, stored as toml
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
}

impl Config {
    /// load config from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).with_path(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).with_path(path)?;
        Ok(())
    }
}

/// author and committer used for every generated commit
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub name: String,
    pub email: String,
    /// utc offset as signed HHMM
    pub offset: i32,
}

impl IdentityConfig {
    /// the configured identity at a given time
    pub fn at(&self, timestamp: i64) -> Identity {
        Identity::new(self.name.clone(), self.email.clone(), timestamp, self.offset)
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            name: "commitgen".to_string(),
            email: "commitgen@localhost".to_string(),
            offset: 0,
        }
    }
}

/// which commits to generate
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// timestamp of the first commit
    pub start: i64,
    /// exclusive upper bound on commit timestamps
    pub end: i64,
    /// seconds between commits
    pub step: u64,
    /// name of the single file in every tree
    pub file_name: String,
    pub file_mode: u32,
    /// file content, `{index}` and `{timestamp}` are substituted
    pub content_template: String,
    /// commit message, same substitutions as the content
    pub message_template: String,
    /// report progress every this many commits (0 disables)
    pub progress_interval: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            start: 0,
            end: u32::MAX as i64,
            step: 10800,
            file_name: "README.md".to_string(),
            file_mode: MODE_REGULAR,
            content_template: "Commit {index}".to_string(),
            message_template: "Commit {index}".to_string(),
            progress_interval: 1000,
        }
    }
}
