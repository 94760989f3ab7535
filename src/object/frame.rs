use std::fmt;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::str::FromStr;

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::error::{Error, Result};
use crate::hash::{hash_frame, Hash};

/// the three kinds of object this store understands
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Blob,
    Tree,
    Commit,
}

impl ObjectKind {
    /// the tag written at the start of a frame
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Blob => "blob",
            ObjectKind::Tree => "tree",
            ObjectKind::Commit => "commit",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "blob" => Ok(ObjectKind::Blob),
            "tree" => Ok(ObjectKind::Tree),
            "commit" => Ok(ObjectKind::Commit),
            other => Err(Error::InvalidObjectType(other.to_string())),
        }
    }
}

/// an object ready to be stored: its id and the zlib-compressed frame
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedObject {
    pub kind: ObjectKind,
    pub hash: Hash,
    pub compressed: Vec<u8>,
}

/// build the frame `<kind> <len>\0<payload>`, len counted in bytes
pub fn frame(kind: ObjectKind, payload: &[u8]) -> Vec<u8> {
    let header = format!("{} {}\0", kind, payload.len());
    let mut out = Vec::with_capacity(header.len() + payload.len());
    out.extend_from_slice(header.as_bytes());
    out.extend_from_slice(payload);
    out
}

/// hash and compress a canonical payload
pub fn encode_object(kind: ObjectKind, payload: &[u8]) -> Result<EncodedObject> {
    let framed = frame(kind, payload);
    let hash = hash_frame(&framed);
    let compressed = deflate(&framed)?;
    Ok(EncodedObject {
        kind,
        hash,
        compressed,
    })
}

fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).map_err(zlib_error)?;
    encoder.finish().map_err(zlib_error)
}

/// decompress stored bytes back into a frame
pub fn inflate(compressed: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    ZlibDecoder::new(compressed)
        .read_to_end(&mut out)
        .map_err(zlib_error)?;
    Ok(out)
}

fn zlib_error(source: std::io::Error) -> Error {
    Error::Io {
        path: PathBuf::from("<zlib>"),
        source,
    }
}

/// split a frame into its kind and payload, checking the declared length
pub fn split_frame(framed: &[u8]) -> Result<(ObjectKind, &[u8])> {
    let nul = framed
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| Error::CorruptObjectMessage("frame header not terminated".to_string()))?;
    let header = std::str::from_utf8(&framed[..nul])
        .map_err(|_| Error::CorruptObjectMessage("frame header is not utf-8".to_string()))?;
    let (kind, len) = header
        .split_once(' ')
        .ok_or_else(|| Error::CorruptObjectMessage(format!("malformed frame header: {header}")))?;
    let kind: ObjectKind = kind.parse()?;
    let len: usize = len
        .parse()
        .map_err(|_| Error::CorruptObjectMessage(format!("bad frame length: {len}")))?;

    let payload = &framed[nul + 1..];
    if payload.len() != len {
        return Err(Error::CorruptObjectMessage(format!(
            "frame declares {} bytes, found {}",
            len,
            payload.len()
        )));
    }
    Ok((kind, payload))
}

/// inflate stored bytes, verify they hash to `expected`, and split the frame
pub fn decode_object(expected: &Hash, compressed: &[u8]) -> Result<(ObjectKind, Vec<u8>)> {
    let framed = inflate(compressed)?;
    if hash_frame(&framed) != *expected {
        return Err(Error::CorruptObject(*expected));
    }
    let (kind, payload) = split_frame(&framed)?;
    Ok((kind, payload.to_vec()))
}
