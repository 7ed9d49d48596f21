// Content identifiers
//
// Identity for cached resolvables, captures and graphics APIs. Content ids
// are blake3 digests of a canonical serialisation, so equal keys always map
// to the same id.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix used by the string form of a content id
const CONTENT_ID_PREFIX: &str = "cid:";

/// Error type for parsing content ids
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContentIdError {
    /// Missing prefix or non-hex characters
    #[error("Invalid content id format: {0}")]
    InvalidFormat(String),

    /// Wrong digest length
    #[error("Invalid content id length: expected 32 bytes, found {0}")]
    InvalidLength(usize),
}

/// A 32-byte blake3 content identifier
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentId([u8; 32]);

impl ContentId {
    /// Hash raw bytes into a content id
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(*blake3::hash(bytes).as_bytes())
    }

    /// Hash the canonical JSON form of a value
    pub fn of<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        let bytes = serde_json::to_vec(value)?;
        Ok(Self::from_bytes(&bytes))
    }

    /// Raw digest bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lower-case hex digest without the prefix
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse the `cid:<hex>` form produced by `Display`
    pub fn parse(s: &str) -> Result<Self, ContentIdError> {
        let digest = s
            .strip_prefix(CONTENT_ID_PREFIX)
            .ok_or_else(|| ContentIdError::InvalidFormat(s.to_string()))?;
        let bytes = hex::decode(digest).map_err(|e| ContentIdError::InvalidFormat(e.to_string()))?;
        let data: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| ContentIdError::InvalidLength(bytes.len()))?;
        Ok(Self(data))
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", CONTENT_ID_PREFIX, self.to_hex())
    }
}

impl fmt::Debug for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentId({})", self)
    }
}

/// Identifies a loaded capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CaptureId(pub ContentId);

impl fmt::Display for CaptureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "capture<{}>", self.0)
    }
}

/// Identifies the graphics API that owns a state object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApiId(pub u32);

impl fmt::Display for ApiId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "api<{}>", self.0)
    }
}
