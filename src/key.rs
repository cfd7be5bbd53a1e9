//! Short Key Module
//!
//! Parses request paths into validated short keys.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// == Public Constants ==
/// Maximum allowed key length in characters
pub const MAX_KEY_LENGTH: usize = 64;

// == Invalid Key Error ==
/// Reasons a path cannot be turned into a [`ShortKey`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidKeyError {
    #[error("key is empty")]
    Empty,

    #[error("key is {len} characters, maximum is {}", MAX_KEY_LENGTH)]
    TooLong { len: usize },

    #[error("key contains disallowed character {ch:?}")]
    InvalidChar { ch: char },
}

// == Short Key ==
/// A validated, case-sensitive short-link key.
///
/// Always 1..=64 characters from `[A-Za-z0-9_-]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShortKey(String);

impl ShortKey {
    /// Validates a bare key (no leading separator).
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidKeyError> {
        let raw = raw.into();
        validate(&raw)?;
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ShortKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ShortKey {
    type Error = InvalidKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ShortKey> for String {
    fn from(key: ShortKey) -> Self {
        key.0
    }
}

// == Parse ==
/// Parses a request path such as `/abc123` into a [`ShortKey`].
///
/// Exactly one leading `/` is stripped; anything after it must be a valid key,
/// so `//abc` and `/a/b` are rejected.
pub fn parse(path: &str) -> Result<ShortKey, InvalidKeyError> {
    let raw = path.strip_prefix('/').unwrap_or(path);
    ShortKey::new(raw)
}

fn validate(raw: &str) -> Result<(), InvalidKeyError> {
    if raw.is_empty() {
        return Err(InvalidKeyError::Empty);
    }

    let len = raw.chars().count();
    if len > MAX_KEY_LENGTH {
        return Err(InvalidKeyError::TooLong { len });
    }

    if let Some(ch) = raw.chars().find(|c| !is_key_char(*c)) {
        return Err(InvalidKeyError::InvalidChar { ch });
    }

    Ok(())
}

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}
