//! # Branded Primitives
//!
//! Newtypes over the plain strings and numbers that appear in a report.
//! Each one is a distinct type, so a [`DurationMS`] cannot be passed where a
//! [`UnixTimestampMS`] is expected, and a [`CommitId`] cannot be confused
//! with an [`AttachmentId`].
//!
//! ## Validation
//!
//! All newtypes serialize transparently as their underlying value. Checked
//! constructors (`new`) enforce the same bounds the schema validator applies
//! to wire documents. Deserialization does not re-check them; whole
//! documents are checked by the schema validator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::PrimitiveError;

/// Exact length of a git commit id (hex SHA-1).
pub const COMMIT_ID_LEN: usize = 40;

/// Maximum length of an attachment id.
pub const ATTACHMENT_ID_MAX_LEN: usize = 1024;

// ---------------------------------------------------------------------------
// String-based primitives
// ---------------------------------------------------------------------------

/// A full git commit id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommitId(String);

impl CommitId {
    /// Create a commit id, rejecting anything that is not exactly 40 characters.
    ///
    /// # Errors
    ///
    /// Returns [`PrimitiveError::InvalidCommitId`] on a length mismatch.
    pub fn new(value: impl Into<String>) -> Result<Self, PrimitiveError> {
        let s = value.into();
        if s.chars().count() != COMMIT_ID_LEN {
            return Err(PrimitiveError::InvalidCommitId(s));
        }
        Ok(Self(s))
    }

    /// Access the commit id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CommitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of an out-of-band attachment payload.
///
/// By convention the id is a content hash of the payload bytes, which makes
/// the attachment store content-addressed and deduplicating.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttachmentId(String);

impl AttachmentId {
    /// Create an attachment id from an arbitrary string of 1–1024 characters.
    ///
    /// # Errors
    ///
    /// Returns [`PrimitiveError::InvalidAttachmentId`] if the id is empty or
    /// longer than [`ATTACHMENT_ID_MAX_LEN`].
    pub fn new(value: impl Into<String>) -> Result<Self, PrimitiveError> {
        let s = value.into();
        let len = s.chars().count();
        if len == 0 || len > ATTACHMENT_ID_MAX_LEN {
            return Err(PrimitiveError::InvalidAttachmentId(len));
        }
        Ok(Self(s))
    }

    /// Derive the conventional id for a payload: lowercase hex SHA-256.
    pub fn from_content(bytes: &[u8]) -> Self {
        Self(to_hex(&Sha256::digest(bytes)))
    }

    /// Access the id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AttachmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A POSIX-style path relative to the repository checkout root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GitFilePath(String);

impl GitFilePath {
    /// Wrap a path that is already POSIX-style and repository-relative.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Normalize a path produced on any platform: backslash separators become
    /// `/` and leading `./` segments are dropped.
    pub fn from_native(path: &str) -> Self {
        let mut s = path.replace('\\', "/");
        while let Some(rest) = s.strip_prefix("./") {
            s = rest.to_string();
        }
        Self(s)
    }

    /// Access the path string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for GitFilePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Numeric primitives
// ---------------------------------------------------------------------------

/// Milliseconds since the Unix epoch.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UnixTimestampMS(pub u64);

impl UnixTimestampMS {
    /// Convert to a UTC datetime. Returns `None` past chrono's supported range.
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        let ms = i64::try_from(self.0).ok()?;
        DateTime::from_timestamp_millis(ms)
    }

    /// Build from a UTC datetime. Pre-epoch instants clamp to zero.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(u64::try_from(dt.timestamp_millis()).unwrap_or(0))
    }

    /// The instant `duration` after this one, saturating on overflow.
    pub fn after(self, duration: DurationMS) -> Self {
        Self(self.0.saturating_add(duration.0))
    }
}

/// A non-negative span of time in milliseconds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct DurationMS(pub u64);

impl From<std::time::Duration> for DurationMS {
    fn from(d: std::time::Duration) -> Self {
        Self(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }
}

/// Render bytes as a lowercase hex string.
fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// A line or column number, counted from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Number1Based(u64);

impl Number1Based {
    /// Create a 1-based number.
    ///
    /// # Errors
    ///
    /// Returns [`PrimitiveError::ZeroOneBased`] for zero.
    pub fn new(value: u64) -> Result<Self, PrimitiveError> {
        if value == 0 {
            return Err(PrimitiveError::ZeroOneBased);
        }
        Ok(Self(value))
    }

    /// The underlying value.
    pub fn get(self) -> u64 {
        self.0
    }
}
