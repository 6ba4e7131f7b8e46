//! # Versioned Report Shapes
//!
//! Each schema version is a self-contained module. Versions share naming
//! conventions only; no struct is reused across versions, so a change to
//! the current shape can never leak into a legacy one.
//!
//! | Version | Module | Notes |
//! |---------|--------|-------|
//! | 0 | [`v0`] | `Environment.userSuppliedData`, `opaqueData` blobs, no version tag required |
//! | 1 | [`v1`] | `Environment.metadata`, opaque blobs removed |
//!
//! [`ReportDocument`] dispatches a wire document to the right shape using
//! its `version` field. Documents without a `version` field predate version
//! tagging and are treated as version 0.

pub mod v0;
pub mod v1;

use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::error::TreportError;

/// The version tag stamped on every document this build produces.
pub const CURRENT_VERSION: u64 = v1::VERSION as u64;

/// The version assumed for documents that carry no `version` field.
pub const LEGACY_VERSION: u64 = v0::VERSION as u64;

/// A literal version tag.
///
/// Serializes as the integer `V` and refuses to deserialize anything else,
/// so a typed report can only ever claim the version its shape belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct VersionTag<const V: u32>;

impl<const V: u32> VersionTag<V> {
    /// The tagged version number.
    pub const fn get(self) -> u32 {
        V
    }
}

impl<const V: u32> Serialize for VersionTag<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(V)
    }
}

impl<'de, const V: u32> Deserialize<'de> for VersionTag<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TagVisitor<const V: u32>;

        impl<'de, const V: u32> Visitor<'de> for TagVisitor<V> {
            type Value = VersionTag<V>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "the integer {}", V)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                if v == u64::from(V) {
                    Ok(VersionTag)
                } else {
                    Err(E::invalid_value(de::Unexpected::Unsigned(v), &self))
                }
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                match u64::try_from(v) {
                    Ok(u) => self.visit_u64(u),
                    Err(_) => Err(E::invalid_value(de::Unexpected::Signed(v), &self)),
                }
            }
        }

        deserializer.deserialize_u64(TagVisitor::<V>)
    }
}

/// Read the version of a wire document.
///
/// A missing `version` field means [`LEGACY_VERSION`]. Any value that is
/// not a non-negative integer is rejected.
///
/// # Errors
///
/// Returns [`TreportError::InvalidVersionTag`] for a malformed tag.
pub fn document_version(document: &Value) -> Result<u64, TreportError> {
    match document.get("version") {
        None => Ok(LEGACY_VERSION),
        Some(tag) => tag
            .as_u64()
            .ok_or_else(|| TreportError::InvalidVersionTag(tag.to_string())),
    }
}

/// A report in any schema version this build understands.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportDocument {
    /// Legacy shape.
    V0(v0::Report),
    /// Current shape.
    V1(v1::Report),
}

impl ReportDocument {
    /// Parse a wire document into its typed shape, dispatching on `version`.
    ///
    /// # Errors
    ///
    /// - [`TreportError::InvalidVersionTag`] if the tag is malformed.
    /// - [`TreportError::UnsupportedVersion`] if no typed shape exists.
    /// - [`TreportError::Json`] if the document does not fit the shape.
    pub fn from_value(document: Value) -> Result<Self, TreportError> {
        match document_version(&document)? {
            0 => Ok(Self::V0(serde_json::from_value(document)?)),
            1 => Ok(Self::V1(serde_json::from_value(document)?)),
            other => Err(TreportError::UnsupportedVersion(other)),
        }
    }

    /// Parse `report.json` text.
    ///
    /// # Errors
    ///
    /// Same as [`ReportDocument::from_value`], plus JSON syntax errors.
    pub fn from_json_str(json: &str) -> Result<Self, TreportError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// The schema version of this document.
    pub fn version(&self) -> u64 {
        match self {
            Self::V0(_) => LEGACY_VERSION,
            Self::V1(_) => CURRENT_VERSION,
        }
    }

    /// Whether the document already has the current shape.
    pub fn is_current(&self) -> bool {
        matches!(self, Self::V1(_))
    }

    /// Serialize back to a wire document.
    ///
    /// # Errors
    ///
    /// Returns [`TreportError::Json`] if serialization fails.
    pub fn to_value(&self) -> Result<Value, TreportError> {
        let value = match self {
            Self::V0(report) => serde_json::to_value(report)?,
            Self::V1(report) => serde_json::to_value(report)?,
        };
        Ok(value)
    }
}
