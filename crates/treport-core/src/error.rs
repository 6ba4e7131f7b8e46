//! # Error Hierarchy
//!
//! Structured error types for the report model, built with `thiserror`.
//! Validation of whole documents is not an error path here: the schema
//! crate returns issue lists as values. These errors cover parsing a wire
//! document into a typed version and constructing branded primitives.

use thiserror::Error;

/// Top-level error type for the report model.
#[derive(Error, Debug)]
pub enum TreportError {
    /// The `version` field is present but is not a non-negative integer.
    #[error("invalid version tag: {0} (expected a non-negative integer)")]
    InvalidVersionTag(String),

    /// The document carries a version this build has no typed shape for.
    #[error("unsupported report version {0}")]
    UnsupportedVersion(u64),

    /// A branded primitive rejected its input.
    #[error("primitive error: {0}")]
    Primitive(#[from] PrimitiveError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Construction errors for branded primitives and telemetry.
///
/// Each variant carries the offending input so a producer can see what it
/// emitted without re-running the generator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PrimitiveError {
    /// Commit ids are full 40-character git object names.
    #[error("invalid commit id \"{0}\" (expected exactly 40 characters)")]
    InvalidCommitId(String),

    /// Attachment ids must be 1–1024 characters.
    #[error("invalid attachment id of length {0} (expected 1-1024 characters)")]
    InvalidAttachmentId(usize),

    /// Line and column numbers start at 1.
    #[error("1-based number must be at least 1, got 0")]
    ZeroOneBased,

    /// Telemetry samples must be supplied in non-decreasing time order.
    #[error("telemetry sample at {current} ms precedes previous sample at {previous} ms")]
    NonMonotonicTelemetry {
        /// Absolute timestamp of the previous sample.
        previous: u64,
        /// Absolute timestamp of the offending sample.
        current: u64,
    },
}
