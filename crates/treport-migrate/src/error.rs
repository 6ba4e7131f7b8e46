//! Migration errors.

use thiserror::Error;

/// Error during report migration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MigrationError {
    /// The `version` field is present but is not a non-negative integer.
    #[error("unrecognized report version tag: {0}")]
    UnrecognizedVersion(String),

    /// The document root is not a JSON object.
    #[error("report document must be a JSON object")]
    NotAnObject,

    /// An older version has no registered step to move it forward.
    #[error("no migration step registered from version {from}")]
    NoMigrationPath {
        /// Version the chain stalled at.
        from: u64,
    },
}
