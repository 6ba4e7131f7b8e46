#![deny(missing_docs)]

//! # treport-core — Entity Model for Test-Execution Reports
//!
//! This crate defines the in-memory shape of a test-execution report: the
//! interchange document that test-runner adapters produce (`report.json`)
//! and that viewers and uploaders consume. It has no internal crate
//! dependencies. It uses only `serde`, `serde_json`, `thiserror`, `chrono`, and
//! `sha2` from the external ecosystem.
//!
//! ## Design Principles
//!
//! 1. **Versioned shapes, not inheritance.** Each schema version lives in its
//!    own module ([`model::v0`], [`model::v1`]) as a fully self-contained set
//!    of types. [`ReportDocument`] is the sum type keyed by the explicit
//!    `version` field.
//!
//! 2. **Branded primitives.** [`CommitId`], [`AttachmentId`],
//!    [`UnixTimestampMS`], [`DurationMS`], [`Number1Based`], and
//!    [`GitFilePath`] are distinct types over plain strings and numbers. You
//!    cannot pass a duration where a timestamp is expected.
//!
//! 3. **Telemetry keeps its wire encoding.** [`Telemetry`] stores samples
//!    exactly as they appear on the wire (first timestamp absolute, later ones
//!    deltas) and decodes on demand.
//!
//! 4. **Traversal hands out immutable ancestor lists.** [`walk`] visits every
//!    test under `Report.suites` with an [`Ancestors`] list that is cheap to
//!    clone and safe to retain.
//!
//! ## Crate Policy
//!
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - Reports are built wholesale, validated once, then treated as immutable.

pub mod category;
pub mod error;
pub mod identity;
pub mod model;
pub mod telemetry;
pub mod walk;

// Re-export primary types at crate root for ergonomic imports.
pub use error::{PrimitiveError, TreportError};
pub use identity::{AttachmentId, CommitId, DurationMS, GitFilePath, Number1Based, UnixTimestampMS};
pub use model::v1::{
    Annotation, Attachment, Environment, Location, MetadataValue, Report, ReportError, RunAttempt,
    Source, StdioEntry, Suite, SuiteType, SystemData, SystemUtilization, SystemUtilizationSample,
    Test, TestStatus, TestStep,
};
pub use model::{document_version, ReportDocument, VersionTag, CURRENT_VERSION, LEGACY_VERSION};
pub use telemetry::{Percent, Telemetry, TelemetrySample};
pub use walk::{find_test, visit_tests, visit_tests_async, Ancestors, TestWalk};
