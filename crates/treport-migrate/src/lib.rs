//! # treport-migrate — Report Migration Pipeline
//!
//! Upgrades test-execution reports written in an older schema version to
//! the current shape. Migration is pure: the input is borrowed, the output
//! is a new value, and running it on an already-current document returns
//! an equal document.
//!
//! Two entry points cover the two ways a report is held:
//!
//! - [`migrate_value`] works on the raw JSON tree. It moves and drops only
//!   the fields a step names, so everything else (including number
//!   encodings and fields no shape models) survives exactly.
//! - [`migrate`] converts a parsed [`ReportDocument`](treport_core::ReportDocument)
//!   into a typed current [`Report`](treport_core::Report).
//!
//! ## Version 0 to 1
//!
//! - `opaqueData` is removed from the report root and from every
//!   environment.
//! - `Environment.userSuppliedData` becomes `Environment.metadata`.
//! - The output is tagged `"version": 1`.
//!
//! ## Crate Policy
//!
//! - Depends only on `treport-core` internally.
//! - Output is not validated. Run `treport-schema` afterwards when a
//!   guarantee is needed.

pub mod error;
pub mod pipeline;
pub mod typed;

pub use error::MigrationError;
pub use pipeline::{migrate_value, source_version, MigrationStep, STEPS};
pub use typed::{migrate, upgrade_v0};
