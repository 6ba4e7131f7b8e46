//! # treport-schema — Report Validation Engine
//!
//! Validates test-execution report documents against the rules for one
//! schema version and reports every violation as a (JSON Pointer, message)
//! pair.
//!
//! ## Runtime Validation (`validate`)
//!
//! The [`validate`](mod@validate) module embeds one JSON Schema (Draft 2020-12) per report
//! version under `schemas/`, compiles it with the `jsonschema` crate, and
//! adds a cross-reference pass that checks every `environmentIdx` against
//! the report's `environments`. Key entry points:
//!
//! - [`ReportValidator::validate`]: reusable compiled validator.
//! - [`validate()`]: one-shot validation against the current version.
//!
//! ## Issue Reports (`issues`)
//!
//! [`ValidationIssues`] keeps every issue but renders at most
//! [`MAX_REPORTED_ISSUES`] of them followed by `...and N more issues...`.
//!
//! ## Crate Policy
//!
//! - Depends only on `treport-core` internally.
//! - Validation never repairs a document. The outcome is pass or fail plus
//!   diagnostics.
//! - A failed validation is a value (`Some(issues)`), not an `Err`. Errors
//!   are reserved for the validator itself being unusable.

pub mod config;
pub mod issues;
pub mod validate;

pub use config::{ValidatorConfig, MAX_REPORTED_ISSUES};
pub use issues::{format_issues, ValidationIssue, ValidationIssues};
pub use validate::{validate, ReportValidator, SchemaError, SchemaVersion};
