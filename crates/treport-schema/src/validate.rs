//! # Report Validation
//!
//! Checks a wire document against the rules for one schema version and
//! returns every violation found. Validation runs in two passes:
//!
//! 1. **Structural.** The document is checked against the embedded JSON
//!    Schema (Draft 2020-12) for its version: required fields, primitive
//!    types, length and range bounds, enum membership, and the recursive
//!    Suite and TestStep shapes via `$ref`.
//!
//! 2. **Cross-reference.** Every `RunAttempt.environmentIdx` under
//!    `suites` and the root-level `tests` must index into `environments`.
//!    This pass walks the JSON tree with an explicit stack. It is skipped
//!    when `environments` is not an array, since the structural pass has
//!    already reported that.
//!
//! Both passes always run to completion. Issues are reported in pass
//! order, and in document order within the cross-reference pass.
//!
//! ## Schema Resolution
//!
//! Schemas are compiled into the binary with `include_str!`. All `$ref`s
//! are internal (`#/$defs/<name>`), so no retriever is installed and no
//! network access is ever attempted.

use std::fmt;

use jsonschema::Validator;
use serde_json::Value;
use thiserror::Error;
use treport_core::{document_version, model, Report, TreportError};

use crate::config::ValidatorConfig;
use crate::issues::{ValidationIssue, ValidationIssues};

const REPORT_V0_SCHEMA: &str = include_str!("../schemas/report.v0.schema.json");
const REPORT_V1_SCHEMA: &str = include_str!("../schemas/report.v1.schema.json");

/// Error during report validation.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The document did not conform to its schema.
    #[error("report failed validation:\n{0}")]
    Invalid(ValidationIssues),

    /// An embedded schema failed to parse or compile.
    #[error("schema for report version {version} failed to compile: {reason}")]
    SchemaCompile {
        /// Version whose schema failed.
        version: u64,
        /// Compiler message.
        reason: String,
    },

    /// No schema exists for this version.
    #[error("no schema for report version {0}")]
    UnknownVersion(u64),

    /// The document's version tag could not be read.
    #[error(transparent)]
    Document(#[from] TreportError),

    /// A typed report could not be serialized for validation.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Schema versions this crate can validate against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaVersion {
    /// Legacy shape.
    V0,
    /// Current shape.
    V1,
}

impl SchemaVersion {
    /// The version every newly produced report must satisfy.
    pub const CURRENT: Self = Self::V1;

    /// All known versions, oldest first.
    pub const ALL: [Self; 2] = [Self::V0, Self::V1];

    /// Look up a version by its numeric tag.
    pub fn from_number(version: u64) -> Option<Self> {
        match version {
            0 => Some(Self::V0),
            1 => Some(Self::V1),
            _ => None,
        }
    }

    /// The numeric tag.
    pub fn number(self) -> u64 {
        match self {
            Self::V0 => model::LEGACY_VERSION,
            Self::V1 => model::CURRENT_VERSION,
        }
    }

    fn source(self) -> &'static str {
        match self {
            Self::V0 => REPORT_V0_SCHEMA,
            Self::V1 => REPORT_V1_SCHEMA,
        }
    }

    /// The parsed JSON Schema document for this version.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::SchemaCompile`] if the embedded text is not
    /// valid JSON.
    pub fn schema(self) -> Result<Value, SchemaError> {
        serde_json::from_str(self.source()).map_err(|e| SchemaError::SchemaCompile {
            version: self.number(),
            reason: e.to_string(),
        })
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.number())
    }
}

/// A compiled validator for one schema version.
///
/// Build once and reuse; a `ReportValidator` is `Send + Sync`.
pub struct ReportValidator {
    version: SchemaVersion,
    config: ValidatorConfig,
    validator: Validator,
}

impl fmt::Debug for ReportValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportValidator")
            .field("version", &self.version)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ReportValidator {
    /// Compile the schema for `version`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::SchemaCompile`] if the embedded schema is
    /// broken.
    pub fn new(version: SchemaVersion, config: ValidatorConfig) -> Result<Self, SchemaError> {
        let schema = version.schema()?;
        let validator = jsonschema::options()
            .with_draft(jsonschema::Draft::Draft202012)
            .build(&schema)
            .map_err(|e| SchemaError::SchemaCompile {
                version: version.number(),
                reason: e.to_string(),
            })?;
        tracing::debug!(%version, "compiled report schema");
        Ok(Self {
            version,
            config,
            validator,
        })
    }

    /// A validator for the current version with default settings.
    ///
    /// # Errors
    ///
    /// Same as [`ReportValidator::new`].
    pub fn current() -> Result<Self, SchemaError> {
        Self::new(SchemaVersion::CURRENT, ValidatorConfig::default())
    }

    /// A validator for whichever version `document` is tagged with.
    ///
    /// # Errors
    ///
    /// - [`SchemaError::Document`] if the tag is malformed.
    /// - [`SchemaError::UnknownVersion`] if no schema exists for the tag.
    pub fn for_document(document: &Value, config: ValidatorConfig) -> Result<Self, SchemaError> {
        let number = document_version(document)?;
        let version = SchemaVersion::from_number(number).ok_or(SchemaError::UnknownVersion(number))?;
        Self::new(version, config)
    }

    /// The version this validator checks.
    pub fn version(&self) -> SchemaVersion {
        self.version
    }

    /// The active configuration.
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Validate a wire document. `None` means the document is valid.
    pub fn validate(&self, document: &Value) -> Option<ValidationIssues> {
        let mut issues: Vec<ValidationIssue> = self
            .validator
            .iter_errors(document)
            .map(|e| ValidationIssue::new(e.instance_path.to_string(), e.to_string()))
            .collect();

        if self.config.check_environment_refs {
            check_environment_refs(document, &mut issues);
        }

        if !issues.is_empty() {
            tracing::debug!(
                version = %self.version,
                issues = issues.len(),
                "report failed validation"
            );
        }
        ValidationIssues::with_cap(issues, self.config.max_reported_issues)
    }

    /// Validate a typed current-version report.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Json`] if the report cannot be serialized.
    pub fn validate_report(&self, report: &Report) -> Result<Option<ValidationIssues>, SchemaError> {
        let document = serde_json::to_value(report)?;
        Ok(self.validate(&document))
    }

    /// Validate and convert failure into an error, for `?` chains.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Invalid`] carrying every issue found.
    pub fn check(&self, document: &Value) -> Result<(), SchemaError> {
        match self.validate(document) {
            None => Ok(()),
            Some(issues) => Err(SchemaError::Invalid(issues)),
        }
    }
}

/// Validate `document` against the current schema with default settings.
///
/// Compiles the schema on every call; hold a [`ReportValidator`] when
/// validating many documents.
///
/// # Errors
///
/// Returns [`SchemaError::SchemaCompile`] if the embedded schema is broken.
pub fn validate(document: &Value) -> Result<Option<ValidationIssues>, SchemaError> {
    Ok(ReportValidator::current()?.validate(document))
}

// ---------------------------------------------------------------------------
// Cross-reference pass
// ---------------------------------------------------------------------------

enum Node<'v> {
    Suite(&'v Value, String),
    Tests(&'v Value, String),
}

/// Report every attempt whose `environmentIdx` is outside `environments`.
///
/// Attempts with a missing or non-integer index are left to the structural
/// pass.
fn check_environment_refs(document: &Value, issues: &mut Vec<ValidationIssue>) {
    let Some(count) = document.get("environments").and_then(Value::as_array).map(Vec::len) else {
        return;
    };

    let mut stack: Vec<Node<'_>> = Vec::new();
    if let Some(suites) = document.get("suites").and_then(Value::as_array) {
        for (i, suite) in suites.iter().enumerate().rev() {
            stack.push(Node::Suite(suite, format!("/suites/{i}")));
        }
    }
    if let Some(tests) = document.get("tests") {
        // Root-level tests come after the suite forest.
        stack.insert(0, Node::Tests(tests, "/tests".to_string()));
    }

    while let Some(node) = stack.pop() {
        match node {
            Node::Suite(suite, path) => {
                if let Some(children) = suite.get("suites").and_then(Value::as_array) {
                    for (i, child) in children.iter().enumerate().rev() {
                        stack.push(Node::Suite(child, format!("{path}/suites/{i}")));
                    }
                }
                if let Some(tests) = suite.get("tests") {
                    stack.push(Node::Tests(tests, format!("{path}/tests")));
                }
            }
            Node::Tests(tests, path) => {
                let Some(tests) = tests.as_array() else {
                    continue;
                };
                for (t, test) in tests.iter().enumerate() {
                    let Some(attempts) = test.get("attempts").and_then(Value::as_array) else {
                        continue;
                    };
                    for (a, attempt) in attempts.iter().enumerate() {
                        let Some(idx) = attempt.get("environmentIdx").and_then(Value::as_u64) else {
                            continue;
                        };
                        if idx >= count as u64 {
                            issues.push(ValidationIssue::new(
                                format!("{path}/{t}/attempts/{a}/environmentIdx"),
                                format!(
                                    "environment index {idx} is out of range ({count} environments defined)"
                                ),
                            ));
                        }
                    }
                }
            }
        }
    }
}
