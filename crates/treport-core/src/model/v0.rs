//! # Report Shape, Version 0 (legacy)
//!
//! The shape emitted by adapters before version tagging. It differs from
//! [`super::v1`] in two places:
//!
//! - environments carry user data under `userSuppliedData` rather than
//!   `metadata`;
//! - the report root and each environment may carry an `opaqueData` blob
//!   with no portable meaning.
//!
//! Everything else matches version 1 field-for-field. The types are
//! declared again here, not shared, so that the two shapes evolve
//! independently.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::VersionTag;
use crate::identity::{
    AttachmentId, CommitId, DurationMS, GitFilePath, Number1Based, UnixTimestampMS,
};
use crate::telemetry::{Percent, Telemetry};

/// Schema version of this shape.
pub const VERSION: u32 = 0;

/// Legacy root document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Optional literal tag; untagged documents are version 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<VersionTag<VERSION>>,
    /// Adapter family.
    pub category: String,
    /// Commit under test.
    pub commit_id: CommitId,
    /// Related commits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_commit_ids: Option<Vec<CommitId>>,
    /// Runner configuration file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_path: Option<GitFilePath>,
    /// CI run link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Environments, referenced by index.
    pub environments: Vec<Environment>,
    /// Root suites.
    pub suites: Vec<Suite>,
    /// Suite-less tests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tests: Option<Vec<Test>>,
    /// Errors outside any test.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unattributed_errors: Option<Vec<ReportError>>,
    /// Run start.
    pub start_timestamp: UnixTimestampMS,
    /// Run length.
    pub duration: DurationMS,
    /// Logical CPUs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_count: Option<u64>,
    /// Average CPU utilization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_avg: Option<Telemetry<Percent>>,
    /// Busiest-core CPU utilization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_max: Option<Telemetry<Percent>>,
    /// Total RAM.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ram_bytes: Option<u64>,
    /// RAM utilization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ram: Option<Telemetry<Percent>>,
    /// Combined CPU/RAM samples.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_utilization: Option<SystemUtilization>,
    /// Embedded sources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<Source>>,
    /// Adapter-private blob.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opaque_data: Option<Value>,
}

/// Legacy environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    /// Display name.
    pub name: String,
    /// OS facts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_data: Option<SystemData>,
    /// User key/value pairs already written under their version 1 name.
    /// Takes precedence over `user_supplied_data` on upgrade.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, MetadataValue>>,
    /// User key/value pairs; renamed to `metadata` in version 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_supplied_data: Option<BTreeMap<String, MetadataValue>>,
    /// Adapter-private blob.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opaque_data: Option<Value>,
}

/// OS facts.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemData {
    /// OS name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_name: Option<String>,
    /// OS release.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_version: Option<String>,
    /// CPU architecture.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_arch: Option<String>,
}

/// User data value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    /// String.
    String(String),
    /// Boolean.
    Bool(bool),
    /// Number.
    Number(serde_json::Number),
}

/// Suite kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SuiteType {
    /// A file.
    #[serde(rename = "file")]
    File,
    /// A named group.
    #[serde(rename = "suite")]
    Suite,
    /// An untitled group.
    #[serde(rename = "anonymous suite")]
    AnonymousSuite,
}

/// Legacy suite. Drops and clones recursively, like [`super::v1::Suite`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suite {
    /// Kind.
    #[serde(rename = "type")]
    pub suite_type: SuiteType,
    /// Title.
    pub title: String,
    /// Declaration site.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    /// Child suites.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suites: Option<Vec<Suite>>,
    /// Direct tests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tests: Option<Vec<Test>>,
}

/// Legacy test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Test {
    /// Title.
    pub title: String,
    /// Declaration site.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    /// Tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Attempts.
    pub attempts: Vec<RunAttempt>,
}

/// Attempt outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TestStatus {
    /// Passed.
    Passed,
    /// Failed.
    Failed,
    /// Timed out.
    TimedOut,
    /// Skipped.
    Skipped,
    /// Interrupted.
    Interrupted,
}

/// Legacy attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunAttempt {
    /// Environment index.
    pub environment_idx: usize,
    /// Expected outcome.
    pub expected_status: TestStatus,
    /// Actual outcome.
    pub status: TestStatus,
    /// Start time.
    pub start_timestamp: UnixTimestampMS,
    /// Duration.
    pub duration: DurationMS,
    /// Timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<DurationMS>,
    /// Annotations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Vec<Annotation>>,
    /// Errors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ReportError>>,
    /// Worker slot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallel_index: Option<u64>,
    /// Steps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<TestStep>>,
    /// Stdout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdout: Option<Vec<StdioEntry>>,
    /// Stderr.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<Vec<StdioEntry>>,
    /// Attachments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<Attachment>>,
}

/// Annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    /// Kind.
    #[serde(rename = "type")]
    pub annotation_type: String,
    /// Text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Declaration site.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

/// Step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestStep {
    /// Title.
    pub title: String,
    /// Duration.
    pub duration: DurationMS,
    /// Call site.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    /// Error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ReportError>,
    /// Child steps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<TestStep>>,
}

/// Stdio chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StdioEntry {
    /// Text.
    Text {
        /// Captured text.
        text: String,
    },
    /// Base64 bytes.
    Buffer {
        /// Base64 payload.
        buffer: String,
    },
}

/// Attachment metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// Display name.
    pub name: String,
    /// MIME type.
    pub content_type: String,
    /// Payload id.
    pub id: AttachmentId,
}

/// Error.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportError {
    /// Raise site.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    /// Message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Stack trace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    /// Code frame.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    /// Non-error thrown value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// File position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Path.
    pub file: GitFilePath,
    /// Line.
    pub line: Number1Based,
    /// Column.
    pub column: Number1Based,
}

/// Embedded source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    /// Path.
    pub file_path: GitFilePath,
    /// Content.
    pub text: String,
    /// First line number of a fragment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_offset: Option<Number1Based>,
    /// MIME type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

/// Combined CPU/RAM samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemUtilization {
    /// Total RAM.
    pub total_memory_bytes: u64,
    /// First sample time.
    pub start_timestamp: UnixTimestampMS,
    /// Delta-timed samples.
    pub samples: Vec<SystemUtilizationSample>,
}

/// One combined sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemUtilizationSample {
    /// Delta from previous sample.
    pub dts: DurationMS,
    /// CPU utilization.
    pub cpu_utilization: Percent,
    /// Memory utilization.
    pub memory_utilization: Percent,
}
