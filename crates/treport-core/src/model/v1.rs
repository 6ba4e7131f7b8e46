//! # Report Shape, Version 1 (current)
//!
//! The canonical in-memory shape of a report. Every field maps to a
//! camelCase key in `report.json`; optional fields are omitted when absent.
//!
//! ## Invariants
//!
//! - `environments` is referenced by index from every
//!   [`RunAttempt::environment_idx`]; reordering it changes meaning.
//! - `suites` is a forest: nesting is unbounded, cycles are impossible by
//!   construction.
//! - Attachments carry only metadata. Payload bytes live out-of-band,
//!   addressed by [`AttachmentId`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::VersionTag;
use crate::identity::{
    AttachmentId, CommitId, DurationMS, GitFilePath, Number1Based, UnixTimestampMS,
};
use crate::telemetry::{Percent, Telemetry};
use crate::walk::{self, Ancestors, TestWalk};

/// Schema version of this shape.
pub const VERSION: u32 = 1;

/// Root document describing one full test-execution run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Literal version tag; always `1`.
    #[serde(default)]
    pub version: VersionTag<VERSION>,
    /// Adapter family that produced the report (see [`crate::category`]).
    pub category: String,
    /// Commit the tests ran against.
    pub commit_id: CommitId,
    /// Other commits relevant to this run (e.g. merge parents).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_commit_ids: Option<Vec<CommitId>>,
    /// Test-runner configuration file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_path: Option<GitFilePath>,
    /// Link to the CI run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Execution environments, referenced by index.
    pub environments: Vec<Environment>,
    /// Root suites of the test forest.
    pub suites: Vec<Suite>,
    /// Tests that belong to no suite.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tests: Option<Vec<Test>>,
    /// Errors raised outside any test (global setup, worker crashes).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unattributed_errors: Option<Vec<ReportError>>,
    /// When the run started.
    pub start_timestamp: UnixTimestampMS,
    /// Wall-clock length of the run.
    pub duration: DurationMS,
    /// Logical CPUs on the runner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_count: Option<u64>,
    /// Average CPU utilization across cores.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_avg: Option<Telemetry<Percent>>,
    /// Utilization of the busiest core.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_max: Option<Telemetry<Percent>>,
    /// Total RAM on the runner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ram_bytes: Option<u64>,
    /// RAM utilization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ram: Option<Telemetry<Percent>>,
    /// Legacy combined CPU/RAM samples.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_utilization: Option<SystemUtilization>,
    /// Embedded source files for rendering locations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<Source>>,
}

impl Report {
    /// Walk every test under `suites` in pre-order.
    ///
    /// Root-level [`Report::tests`] are not included.
    pub fn walk_tests(&self) -> TestWalk<'_> {
        TestWalk::new(&self.suites)
    }

    /// First test under `suites` matching `predicate`.
    pub fn find_test<'a, F>(&'a self, predicate: F) -> Option<&'a Test>
    where
        F: FnMut(&'a Test, &Ancestors<'a>) -> bool,
    {
        walk::find_test(&self.suites, predicate)
    }

    /// The environment an attempt ran in, if its index is in range.
    pub fn environment_of(&self, attempt: &RunAttempt) -> Option<&Environment> {
        self.environments.get(attempt.environment_idx)
    }

    /// Embedded source for the file a location points into.
    pub fn source_for(&self, location: &Location) -> Option<&Source> {
        self.sources
            .as_deref()?
            .iter()
            .find(|s| s.file_path == location.file)
    }
}

/// A named execution configuration (OS, browser, project).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    /// Display name, 1–512 characters.
    pub name: String,
    /// Operating-system facts collected by the adapter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_data: Option<SystemData>,
    /// User-supplied key/value pairs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, MetadataValue>>,
}

/// Operating-system facts for an [`Environment`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemData {
    /// e.g. `linux`, `darwin`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_name: Option<String>,
    /// Kernel or OS release.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_version: Option<String>,
    /// e.g. `x64`, `arm64`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_arch: Option<String>,
}

/// A metadata value: string, boolean, or number.
///
/// Numbers keep their exact JSON form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    /// A string value.
    String(String),
    /// A boolean value.
    Bool(bool),
    /// A numeric value.
    Number(serde_json::Number),
}

/// Kind of grouping a [`Suite`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SuiteType {
    /// A test file.
    #[serde(rename = "file")]
    File,
    /// A named logical group (`describe`, class).
    #[serde(rename = "suite")]
    Suite,
    /// A group without a title of its own.
    #[serde(rename = "anonymous suite")]
    AnonymousSuite,
}

/// A grouping node in the test hierarchy.
///
/// Depth is unbounded in the type. The derived `Clone`, `PartialEq` and
/// serde impls, and the drop glue, recurse once per nesting level; only the
/// [`walk`](crate::walk) iterators run on an explicit stack. `serde_json`
/// text parsing already stops at 128 levels of JSON nesting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suite {
    /// Kind of group.
    #[serde(rename = "type")]
    pub suite_type: SuiteType,
    /// Group title.
    pub title: String,
    /// Where the group is declared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    /// Nested groups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suites: Option<Vec<Suite>>,
    /// Tests declared directly in this group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tests: Option<Vec<Test>>,
}

/// A single test, with every attempt made to run it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Test {
    /// Test title.
    pub title: String,
    /// Where the test is declared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    /// Static tags; compared case-insensitively.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Executions of this test. May be empty.
    pub attempts: Vec<RunAttempt>,
}

impl Test {
    /// Whether the test carries `tag`, ignoring case.
    pub fn has_tag(&self, tag: &str) -> bool {
        let wanted = tag.to_lowercase();
        self.tags
            .iter()
            .flatten()
            .any(|t| t.to_lowercase() == wanted)
    }

    /// Whether some attempt ended with a status other than expected.
    pub fn has_unexpected_attempt(&self) -> bool {
        self.attempts.iter().any(|a| !a.is_expected())
    }
}

/// Outcome of a [`RunAttempt`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TestStatus {
    /// The test passed.
    Passed,
    /// The test failed.
    Failed,
    /// The test exceeded its timeout.
    TimedOut,
    /// The test was skipped.
    Skipped,
    /// The run was interrupted while the test executed.
    Interrupted,
}

/// One concrete execution of a test in one environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunAttempt {
    /// Index into [`Report::environments`].
    pub environment_idx: usize,
    /// Status the test declared it expects.
    pub expected_status: TestStatus,
    /// Status the attempt actually ended with.
    pub status: TestStatus,
    /// When the attempt started.
    pub start_timestamp: UnixTimestampMS,
    /// How long the attempt took.
    pub duration: DurationMS,
    /// Configured timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<DurationMS>,
    /// Runner annotations (`skip`, `fixme`, issue links).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Vec<Annotation>>,
    /// Errors in the order they were raised; soft assertions may add several.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ReportError>>,
    /// Worker slot that ran the attempt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallel_index: Option<u64>,
    /// Top-level steps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<TestStep>>,
    /// Captured standard output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdout: Option<Vec<StdioEntry>>,
    /// Captured standard error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<Vec<StdioEntry>>,
    /// Out-of-band artifacts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<Attachment>>,
}

impl RunAttempt {
    /// Whether the attempt ended as expected.
    pub fn is_expected(&self) -> bool {
        self.status == self.expected_status
    }

    /// When the attempt finished.
    pub fn end_timestamp(&self) -> UnixTimestampMS {
        self.start_timestamp.after(self.duration)
    }
}

/// A runner annotation attached to an attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    /// Annotation kind.
    #[serde(rename = "type")]
    pub annotation_type: String,
    /// Free-form text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Where the annotation was declared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

/// A step inside an attempt. Steps nest without bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestStep {
    /// Step title.
    pub title: String,
    /// How long the step took.
    pub duration: DurationMS,
    /// Where the step was invoked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    /// The error that ended the step, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ReportError>,
    /// Nested steps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<TestStep>>,
}

/// One chunk of captured stdio.
///
/// Resolved by structural match: `{text}` first, then `{buffer}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StdioEntry {
    /// UTF-8 text.
    Text {
        /// Captured text.
        text: String,
    },
    /// Arbitrary bytes, base64-encoded.
    Buffer {
        /// Base64 payload.
        buffer: String,
    },
}

impl StdioEntry {
    /// The captured text, if this entry is textual.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            Self::Buffer { .. } => None,
        }
    }
}

/// Metadata for an out-of-band artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// Display name.
    pub name: String,
    /// MIME type of the payload.
    pub content_type: String,
    /// Payload id, 1–1024 characters.
    pub id: AttachmentId,
}

/// An error raised during a run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportError {
    /// Where the error was raised.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    /// Error message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Stack trace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    /// Deprecated: pre-rendered code frame. Use [`Report::sources`] instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    /// String form of a thrown value that was not an error object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// A position in a repository file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Repository-relative path.
    pub file: GitFilePath,
    /// Line number.
    pub line: Number1Based,
    /// Column number.
    pub column: Number1Based,
}

/// Embedded file content used to render [`Location`]s.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    /// Repository-relative path the content belongs to.
    pub file_path: GitFilePath,
    /// File content, possibly a fragment.
    pub text: String,
    /// Line number of the first line of `text` when it is a fragment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_offset: Option<Number1Based>,
    /// MIME type used for highlighting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

/// Legacy combined CPU/RAM samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemUtilization {
    /// Total RAM on the runner.
    pub total_memory_bytes: u64,
    /// Time of the first sample.
    pub start_timestamp: UnixTimestampMS,
    /// Samples; each `dts` is a delta from the previous sample.
    pub samples: Vec<SystemUtilizationSample>,
}

/// One legacy utilization sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemUtilizationSample {
    /// Milliseconds since the previous sample.
    pub dts: DurationMS,
    /// CPU utilization.
    pub cpu_utilization: Percent,
    /// Memory utilization.
    pub memory_utilization: Percent,
}
