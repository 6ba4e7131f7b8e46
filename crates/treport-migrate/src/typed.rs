//! # Typed Migration
//!
//! Explicit conversions from each legacy shape to [`v1`]. Each function
//! borrows its input and builds a new value; nothing is shared with or
//! written back to the source.
//!
//! Prefer [`migrate_value`](crate::migrate_value) when the document came
//! off the wire. Typed conversion drops any field the shapes do not model.

use treport_core::model::{v0, v1};
use treport_core::{ReportDocument, VersionTag};

/// Bring any parsed document to the current shape.
pub fn migrate(document: &ReportDocument) -> v1::Report {
    match document {
        ReportDocument::V0(report) => {
            tracing::debug!(from = 0, to = 1, "upgrading typed report");
            upgrade_v0(report)
        }
        ReportDocument::V1(report) => report.clone(),
    }
}

/// Version 0 to version 1.
///
/// Drops both `opaqueData` blobs and moves environment
/// `userSuppliedData` to `metadata`. An environment that already carries
/// `metadata` keeps it and loses `userSuppliedData`.
pub fn upgrade_v0(report: &v0::Report) -> v1::Report {
    v1::Report {
        version: VersionTag,
        category: report.category.clone(),
        commit_id: report.commit_id.clone(),
        related_commit_ids: report.related_commit_ids.clone(),
        config_path: report.config_path.clone(),
        url: report.url.clone(),
        environments: report.environments.iter().map(environment).collect(),
        suites: report.suites.iter().map(suite).collect(),
        tests: map_all(&report.tests, test),
        unattributed_errors: map_all(&report.unattributed_errors, error),
        start_timestamp: report.start_timestamp,
        duration: report.duration,
        cpu_count: report.cpu_count,
        cpu_avg: report.cpu_avg.clone(),
        cpu_max: report.cpu_max.clone(),
        ram_bytes: report.ram_bytes,
        ram: report.ram.clone(),
        system_utilization: report.system_utilization.as_ref().map(system_utilization),
        sources: map_all(&report.sources, source),
    }
}

fn map_all<A, B>(items: &Option<Vec<A>>, f: impl Fn(&A) -> B) -> Option<Vec<B>> {
    items.as_ref().map(|v| v.iter().map(f).collect())
}

fn environment(env: &v0::Environment) -> v1::Environment {
    v1::Environment {
        name: env.name.clone(),
        system_data: env.system_data.as_ref().map(|d| v1::SystemData {
            os_name: d.os_name.clone(),
            os_version: d.os_version.clone(),
            os_arch: d.os_arch.clone(),
        }),
        metadata: env
            .metadata
            .as_ref()
            .or(env.user_supplied_data.as_ref())
            .map(|data| {
                data.iter()
                    .map(|(k, v)| (k.clone(), metadata_value(v)))
                    .collect()
            }),
    }
}

fn metadata_value(value: &v0::MetadataValue) -> v1::MetadataValue {
    match value {
        v0::MetadataValue::String(s) => v1::MetadataValue::String(s.clone()),
        v0::MetadataValue::Bool(b) => v1::MetadataValue::Bool(*b),
        v0::MetadataValue::Number(n) => v1::MetadataValue::Number(n.clone()),
    }
}

fn suite(suite: &v0::Suite) -> v1::Suite {
    v1::Suite {
        suite_type: match suite.suite_type {
            v0::SuiteType::File => v1::SuiteType::File,
            v0::SuiteType::Suite => v1::SuiteType::Suite,
            v0::SuiteType::AnonymousSuite => v1::SuiteType::AnonymousSuite,
        },
        title: suite.title.clone(),
        location: suite.location.as_ref().map(location),
        suites: map_all(&suite.suites, self::suite),
        tests: map_all(&suite.tests, test),
    }
}

fn test(test: &v0::Test) -> v1::Test {
    v1::Test {
        title: test.title.clone(),
        location: test.location.as_ref().map(location),
        tags: test.tags.clone(),
        attempts: test.attempts.iter().map(attempt).collect(),
    }
}

fn status(status: v0::TestStatus) -> v1::TestStatus {
    match status {
        v0::TestStatus::Passed => v1::TestStatus::Passed,
        v0::TestStatus::Failed => v1::TestStatus::Failed,
        v0::TestStatus::TimedOut => v1::TestStatus::TimedOut,
        v0::TestStatus::Skipped => v1::TestStatus::Skipped,
        v0::TestStatus::Interrupted => v1::TestStatus::Interrupted,
    }
}

fn attempt(attempt: &v0::RunAttempt) -> v1::RunAttempt {
    v1::RunAttempt {
        environment_idx: attempt.environment_idx,
        expected_status: status(attempt.expected_status),
        status: status(attempt.status),
        start_timestamp: attempt.start_timestamp,
        duration: attempt.duration,
        timeout: attempt.timeout,
        annotations: map_all(&attempt.annotations, |a| v1::Annotation {
            annotation_type: a.annotation_type.clone(),
            description: a.description.clone(),
            location: a.location.as_ref().map(location),
        }),
        errors: map_all(&attempt.errors, error),
        parallel_index: attempt.parallel_index,
        steps: map_all(&attempt.steps, step),
        stdout: map_all(&attempt.stdout, stdio),
        stderr: map_all(&attempt.stderr, stdio),
        attachments: map_all(&attempt.attachments, |a| v1::Attachment {
            name: a.name.clone(),
            content_type: a.content_type.clone(),
            id: a.id.clone(),
        }),
    }
}

fn step(step: &v0::TestStep) -> v1::TestStep {
    v1::TestStep {
        title: step.title.clone(),
        duration: step.duration,
        location: step.location.as_ref().map(location),
        error: step.error.as_ref().map(error),
        steps: map_all(&step.steps, self::step),
    }
}

fn stdio(entry: &v0::StdioEntry) -> v1::StdioEntry {
    match entry {
        v0::StdioEntry::Text { text } => v1::StdioEntry::Text { text: text.clone() },
        v0::StdioEntry::Buffer { buffer } => v1::StdioEntry::Buffer {
            buffer: buffer.clone(),
        },
    }
}

fn error(error: &v0::ReportError) -> v1::ReportError {
    v1::ReportError {
        location: error.location.as_ref().map(location),
        message: error.message.clone(),
        stack: error.stack.clone(),
        snippet: error.snippet.clone(),
        value: error.value.clone(),
    }
}

fn location(location: &v0::Location) -> v1::Location {
    v1::Location {
        file: location.file.clone(),
        line: location.line,
        column: location.column,
    }
}

fn source(source: &v0::Source) -> v1::Source {
    v1::Source {
        file_path: source.file_path.clone(),
        text: source.text.clone(),
        line_offset: source.line_offset,
        content_type: source.content_type.clone(),
    }
}

fn system_utilization(su: &v0::SystemUtilization) -> v1::SystemUtilization {
    v1::SystemUtilization {
        total_memory_bytes: su.total_memory_bytes,
        start_timestamp: su.start_timestamp,
        samples: su
            .samples
            .iter()
            .map(|s| v1::SystemUtilizationSample {
                dts: s.dts,
                cpu_utilization: s.cpu_utilization.clone(),
                memory_utilization: s.memory_utilization.clone(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn legacy() -> v0::Report {
        serde_json::from_value(json!({
            "category": "junit",
            "commitId": "abcdefabcdefabcdefabcdefabcdefabcdefabcd",
            "environments": [
                {"name": "E", "userSuppliedData": {"foo": "bar"}, "opaqueData": [1]}
            ],
            "suites": [{
                "type": "file",
                "title": "Suite.xml",
                "suites": [{"type": "anonymous suite", "title": "", "tests": [{
                    "title": "t",
                    "attempts": [{
                        "environmentIdx": 0,
                        "expectedStatus": "skipped",
                        "status": "interrupted",
                        "startTimestamp": 5,
                        "duration": 6,
                        "steps": [{"title": "s", "duration": 1, "steps": [{"title": "inner", "duration": 1}]}]
                    }]
                }]}]
            }],
            "startTimestamp": 1,
            "duration": 2,
            "opaqueData": {"k": "v"}
        }))
        .unwrap()
    }

    #[test]
    fn relocates_user_data() {
        let current = upgrade_v0(&legacy());
        let metadata = current.environments[0].metadata.as_ref().unwrap();
        assert_eq!(metadata["foo"], v1::MetadataValue::String("bar".into()));
    }

    #[test]
    fn existing_metadata_wins_over_user_data() {
        let mut report = legacy();
        report.environments[0] = serde_json::from_value(json!({
            "name": "E",
            "metadata": {"a": 1},
            "userSuppliedData": {"b": 2}
        }))
        .unwrap();
        let current = upgrade_v0(&report);
        let metadata = current.environments[0].metadata.as_ref().unwrap();
        assert_eq!(metadata.len(), 1);
        assert_eq!(metadata["a"], v1::MetadataValue::Number(1.into()));
    }

    #[test]
    fn preserves_nested_tree() {
        let current = upgrade_v0(&legacy());
        let (test, ancestors) = current.walk_tests().next().unwrap();
        assert_eq!(ancestors.titles(), vec!["Suite.xml", ""]);
        assert_eq!(test.attempts[0].status, v1::TestStatus::Interrupted);
        let steps = test.attempts[0].steps.as_ref().unwrap();
        assert_eq!(steps[0].steps.as_ref().unwrap()[0].title, "inner");
    }

    #[test]
    fn current_document_is_cloned() {
        let current = upgrade_v0(&legacy());
        let doc = ReportDocument::V1(current.clone());
        assert_eq!(migrate(&doc), current);
        assert_eq!(migrate(&ReportDocument::V0(legacy())), current);
    }
}
