//! # Report Wire Format Tests
//!
//! Parse the checked-in fixtures through [`ReportDocument`] and confirm the
//! typed shapes reproduce the wire document exactly.

use serde_json::Value;
use treport_core::model::v0;
use treport_core::{
    ReportDocument, StdioEntry, TestStatus, UnixTimestampMS, CURRENT_VERSION, LEGACY_VERSION,
};

const V1_FIXTURE: &str = include_str!("fixtures/report.v1.json");
const V0_FIXTURE: &str = include_str!("fixtures/report.v0.json");

fn fixture(text: &str) -> Value {
    serde_json::from_str(text).expect("fixture is valid JSON")
}

#[test]
fn current_fixture_round_trips_through_typed_shape() {
    let wire = fixture(V1_FIXTURE);
    let doc = ReportDocument::from_value(wire.clone()).expect("parses");
    assert_eq!(doc.version(), CURRENT_VERSION);
    assert_eq!(doc.to_value().expect("serializes"), wire);
}

#[test]
fn legacy_fixture_round_trips_through_typed_shape() {
    let wire = fixture(V0_FIXTURE);
    let doc = ReportDocument::from_value(wire.clone()).expect("parses");
    assert_eq!(doc.version(), LEGACY_VERSION);
    assert_eq!(doc.to_value().expect("serializes"), wire);
}

#[test]
fn current_fixture_exposes_domain_values() {
    let ReportDocument::V1(report) = ReportDocument::from_json_str(V1_FIXTURE).expect("parses")
    else {
        panic!("expected the current shape");
    };

    assert_eq!(report.commit_id.as_str().len(), 40);
    assert_eq!(report.environments.len(), 2);

    let failing = report
        .find_test(|t, _| t.has_unexpected_attempt())
        .expect("one test fails");
    assert_eq!(failing.title, "shows an error");
    let attempt = &failing.attempts[0];
    assert_eq!(attempt.status, TestStatus::Failed);
    assert_eq!(
        report.environment_of(attempt).map(|e| e.name.as_str()),
        Some("chromium")
    );
    assert_eq!(attempt.end_timestamp(), UnixTimestampMS(1703001631000));

    let cpu: Vec<u64> = report
        .cpu_avg
        .as_ref()
        .expect("cpu telemetry")
        .decode()
        .map(|(t, _)| t.0)
        .collect();
    assert_eq!(cpu, vec![1703001600000, 1703001601000, 1703001602000]);
}

#[test]
fn stdio_entries_keep_their_variant() {
    let ReportDocument::V1(report) = ReportDocument::from_json_str(V1_FIXTURE).expect("parses")
    else {
        panic!("expected the current shape");
    };
    let (test, _) = report.walk_tests().next().expect("first test");
    let attempt = &test.attempts[0];
    let stdout = attempt.stdout.as_deref().unwrap_or_default();
    let stderr = attempt.stderr.as_deref().unwrap_or_default();
    assert_eq!(stdout[0].as_text(), Some("navigated\n"));
    assert!(matches!(stderr[0], StdioEntry::Buffer { .. }));
}

#[test]
fn legacy_fixture_keeps_opaque_blobs() {
    let report: v0::Report = serde_json::from_str(V0_FIXTURE).expect("parses");
    assert!(report.version.is_none());
    assert!(report.opaque_data.is_some());
    assert!(report.environments[0].opaque_data.is_some());
    assert!(report.environments[1].opaque_data.is_none());
    assert_eq!(
        report.environments[1]
            .user_supplied_data
            .as_ref()
            .map(|m| m.len()),
        Some(1)
    );
}
