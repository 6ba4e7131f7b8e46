//! # Report Validation Properties
//!
//! End-to-end checks of the validation contract: acceptance of a minimal
//! report, bounds rejection with precise paths, the percent range on
//! telemetry, the issue cap, and acceptance of the checked-in fixtures.

use proptest::prelude::*;
use serde_json::{json, Value};
use treport_core::ReportDocument;
use treport_schema::{validate, ReportValidator, SchemaVersion, ValidatorConfig};

const V1_FIXTURE: &str = include_str!("../../treport-core/tests/fixtures/report.v1.json");
const V0_FIXTURE: &str = include_str!("../../treport-core/tests/fixtures/report.v0.json");

fn minimal_report() -> Value {
    json!({
        "category": "pytest",
        "commitId": "0123456789abcdef0123456789abcdef01234567",
        "environments": [{"name": "Python Tests"}],
        "suites": [],
        "tests": [{
            "title": "t",
            "attempts": [{
                "environmentIdx": 0,
                "expectedStatus": "passed",
                "status": "passed",
                "startTimestamp": 1703001600000u64,
                "duration": 1500
            }]
        }],
        "startTimestamp": 1703001600000u64,
        "duration": 2000
    })
}

fn with_cpu_sample(value: Value) -> Value {
    let mut doc = minimal_report();
    doc["cpuAvg"] = json!([[1703001600000u64, 12.5], [1000, value]]);
    doc
}

// -- acceptance --

#[test]
fn minimal_report_is_valid() {
    assert_eq!(validate(&minimal_report()).unwrap(), None);
}

#[test]
fn minimal_report_is_valid_in_every_version() {
    for version in SchemaVersion::ALL {
        let validator = ReportValidator::new(version, ValidatorConfig::default()).unwrap();
        assert!(validator.validate(&minimal_report()).is_none(), "{version}");
    }
}

#[test]
fn fixtures_are_valid_for_their_version() {
    let v1: Value = serde_json::from_str(V1_FIXTURE).unwrap();
    let v0: Value = serde_json::from_str(V0_FIXTURE).unwrap();
    for doc in [v1, v0] {
        let validator = ReportValidator::for_document(&doc, ValidatorConfig::default()).unwrap();
        assert!(validator.validate(&doc).is_none(), "{}", validator.version());
    }
}

#[test]
fn typed_report_validates() {
    let ReportDocument::V1(report) = ReportDocument::from_json_str(V1_FIXTURE).unwrap() else {
        panic!("expected the current shape");
    };
    let validator = ReportValidator::current().unwrap();
    assert!(validator.validate_report(&report).unwrap().is_none());
}

#[test]
fn valid_wide_integers_also_parse_typed() {
    let mut doc = minimal_report();
    doc["cpuCount"] = json!(5_000_000_000u64);
    doc["tests"][0]["attempts"][0]["parallelIndex"] = json!(5_000_000_000u64);
    doc["tests"][0]["location"] = json!({"file": "a.py", "line": 5_000_000_000u64, "column": 1});
    for version in SchemaVersion::ALL {
        let validator = ReportValidator::new(version, ValidatorConfig::default()).unwrap();
        assert!(validator.validate(&doc).is_none(), "{version}");
    }
    let mut current = doc.clone();
    current["version"] = json!(1);
    assert!(matches!(ReportDocument::from_value(doc), Ok(ReportDocument::V0(_))));
    assert!(matches!(ReportDocument::from_value(current), Ok(ReportDocument::V1(_))));
}

// -- bounds --

#[test]
fn short_commit_id_is_one_issue_at_commit_id() {
    let mut doc = minimal_report();
    doc["commitId"] = json!("0123456789abcdef0123456789abcdef0123456");
    let issues = validate(&doc).unwrap().expect("invalid");
    assert_eq!(issues.len(), 1);
    assert_eq!(issues.issues()[0].path, "/commitId");
}

#[test]
fn missing_environments_is_a_required_field_issue() {
    let mut doc = minimal_report();
    doc.as_object_mut().unwrap().remove("environments");
    let issues = validate(&doc).unwrap().expect("invalid");
    assert_eq!(issues.len(), 1);
    let issue = &issues.issues()[0];
    assert_eq!(issue.path, "");
    assert!(issue.message.contains("environments"), "{}", issue.message);
    assert!(issue.message.contains("required"), "{}", issue.message);
}

#[test]
fn version_tag_must_match_schema() {
    let mut doc = minimal_report();
    doc["version"] = json!(0);
    let v1 = ReportValidator::new(SchemaVersion::V1, ValidatorConfig::default()).unwrap();
    let issues = v1.validate(&doc).expect("tag mismatch");
    assert_eq!(issues.at("/version").count(), 1);
}

#[test]
fn ambiguous_stdio_entry_is_rejected() {
    let mut doc = minimal_report();
    doc["tests"][0]["attempts"][0]["stdout"] = json!([{"text": "a", "buffer": "Yg=="}]);
    let issues = validate(&doc).unwrap().expect("invalid");
    assert_eq!(issues.issues()[0].path, "/tests/0/attempts/0/stdout/0");
}

#[test]
fn deeply_nested_suites_are_checked() {
    let mut suite = json!({
        "type": "suite",
        "title": "leaf",
        "tests": [{"title": "t", "attempts": [{
            "environmentIdx": 0,
            "expectedStatus": "passed",
            "status": "nope",
            "startTimestamp": 0,
            "duration": 0
        }]}]
    });
    for _ in 0..20 {
        suite = json!({"type": "suite", "title": "s", "suites": [suite]});
    }
    let mut doc = minimal_report();
    doc["suites"] = json!([suite]);
    let issues = validate(&doc).unwrap().expect("invalid");
    assert_eq!(issues.len(), 1);
    let expected = format!("{}/tests/0/attempts/0/status", "/suites/0".repeat(21));
    assert_eq!(issues.issues()[0].path, expected);
}

// -- percent --

#[test]
fn percent_bounds_are_inclusive() {
    assert!(validate(&with_cpu_sample(json!(0))).unwrap().is_none());
    assert!(validate(&with_cpu_sample(json!(100))).unwrap().is_none());
    for bad in [json!(101), json!(-1)] {
        let issues = validate(&with_cpu_sample(bad)).unwrap().expect("out of range");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues.issues()[0].path, "/cpuAvg/1/1");
    }
}

proptest! {
    #[test]
    fn any_in_range_percent_is_accepted(value in 0.0f64..=100.0) {
        prop_assert!(validate(&with_cpu_sample(json!(value))).unwrap().is_none());
    }

    #[test]
    fn any_out_of_range_percent_is_rejected(value in prop_oneof![-1.0e6f64..-0.001, 100.001f64..1.0e6]) {
        prop_assert!(validate(&with_cpu_sample(json!(value))).unwrap().is_some());
    }
}

// -- issue cap --

#[test]
fn eight_violations_render_five_plus_remainder() {
    let mut doc = minimal_report();
    doc["commitId"] = json!("0123456789abcdef0123456789abcdef0123456");
    doc["category"] = json!("");
    doc["startTimestamp"] = json!(-1);
    doc["environments"][0]["name"] = json!("");
    let attempt = &mut doc["tests"][0]["attempts"][0];
    attempt["status"] = json!("bogus");
    attempt["duration"] = json!(-1);
    attempt["parallelIndex"] = json!(-1);
    attempt["attachments"] = json!([{"name": "log", "contentType": "text/plain", "id": ""}]);

    let issues = validate(&doc).unwrap().expect("invalid");
    assert_eq!(issues.len(), 8);

    let rendered = issues.to_string();
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines.len(), 6, "{rendered}");
    assert_eq!(lines[5], "...and 3 more issues...");
}

#[test]
fn cap_follows_config() {
    let mut doc = minimal_report();
    doc["category"] = json!("");
    doc["duration"] = json!(-1);
    let config = ValidatorConfig {
        max_reported_issues: 1,
        ..ValidatorConfig::default()
    };
    let validator = ReportValidator::new(SchemaVersion::V1, config).unwrap();
    let rendered = validator.validate(&doc).expect("invalid").to_string();
    assert!(rendered.ends_with("...and 1 more issues..."), "{rendered}");
}
