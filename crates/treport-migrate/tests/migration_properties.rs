//! # Migration Properties
//!
//! Round-trip identity on current documents, idempotence for every source
//! version, relocation of legacy environment data, agreement between the
//! wire and typed paths, and validity of migrated output.

use proptest::prelude::*;
use serde_json::{json, Map, Value};
use treport_core::model::v0;
use treport_core::{ReportDocument, CURRENT_VERSION};
use treport_migrate::{migrate, migrate_value, upgrade_v0};
use treport_schema::{ReportValidator, SchemaVersion, ValidatorConfig};

const V1_FIXTURE: &str = include_str!("../../treport-core/tests/fixtures/report.v1.json");
const V0_FIXTURE: &str = include_str!("../../treport-core/tests/fixtures/report.v0.json");

fn fixture(text: &str) -> Value {
    serde_json::from_str(text).unwrap()
}

fn contains_key(value: &Value, key: &str) -> bool {
    match value {
        Value::Object(map) => map.contains_key(key) || map.values().any(|v| contains_key(v, key)),
        Value::Array(items) => items.iter().any(|v| contains_key(v, key)),
        _ => false,
    }
}

// -- identity --

#[test]
fn current_document_is_returned_unchanged() {
    let doc = fixture(V1_FIXTURE);
    assert_eq!(migrate_value(&doc).unwrap(), doc);
}

#[test]
fn input_is_not_modified() {
    let doc = fixture(V0_FIXTURE);
    let before = doc.clone();
    let _ = migrate_value(&doc).unwrap();
    assert_eq!(doc, before);
}

// -- relocation --

#[test]
fn user_supplied_data_becomes_metadata() {
    let doc = json!({"environments": [{"name": "E", "userSuppliedData": {"foo": "bar"}}]});
    let out = migrate_value(&doc).unwrap();
    assert_eq!(out["environments"], json!([{"name": "E", "metadata": {"foo": "bar"}}]));
    assert!(!contains_key(&out, "userSuppliedData"));
    assert!(!contains_key(&out, "opaqueData"));
}

#[test]
fn legacy_fixture_migrates_cleanly() {
    let doc = fixture(V0_FIXTURE);
    let out = migrate_value(&doc).unwrap();

    assert_eq!(out["version"], json!(CURRENT_VERSION));
    assert!(!contains_key(&out, "userSuppliedData"));
    assert!(!contains_key(&out, "opaqueData"));
    assert_eq!(
        out["environments"][0]["metadata"],
        json!({"python": "3.12", "xdist": false, "workers": 2})
    );
    assert_eq!(out["environments"][1]["metadata"], json!({"tier": "nightly"}));
    // Untouched subtrees.
    for key in ["suites", "cpuAvg", "systemUtilization", "startTimestamp", "duration"] {
        assert_eq!(out[key], doc[key], "{key}");
    }
}

// -- agreement and validity --

#[test]
fn wire_and_typed_paths_agree() {
    let wire = migrate_value(&fixture(V0_FIXTURE)).unwrap();
    let legacy: v0::Report = serde_json::from_str(V0_FIXTURE).unwrap();
    let typed = serde_json::to_value(upgrade_v0(&legacy)).unwrap();
    assert_eq!(wire, typed);
}

#[test]
fn existing_metadata_wins_on_both_paths() {
    let mut doc = fixture(V0_FIXTURE);
    doc["environments"] = json!([
        {"name": "E", "metadata": {"a": 1}, "userSuppliedData": {"b": 2}}
    ]);
    let wire = migrate_value(&doc).unwrap();
    assert_eq!(wire["environments"], json!([{"name": "E", "metadata": {"a": 1}}]));

    let legacy: v0::Report = serde_json::from_value(doc).unwrap();
    let typed = serde_json::to_value(upgrade_v0(&legacy)).unwrap();
    assert_eq!(typed, wire);
}

#[test]
fn integer_telemetry_keeps_its_encoding() {
    let mut doc = fixture(V0_FIXTURE);
    doc["cpuAvg"] = json!([[1703001600000u64, 10], [500, 40]]);
    let legacy: v0::Report = serde_json::from_value(doc.clone()).unwrap();
    let typed = serde_json::to_string(&upgrade_v0(&legacy).cpu_avg).unwrap();
    assert_eq!(typed, "[[1703001600000,10],[500,40]]");
    assert_eq!(migrate_value(&doc).unwrap()["cpuAvg"], doc["cpuAvg"]);
}

#[test]
fn typed_migrate_dispatches_on_version() {
    let legacy = ReportDocument::from_json_str(V0_FIXTURE).unwrap();
    let current = migrate(&legacy);
    assert_eq!(serde_json::to_value(&current).unwrap(), migrate_value(&fixture(V0_FIXTURE)).unwrap());

    let already = ReportDocument::from_json_str(V1_FIXTURE).unwrap();
    assert_eq!(serde_json::to_value(migrate(&already)).unwrap(), fixture(V1_FIXTURE));
}

#[test]
fn migrated_fixture_is_valid_current_report() {
    let out = migrate_value(&fixture(V0_FIXTURE)).unwrap();
    let validator = ReportValidator::new(SchemaVersion::CURRENT, ValidatorConfig::default()).unwrap();
    let issues = validator.validate(&out);
    assert!(issues.is_none(), "{}", issues.map(|i| i.to_string()).unwrap_or_default());
}

// -- idempotence --

fn metadata_map() -> impl Strategy<Value = Value> {
    prop::collection::btree_map(
        "[a-z]{1,6}",
        prop_oneof![
            "[a-zA-Z0-9 ]{0,8}".prop_map(Value::from),
            any::<bool>().prop_map(Value::from),
            any::<i64>().prop_map(Value::from),
        ],
        0..4,
    )
    .prop_map(|m| Value::Object(m.into_iter().collect::<Map<String, Value>>()))
}

fn environment() -> impl Strategy<Value = Value> {
    (
        "[A-Za-z ]{1,12}",
        prop::option::of(metadata_map()),
        prop::option::of(metadata_map()),
        prop::option::of(metadata_map()),
    )
        .prop_map(|(name, legacy, current, opaque)| {
            let mut env = Map::new();
            env.insert("name".into(), Value::from(name));
            if let Some(m) = legacy {
                env.insert("userSuppliedData".into(), m);
            }
            if let Some(m) = current {
                env.insert("metadata".into(), m);
            }
            if let Some(m) = opaque {
                env.insert("opaqueData".into(), m);
            }
            Value::Object(env)
        })
}

fn any_report() -> impl Strategy<Value = Value> {
    (
        prop::option::of(0u64..=2),
        prop::collection::vec(environment(), 0..4),
        prop::option::of(metadata_map()),
        prop::collection::vec((0u64..1_000_000, 0.0f64..100.0), 0..5),
    )
        .prop_map(|(version, environments, opaque, samples)| {
            let mut doc = json!({
                "category": "pytest",
                "commitId": "0123456789abcdef0123456789abcdef01234567",
                "environments": environments,
                "suites": [],
                "startTimestamp": 1703001600000u64,
                "duration": 2000,
                "cpuAvg": samples.iter().map(|(t, v)| json!([t, v])).collect::<Vec<_>>()
            });
            if let Some(v) = version {
                doc["version"] = json!(v);
            }
            if let Some(o) = opaque {
                doc["opaqueData"] = o;
            }
            doc
        })
}

proptest! {
    #[test]
    fn migration_is_idempotent(doc in any_report()) {
        let once = migrate_value(&doc).unwrap();
        let twice = migrate_value(&once).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn migration_never_touches_telemetry(doc in any_report()) {
        let out = migrate_value(&doc).unwrap();
        prop_assert_eq!(&out["cpuAvg"], &doc["cpuAvg"]);
    }

    #[test]
    fn legacy_keys_never_survive_an_upgrade(doc in any_report()) {
        prop_assume!(doc.get("version").and_then(Value::as_u64).unwrap_or(0) < CURRENT_VERSION);
        let out = migrate_value(&doc).unwrap();
        prop_assert!(!contains_key(&out, "userSuppliedData"));
        prop_assert!(!contains_key(&out, "opaqueData"));
    }
}
