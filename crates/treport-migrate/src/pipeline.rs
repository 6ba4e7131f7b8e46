//! # Wire-Level Migration
//!
//! Upgrades a `report.json` document in place of its JSON tree, one
//! registered [`MigrationStep`] at a time, until it reaches
//! [`CURRENT_VERSION`].
//!
//! Working on [`serde_json::Value`] rather than typed shapes means that
//! fields no shape models, and the exact encoding of every number, pass
//! through untouched. Telemetry delta encoding is never decoded.
//!
//! ## Version Dispatch
//!
//! | Input `version` | Outcome |
//! |-----------------|---------|
//! | absent | treated as `0`, steps run |
//! | older than current | steps run |
//! | current or newer | returned unchanged |
//! | not a non-negative integer | [`MigrationError::UnrecognizedVersion`] |

use serde_json::{Map, Value};
use treport_core::{CURRENT_VERSION, LEGACY_VERSION};

use crate::error::MigrationError;

/// One upgrade between adjacent versions.
#[derive(Debug, Clone, Copy)]
pub struct MigrationStep {
    /// Version the step accepts.
    pub from: u64,
    /// Version the step produces.
    pub to: u64,
    /// Short label for logs.
    pub name: &'static str,
    apply: fn(&mut Map<String, Value>),
}

/// Every registered step, in version order.
pub const STEPS: &[MigrationStep] = &[MigrationStep {
    from: 0,
    to: 1,
    name: "environment-metadata",
    apply: v0_to_v1,
}];

/// Read a document's version for migration purposes.
///
/// # Errors
///
/// - [`MigrationError::NotAnObject`] if the root is not an object.
/// - [`MigrationError::UnrecognizedVersion`] for a malformed tag.
pub fn source_version(document: &Value) -> Result<u64, MigrationError> {
    let root = document.as_object().ok_or(MigrationError::NotAnObject)?;
    match root.get("version") {
        None => Ok(LEGACY_VERSION),
        Some(tag) => tag
            .as_u64()
            .ok_or_else(|| MigrationError::UnrecognizedVersion(tag.to_string())),
    }
}

/// Migrate a wire document to the current version.
///
/// The input is never modified. Documents already at or beyond the current
/// version come back as an identical copy. The result is not validated.
///
/// # Errors
///
/// - [`MigrationError::NotAnObject`] if the root is not an object.
/// - [`MigrationError::UnrecognizedVersion`] for a malformed tag.
/// - [`MigrationError::NoMigrationPath`] if the step chain has a gap.
pub fn migrate_value(document: &Value) -> Result<Value, MigrationError> {
    let mut version = source_version(document)?;
    if version >= CURRENT_VERSION {
        tracing::debug!(version, "report already current, passing through");
        return Ok(document.clone());
    }

    let mut root = match document {
        Value::Object(map) => map.clone(),
        _ => return Err(MigrationError::NotAnObject),
    };

    while version < CURRENT_VERSION {
        let step = STEPS
            .iter()
            .find(|s| s.from == version)
            .ok_or(MigrationError::NoMigrationPath { from: version })?;
        (step.apply)(&mut root);
        root.insert("version".to_string(), Value::from(step.to));
        tracing::debug!(from = step.from, to = step.to, step = step.name, "applied migration step");
        version = step.to;
    }

    Ok(Value::Object(root))
}

/// Drop `opaqueData` from the root and each environment, and move
/// `userSuppliedData` to `metadata`. An existing `metadata` map is kept and
/// the legacy map discarded.
fn v0_to_v1(root: &mut Map<String, Value>) {
    root.remove("opaqueData");

    let Some(Value::Array(environments)) = root.get_mut("environments") else {
        return;
    };
    for env in environments.iter_mut().filter_map(Value::as_object_mut) {
        env.remove("opaqueData");
        if let Some(data) = env.remove("userSuppliedData") {
            env.entry("metadata").or_insert(data);
        }
    }
}
