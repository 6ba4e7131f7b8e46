//! Validator configuration.
//!
//! Defaults suit every caller in this workspace. Override via environment
//! variables or explicit construction.

/// Default number of issues rendered before the "more issues" line.
pub const MAX_REPORTED_ISSUES: usize = 5;

/// Tunables for [`ReportValidator`](crate::ReportValidator).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatorConfig {
    /// Issues rendered by `Display` before truncation.
    /// Default: [`MAX_REPORTED_ISSUES`].
    pub max_reported_issues: usize,
    /// Reject attempts whose `environmentIdx` does not index into
    /// `environments`. Default: `true`.
    pub check_environment_refs: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_reported_issues: MAX_REPORTED_ISSUES,
            check_environment_refs: true,
        }
    }
}

impl ValidatorConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `TREPORT_MAX_ISSUES` (default: 5)
    /// - `TREPORT_CHECK_ENV_REFS` (default: `true`; accepts `true`/`false`/`1`/`0`)
    ///
    /// Unparseable values fall back to the default with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            max_reported_issues: parse_var(
                &lookup,
                "TREPORT_MAX_ISSUES",
                |raw| raw.parse().ok(),
                defaults.max_reported_issues,
            ),
            check_environment_refs: parse_var(
                &lookup,
                "TREPORT_CHECK_ENV_REFS",
                parse_bool,
                defaults.check_environment_refs,
            ),
        }
    }
}

fn parse_var<T: std::fmt::Debug + Copy>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &str,
    parse: impl Fn(&str) -> Option<T>,
    default: T,
) -> T {
    let Some(raw) = lookup(var) else {
        return default;
    };
    match parse(raw.trim()) {
        Some(value) => value,
        None => {
            tracing::warn!(var, value = %raw, ?default, "ignoring unparseable setting");
            default
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(ValidatorConfig::from_lookup(lookup(&[])), ValidatorConfig::default());
    }

    #[test]
    fn reads_overrides() {
        let cfg = ValidatorConfig::from_lookup(lookup(&[
            ("TREPORT_MAX_ISSUES", "12"),
            ("TREPORT_CHECK_ENV_REFS", "FALSE"),
        ]));
        assert_eq!(cfg.max_reported_issues, 12);
        assert!(!cfg.check_environment_refs);
    }

    #[test]
    fn bad_values_fall_back() {
        let cfg = ValidatorConfig::from_lookup(lookup(&[
            ("TREPORT_MAX_ISSUES", "lots"),
            ("TREPORT_CHECK_ENV_REFS", "maybe"),
        ]));
        assert_eq!(cfg, ValidatorConfig::default());
    }
}
