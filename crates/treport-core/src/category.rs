//! Well-known values for `Report.category`.
//!
//! The category names the adapter family that produced a report. Any
//! non-empty string of up to [`MAX_CATEGORY_LEN`] characters is accepted;
//! these constants cover the adapters viewers special-case.

/// Maximum length of a category string.
pub const MAX_CATEGORY_LEN: usize = 100;

/// Playwright test runner.
pub const PLAYWRIGHT: &str = "playwright";
/// pytest.
pub const PYTEST: &str = "pytest";
/// JUnit XML import.
pub const JUNIT: &str = "junit";
/// Jest.
pub const JEST: &str = "jest";
/// Vitest.
pub const VITEST: &str = "vitest";
/// Cypress.
pub const CYPRESS: &str = "cypress";
/// Benchmark / performance runs.
pub const PERF: &str = "perf";

/// All well-known categories.
pub const WELL_KNOWN: &[&str] = &[PLAYWRIGHT, PYTEST, JUNIT, JEST, VITEST, CYPRESS, PERF];

/// Whether `category` is one of the [`WELL_KNOWN`] values.
pub fn is_well_known(category: &str) -> bool {
    WELL_KNOWN.contains(&category)
}
