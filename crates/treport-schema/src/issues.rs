//! # Issue Reports
//!
//! A failed validation produces an ordered list of [`ValidationIssue`]s,
//! each a JSON Pointer into the document plus a message. The list itself is
//! never truncated. Only its `Display` form is capped, so a caller can
//! inspect every issue while a log line stays bounded no matter how
//! malformed the input was.

use std::fmt;

use crate::config::MAX_REPORTED_ISSUES;

/// One violation, located by JSON Pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// JSON Pointer to the offending value. Empty for the document root.
    pub path: String,
    /// Human-readable description.
    pub message: String,
}

impl ValidationIssue {
    /// Build an issue.
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.path, self.message)
        }
    }
}

/// A non-empty, ordered list of issues from one validation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssues {
    issues: Vec<ValidationIssue>,
    max_reported: usize,
}

impl ValidationIssues {
    /// Wrap `issues`, or `None` if there are none.
    pub fn from_vec(issues: Vec<ValidationIssue>) -> Option<Self> {
        Self::with_cap(issues, MAX_REPORTED_ISSUES)
    }

    /// Like [`from_vec`](Self::from_vec) with a custom display cap.
    pub fn with_cap(issues: Vec<ValidationIssue>, max_reported: usize) -> Option<Self> {
        if issues.is_empty() {
            None
        } else {
            Some(Self {
                issues,
                max_reported,
            })
        }
    }

    /// Total number of issues, including those the display omits.
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// Always `false`; an empty list is represented as `None`.
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// All issues in report order.
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    /// Issues located at exactly `path`.
    pub fn at<'s>(&'s self, path: &'s str) -> impl Iterator<Item = &'s ValidationIssue> + 's {
        self.issues.iter().filter(move |i| i.path == path)
    }

    /// Consume into the inner list.
    pub fn into_inner(self) -> Vec<ValidationIssue> {
        self.issues
    }
}

impl fmt::Display for ValidationIssues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_issues(&self.issues, self.max_reported))
    }
}

/// Render at most `max` issues, one per line, followed by
/// `...and N more issues...` when some were left out.
pub fn format_issues(issues: &[ValidationIssue], max: usize) -> String {
    let mut lines: Vec<String> = issues.iter().take(max).map(ToString::to_string).collect();
    let hidden = issues.len().saturating_sub(max);
    if hidden > 0 {
        lines.push(format!("...and {hidden} more issues..."));
    }
    lines.join("\n")
}
