//! Defect report triage.
//!
//! An issue starts `pending`. An admin either approves it, which turns it
//! into a project, or rejects it. Both decisions are final.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const MAX_TITLE_LENGTH: usize = 200;

/// Categories offered by the defect report form.
pub const ISSUE_CATEGORIES: &[&str] = &["wasser", "elektrik", "haus", "garten", "sicherheit", "sonstiges"];

/// Category used when a report names none.
pub const DEFAULT_CATEGORY: &str = "sonstiges";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueStatus {
    Pending,
    Approved,
    Rejected,
}

impl IssueStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            IssueStatus::Pending => "pending",
            IssueStatus::Approved => "approved",
            IssueStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, IssueStatus::Pending)
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssueStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(IssueStatus::Pending),
            "approved" => Ok(IssueStatus::Approved),
            "rejected" => Ok(IssueStatus::Rejected),
            other => Err(CoreError::Validation(format!(
                "Invalid issue status '{other}'. Must be one of: pending, approved, rejected"
            ))),
        }
    }
}

/// Trim and check a report title.
pub fn validate_title(title: &str) -> Result<String, CoreError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Title is required".into()));
    }
    if trimmed.chars().count() > MAX_TITLE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Title exceeds maximum length of {MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Resolve the category of a report, falling back to [`DEFAULT_CATEGORY`].
pub fn resolve_category(category: Option<&str>) -> Result<&'static str, CoreError> {
    let Some(category) = category.map(str::trim).filter(|c| !c.is_empty()) else {
        return Ok(DEFAULT_CATEGORY);
    };
    ISSUE_CATEGORIES
        .iter()
        .copied()
        .find(|c| *c == category)
        .ok_or_else(|| {
            CoreError::Validation(format!(
                "Invalid issue category '{category}'. Must be one of: {}",
                ISSUE_CATEGORIES.join(", ")
            ))
        })
}

/// Check that an admin decision may be recorded on an issue in `current`.
pub fn validate_decision(current: IssueStatus) -> Result<(), CoreError> {
    if current.is_terminal() {
        return Err(CoreError::Conflict(format!("Issue has already been {current}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn title_is_required() {
        assert_matches!(validate_title("   "), Err(CoreError::Validation(_)));
        assert_eq!(validate_title("  Leaking tap ").unwrap(), "Leaking tap");
        assert!(validate_title(&"x".repeat(MAX_TITLE_LENGTH + 1)).is_err());
    }

    #[test]
    fn category_defaults_and_validates() {
        assert_eq!(resolve_category(None).unwrap(), "sonstiges");
        assert_eq!(resolve_category(Some("")).unwrap(), "sonstiges");
        assert_eq!(resolve_category(Some("wasser")).unwrap(), "wasser");
        assert_matches!(resolve_category(Some("pool")), Err(CoreError::Validation(_)));
    }

    #[test]
    fn decisions_are_terminal() {
        assert!(validate_decision(IssueStatus::Pending).is_ok());
        assert_matches!(validate_decision(IssueStatus::Approved), Err(CoreError::Conflict(_)));
        assert_matches!(validate_decision(IssueStatus::Rejected), Err(CoreError::Conflict(_)));
    }

    #[test]
    fn status_parses() {
        assert_eq!("rejected".parse::<IssueStatus>().unwrap(), IssueStatus::Rejected);
        assert!("closed".parse::<IssueStatus>().is_err());
    }
}
