//! Outbound mail drafts awaiting admin approval.
//!
//! A draft starts `pending`. Approving it sends the mail and marks it
//! `sent`; rejecting it marks it `rejected`. Both decisions are final.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Longest accepted mail body, in characters.
pub const MAX_BODY_LENGTH: usize = 20_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftStatus {
    Pending,
    Sent,
    Rejected,
}

impl DraftStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DraftStatus::Pending => "pending",
            DraftStatus::Sent => "sent",
            DraftStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for DraftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DraftStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(DraftStatus::Pending),
            "sent" => Ok(DraftStatus::Sent),
            "rejected" => Ok(DraftStatus::Rejected),
            other => Err(CoreError::Validation(format!(
                "Invalid draft status '{other}'. Must be one of: pending, sent, rejected"
            ))),
        }
    }
}

/// Only pending drafts can be approved or rejected.
pub fn validate_decision(current: DraftStatus) -> Result<(), CoreError> {
    match current {
        DraftStatus::Pending => Ok(()),
        done => Err(CoreError::Conflict(format!("Email draft was already {done}"))),
    }
}

/// The body to send: an admin's non-blank edit wins over the drafted text.
pub fn final_body<'a>(drafted: &'a str, edited: Option<&'a str>) -> Result<&'a str, CoreError> {
    let body = edited.filter(|b| !b.trim().is_empty()).unwrap_or(drafted);
    if body.chars().count() > MAX_BODY_LENGTH {
        return Err(CoreError::Validation(format!(
            "Email body exceeds maximum length of {MAX_BODY_LENGTH} characters"
        )));
    }
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn only_pending_drafts_can_be_decided() {
        assert!(validate_decision(DraftStatus::Pending).is_ok());
        assert_matches!(validate_decision(DraftStatus::Sent), Err(CoreError::Conflict(msg)) if msg.contains("sent"));
        assert_matches!(validate_decision(DraftStatus::Rejected), Err(CoreError::Conflict(_)));
    }

    #[test]
    fn edited_body_replaces_drafted_text() {
        assert_eq!(final_body("Hallo", Some("Hallo Herr Meier")).unwrap(), "Hallo Herr Meier");
        assert_eq!(final_body("Hallo", Some("   ")).unwrap(), "Hallo");
        assert_eq!(final_body("Hallo", None).unwrap(), "Hallo");
    }

    #[test]
    fn oversized_body_is_rejected() {
        let long = "x".repeat(MAX_BODY_LENGTH + 1);
        assert_matches!(final_body("Hallo", Some(&long)), Err(CoreError::Validation(_)));
    }

    #[test]
    fn status_parses_from_str() {
        assert_eq!("sent".parse::<DraftStatus>().unwrap(), DraftStatus::Sent);
        assert!("approved".parse::<DraftStatus>().is_err());
    }
}
