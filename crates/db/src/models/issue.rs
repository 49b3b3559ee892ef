//! Defect report model and DTOs.

use gardenkeep_core::error::CoreError;
use gardenkeep_core::issue::IssueStatus;
use gardenkeep_core::project_workflow::Priority;
use gardenkeep_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `issues` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Issue {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub photo_url: Option<String>,
    pub reported_by: Option<DbId>,
    pub reporter_email: String,
    pub status: String,
    pub admin_notes: Option<String>,
    pub converted_to_project_id: Option<DbId>,
    pub decided_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Issue {
    pub fn status(&self) -> Result<IssueStatus, CoreError> {
        self.status.parse()
    }
}

/// JSON body of a defect report.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ReportIssue {
    pub title: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    pub category: Option<String>,
}

/// DTO for inserting a report after validation.
#[derive(Debug, Clone)]
pub struct CreateIssue {
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub photo_url: Option<String>,
    pub reported_by: Option<DbId>,
    pub reporter_email: String,
}

/// Admin approval of a report.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ApproveIssue {
    pub priority: Option<Priority>,
    #[validate(length(max = 5000))]
    pub admin_notes: Option<String>,
}

/// Admin rejection of a report.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RejectIssue {
    #[validate(length(max = 5000))]
    pub admin_notes: Option<String>,
}
