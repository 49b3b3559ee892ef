//! Email draft model and DTOs.

use gardenkeep_core::email_draft::{DraftStatus, MAX_BODY_LENGTH};
use gardenkeep_core::error::CoreError;
use gardenkeep_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// `validator` length bounds are `u64`; mirror the core limit in that type.
const MAX_BODY_LENGTH_U64: u64 = MAX_BODY_LENGTH as u64;

/// A row from the `email_drafts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EmailDraft {
    pub id: DbId,
    pub to_email: String,
    pub to_name: Option<String>,
    pub subject: String,
    pub body: String,
    /// The text actually sent, set on approval.
    pub final_body: Option<String>,
    pub task_id: Option<DbId>,
    pub task_title: Option<String>,
    pub status: String,
    pub created_by: String,
    pub decided_by: Option<String>,
    pub decided_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl EmailDraft {
    pub fn status(&self) -> Result<DraftStatus, CoreError> {
        self.status.parse()
    }
}

/// JSON body for queueing a draft.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateEmailDraftRequest {
    #[serde(alias = "to")]
    #[validate(email(message = "Recipient must be a valid email address"))]
    pub to_email: String,
    #[serde(alias = "toName")]
    #[validate(length(max = 200))]
    pub to_name: Option<String>,
    #[validate(length(min = 1, max = 200, message = "Subject is required"))]
    pub subject: String,
    #[validate(length(min = 1, max = MAX_BODY_LENGTH_U64, message = "Body is required"))]
    pub body: String,
    #[serde(alias = "taskId")]
    pub task_id: Option<DbId>,
    #[serde(alias = "taskTitle")]
    #[validate(length(max = 200))]
    pub task_title: Option<String>,
}

/// DTO for inserting a draft after validation.
#[derive(Debug, Clone)]
pub struct CreateEmailDraft {
    pub to_email: String,
    pub to_name: Option<String>,
    pub subject: String,
    pub body: String,
    pub task_id: Option<DbId>,
    pub task_title: Option<String>,
    pub created_by: String,
}

/// Admin approval, optionally replacing the drafted body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApproveEmailDraft {
    pub body: Option<String>,
}

/// Query parameters for listing drafts.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmailDraftListParams {
    /// `pending` (default), `sent`, `rejected` or `all`.
    pub status: Option<String>,
}
