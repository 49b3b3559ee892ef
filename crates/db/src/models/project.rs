//! Project entity model and DTOs.

use gardenkeep_core::error::CoreError;
use gardenkeep_core::project_workflow::{Priority, ProjectStatus, WorkflowState};
use gardenkeep_core::task_catalog::ProjectCard;
use gardenkeep_core::money::{self, Cents};
use gardenkeep_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::credit::CreditEntry;

/// A project row from the `projects` table.
///
/// `status` and `priority` are stored as text and guarded by check
/// constraints; use [`Project::status`] and [`Project::priority`] for the
/// typed values.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub effort: Option<String>,
    pub priority: String,
    pub status: String,
    pub estimated_cost: Option<String>,
    #[serde(with = "money::euros_opt")]
    pub credit_value: Option<Cents>,
    pub assigned_to: Option<String>,
    pub created_by: Option<String>,
    pub completed_at: Option<Timestamp>,
    pub completed_by: Option<String>,
    pub completion_photo: Option<String>,
    pub completion_notes: Option<String>,
    pub confirmed_at: Option<Timestamp>,
    pub confirmed_by: Option<String>,
    #[serde(with = "money::euros_opt")]
    pub credit_awarded: Option<Cents>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Project {
    pub fn status(&self) -> Result<ProjectStatus, CoreError> {
        self.status.parse()
    }

    pub fn priority(&self) -> Result<Priority, CoreError> {
        self.priority.parse()
    }

    pub fn workflow_state(&self) -> Result<WorkflowState, CoreError> {
        Ok(WorkflowState::of(self.status()?, self.confirmed_at.is_some()))
    }

    /// Convert into the board's project card.
    pub fn to_card(&self) -> Result<ProjectCard, CoreError> {
        Ok(ProjectCard {
            id: self.id,
            title: self.title.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            effort: self.effort.clone(),
            priority: self.priority()?,
            status: self.status()?,
            estimated_cost: self.estimated_cost.clone(),
            credit_value: self.credit_value,
            assigned_to: self.assigned_to.clone(),
            completed_at: self.completed_at,
            completed_by: self.completed_by.clone(),
            completion_photo: self.completion_photo.clone(),
            confirmed_at: self.confirmed_at,
        })
    }
}

/// DTO for creating a new project.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProject {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub description: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub category: String,
    #[validate(length(max = 50))]
    pub effort: Option<String>,
    /// Defaults to `medium` if omitted.
    pub priority: Option<Priority>,
    pub estimated_cost: Option<String>,
    #[serde(default, with = "money::euros_opt")]
    #[validate(range(min = 0))]
    pub credit_value: Option<Cents>,
    #[validate(email)]
    pub assigned_to: Option<String>,
    /// Filled in by the handler from the acting identity.
    #[serde(skip)]
    pub created_by: Option<String>,
}

/// DTO for updating an existing project. All fields are optional.
///
/// A `status` change is a workflow move and is applied separately from the
/// plain field updates.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProject {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub category: Option<String>,
    #[validate(length(max = 50))]
    pub effort: Option<String>,
    pub priority: Option<Priority>,
    pub status: Option<ProjectStatus>,
    pub estimated_cost: Option<String>,
    #[serde(default, with = "money::euros_opt")]
    #[validate(range(min = 0))]
    pub credit_value: Option<Cents>,
    #[validate(email)]
    pub assigned_to: Option<String>,
}

impl UpdateProject {
    /// Whether any non-status field is set.
    pub fn has_field_changes(&self) -> bool {
        self.title.is_some()
            || self.description.is_some()
            || self.category.is_some()
            || self.effort.is_some()
            || self.priority.is_some()
            || self.estimated_cost.is_some()
            || self.credit_value.is_some()
            || self.assigned_to.is_some()
    }
}

/// Request body for completing a project.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompleteProject {
    pub notes: Option<String>,
    pub photo_url: Option<String>,
}

/// Request body for confirming a completed project.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmProject {
    #[serde(alias = "creditAmount", with = "money::euros")]
    pub credit_amount: Cents,
}

/// A confirmed project together with the ledger entry it produced.
#[derive(Debug, Clone, Serialize)]
pub struct ConfirmedProject {
    pub project: Project,
    pub credit: CreditEntry,
}
