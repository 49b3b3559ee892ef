//! Recurring chore model, completion log, and DTOs.

use gardenkeep_core::due_status::CycleDays;
use gardenkeep_core::error::CoreError;
use gardenkeep_core::task_catalog::RecurringSource;
use gardenkeep_core::money::{self, Cents};
use gardenkeep_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::credit::CreditEntry;

/// A row from the `recurring_tasks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RecurringTask {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub effort: Option<String>,
    pub cycle_days: i32,
    #[serde(with = "money::euros")]
    pub credit_value: Cents,
    pub last_completed_at: Option<Timestamp>,
    pub last_completed_by: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl RecurringTask {
    /// Convert into the input of task normalization.
    ///
    /// Fails only if the stored cycle violates the table's check constraint.
    pub fn to_source(&self) -> Result<RecurringSource, CoreError> {
        Ok(RecurringSource {
            id: self.id,
            title: self.title.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            effort: self.effort.clone(),
            credit_value: self.credit_value,
            cycle: CycleDays::new(self.cycle_days)?,
            last_completed_at: self.last_completed_at,
            last_completed_by: self.last_completed_by.clone(),
        })
    }
}

/// DTO for creating a recurring chore.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRecurringTask {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub description: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub category: String,
    #[validate(length(max = 50))]
    pub effort: Option<String>,
    #[validate(range(min = 1, max = 3650))]
    pub cycle_days: i32,
    #[serde(default, with = "money::euros_opt")]
    #[validate(range(min = 0))]
    pub credit_value: Option<Cents>,
}

/// DTO for updating a recurring chore. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateRecurringTask {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub category: Option<String>,
    #[validate(length(max = 50))]
    pub effort: Option<String>,
    #[validate(range(min = 1, max = 3650))]
    pub cycle_days: Option<i32>,
    #[serde(default, with = "money::euros_opt")]
    #[validate(range(min = 0))]
    pub credit_value: Option<Cents>,
    pub is_active: Option<bool>,
}

/// A row from the `maintenance_log` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MaintenanceLogEntry {
    pub id: DbId,
    pub recurring_task_id: DbId,
    pub completed_by: String,
    pub completed_at: Timestamp,
    pub notes: Option<String>,
    pub photo_url: Option<String>,
    #[serde(with = "money::euros")]
    pub credit_awarded: Cents,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request body for completing a recurring chore.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CompleteRecurringTask {
    #[validate(length(max = 5000))]
    pub notes: Option<String>,
    pub photo_url: Option<String>,
}

/// Everything written by one chore completion.
#[derive(Debug, Clone, Serialize)]
pub struct RecurringCompletion {
    pub task: RecurringTask,
    pub log: MaintenanceLogEntry,
    /// Present when the chore carries a positive credit value.
    pub credit: Option<CreditEntry>,
}
