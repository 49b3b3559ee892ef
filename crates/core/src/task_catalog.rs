//! Normalization of recurring chores and one-off projects into one task shape.
//!
//! [`Task`] is a tagged union serialized with a `task_type` discriminator.
//! Every kind implements [`TaskView`]; the board engine only talks to that
//! trait, so a new kind needs a card type, a `TaskView` impl and one arm in
//! [`Task::view`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::due_status::{derive_status, next_due, CycleDays, DueStatus};
use crate::error::CoreError;
use crate::project_workflow::{Priority, ProjectStatus};
use crate::money::{self, Cents};
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// TaskType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Recurring,
    Project,
}

impl TaskType {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskType::Recurring => "recurring",
            TaskType::Project => "project",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "recurring" => Ok(TaskType::Recurring),
            "project" => Ok(TaskType::Project),
            other => Err(CoreError::Validation(format!(
                "Invalid task type '{other}'. Must be one of: recurring, project"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Common view
// ---------------------------------------------------------------------------

/// Fields every task kind exposes to the board.
pub trait TaskView {
    fn id(&self) -> DbId;
    fn title(&self) -> &str;
    fn category(&self) -> &str;
    fn effort(&self) -> Option<&str>;
    fn credit_value(&self) -> Option<Cents>;
    /// The value behind the synthetic `status` column.
    fn status_key(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// A recurring chore as loaded from storage, before derivation.
#[derive(Debug, Clone, PartialEq)]
pub struct RecurringSource {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub effort: Option<String>,
    pub credit_value: Cents,
    pub cycle: CycleDays,
    pub last_completed_at: Option<Timestamp>,
    pub last_completed_by: Option<String>,
}

// ---------------------------------------------------------------------------
// Cards
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecurringCard {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub effort: Option<String>,
    #[serde(with = "money::euros")]
    pub credit_value: Cents,
    pub cycle_days: CycleDays,
    pub last_completed_at: Option<Timestamp>,
    pub last_completed_by: Option<String>,
    pub next_due: Option<Timestamp>,
    pub due_status: DueStatus,
}

impl RecurringCard {
    pub fn from_source(source: RecurringSource, now: Timestamp) -> Self {
        Self {
            due_status: derive_status(source.last_completed_at, source.cycle, now),
            next_due: next_due(source.last_completed_at, source.cycle),
            id: source.id,
            title: source.title,
            description: source.description,
            category: source.category,
            effort: source.effort,
            credit_value: source.credit_value,
            cycle_days: source.cycle,
            last_completed_at: source.last_completed_at,
            last_completed_by: source.last_completed_by,
        }
    }
}

impl TaskView for RecurringCard {
    fn id(&self) -> DbId {
        self.id
    }
    fn title(&self) -> &str {
        &self.title
    }
    fn category(&self) -> &str {
        &self.category
    }
    fn effort(&self) -> Option<&str> {
        self.effort.as_deref()
    }
    fn credit_value(&self) -> Option<Cents> {
        Some(self.credit_value)
    }
    fn status_key(&self) -> &str {
        self.due_status.as_str()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectCard {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub effort: Option<String>,
    pub priority: Priority,
    pub status: ProjectStatus,
    pub estimated_cost: Option<String>,
    #[serde(with = "money::euros_opt")]
    pub credit_value: Option<Cents>,
    pub assigned_to: Option<String>,
    pub completed_at: Option<Timestamp>,
    pub completed_by: Option<String>,
    pub completion_photo: Option<String>,
    pub confirmed_at: Option<Timestamp>,
}

impl TaskView for ProjectCard {
    fn id(&self) -> DbId {
        self.id
    }
    fn title(&self) -> &str {
        &self.title
    }
    fn category(&self) -> &str {
        &self.category
    }
    fn effort(&self) -> Option<&str> {
        self.effort.as_deref()
    }
    fn credit_value(&self) -> Option<Cents> {
        self.credit_value
    }
    fn status_key(&self) -> &str {
        self.status.as_str()
    }
}

// ---------------------------------------------------------------------------
// Task
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "task_type", rename_all = "lowercase")]
pub enum Task {
    Recurring(RecurringCard),
    Project(ProjectCard),
}

impl Task {
    pub fn task_type(&self) -> TaskType {
        match self {
            Task::Recurring(_) => TaskType::Recurring,
            Task::Project(_) => TaskType::Project,
        }
    }

    pub fn view(&self) -> &dyn TaskView {
        match self {
            Task::Recurring(card) => card,
            Task::Project(card) => card,
        }
    }

    pub fn as_project(&self) -> Option<&ProjectCard> {
        match self {
            Task::Project(card) => Some(card),
            Task::Recurring(_) => None,
        }
    }
}

/// Merge both task kinds into one list, deriving due-state for chores.
///
/// Total: every input produces exactly one task.
pub fn normalize(
    recurring: impl IntoIterator<Item = RecurringSource>,
    projects: impl IntoIterator<Item = ProjectCard>,
    now: Timestamp,
) -> Vec<Task> {
    recurring
        .into_iter()
        .map(|source| Task::Recurring(RecurringCard::from_source(source, now)))
        .chain(projects.into_iter().map(Task::Project))
        .collect()
}

// ---------------------------------------------------------------------------
// Test fixtures
// ---------------------------------------------------------------------------


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
