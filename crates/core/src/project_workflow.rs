//! Project status, priority, and the completion/confirmation workflow.
//!
//! ```text
//! open <-> next <-> in_progress --complete--> done(unconfirmed) --confirm--> done(confirmed)
//! ```
//!
//! `open`, `next` and `in_progress` may be reordered freely by an admin or
//! the assignee. Completion moves an `in_progress` project to `done` and is
//! open to any authenticated user. Confirmation is admin-only, awards credit
//! to whoever completed the project, and is terminal.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::credit::{CreditEntry, CreditKind, CreditLedger};
use crate::error::CoreError;
use crate::roles::ROLE_ADMIN;
use crate::money::{self, Cents};
use crate::types::{DbId, Timestamp};

/// Maximum length for completion notes.
pub const MAX_NOTES_LENGTH: usize = 5_000;

// ---------------------------------------------------------------------------
// ProjectStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Open,
    Next,
    InProgress,
    Done,
}

impl ProjectStatus {
    /// Board columns, left to right.
    pub const ALL: [ProjectStatus; 4] = [
        ProjectStatus::Open,
        ProjectStatus::Next,
        ProjectStatus::InProgress,
        ProjectStatus::Done,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProjectStatus::Open => "open",
            ProjectStatus::Next => "next",
            ProjectStatus::InProgress => "in_progress",
            ProjectStatus::Done => "done",
        }
    }

    /// Statuses between which a project may be moved without side effects.
    pub fn is_reorderable(self) -> bool {
        !matches!(self, ProjectStatus::Done)
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(ProjectStatus::Open),
            "next" => Ok(ProjectStatus::Next),
            "in_progress" => Ok(ProjectStatus::InProgress),
            "done" => Ok(ProjectStatus::Done),
            other => Err(CoreError::Validation(format!(
                "Invalid project status '{other}'. Must be one of: open, next, in_progress, done"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Critical,
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Critical => "critical",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    /// Badge colour used by the board for the card's left border.
    pub fn badge_color(self) -> &'static str {
        match self {
            Priority::Critical => "red",
            Priority::High => "amber",
            Priority::Medium => "blue",
            Priority::Low => "green",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "critical" => Ok(Priority::Critical),
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(CoreError::Validation(format!(
                "Invalid priority '{other}'. Must be one of: critical, high, medium, low"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// WorkflowState
// ---------------------------------------------------------------------------

/// The workflow position of a project, splitting `done` by confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    Open,
    Next,
    InProgress,
    DoneUnconfirmed,
    DoneConfirmed,
}

impl WorkflowState {
    pub fn of(status: ProjectStatus, confirmed: bool) -> Self {
        match (status, confirmed) {
            (ProjectStatus::Open, _) => WorkflowState::Open,
            (ProjectStatus::Next, _) => WorkflowState::Next,
            (ProjectStatus::InProgress, _) => WorkflowState::InProgress,
            (ProjectStatus::Done, false) => WorkflowState::DoneUnconfirmed,
            (ProjectStatus::Done, true) => WorkflowState::DoneConfirmed,
        }
    }

    pub fn status(self) -> ProjectStatus {
        match self {
            WorkflowState::Open => ProjectStatus::Open,
            WorkflowState::Next => ProjectStatus::Next,
            WorkflowState::InProgress => ProjectStatus::InProgress,
            WorkflowState::DoneUnconfirmed | WorkflowState::DoneConfirmed => ProjectStatus::Done,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, WorkflowState::DoneConfirmed)
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WorkflowError {
    #[error("Invalid state transition from '{from}' to '{to}'")]
    InvalidTransition { from: &'static str, to: &'static str },

    #[error("Project completion has already been processed")]
    AlreadyProcessed,

    #[error("Only an admin or the assignee may move this project")]
    NotAssignee,

    #[error("Only an admin may confirm a completion")]
    AdminRequired,

    #[error("Credit amount must be a non-negative finite number")]
    InvalidCredit,

    #[error("Notes exceed maximum length of {MAX_NOTES_LENGTH} characters")]
    NotesTooLong,
}

impl From<WorkflowError> for CoreError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::InvalidTransition { .. } | WorkflowError::AlreadyProcessed => {
                CoreError::Conflict(err.to_string())
            }
            WorkflowError::NotAssignee | WorkflowError::AdminRequired => {
                CoreError::Forbidden(err.to_string())
            }
            WorkflowError::InvalidCredit | WorkflowError::NotesTooLong => {
                CoreError::Validation(err.to_string())
            }
        }
    }
}

fn state_name(state: WorkflowState) -> &'static str {
    match state {
        WorkflowState::Open => "open",
        WorkflowState::Next => "next",
        WorkflowState::InProgress => "in_progress",
        WorkflowState::DoneUnconfirmed => "done(unconfirmed)",
        WorkflowState::DoneConfirmed => "done(confirmed)",
    }
}

// ---------------------------------------------------------------------------
// Transition guards
// ---------------------------------------------------------------------------

/// Check a side-effect-free reorder between `open`, `next` and `in_progress`.
///
/// `assigned_to` is the project's assignee email; an unassigned project may
/// be moved by any authenticated user.
pub fn validate_reorder(
    current: WorkflowState,
    target: ProjectStatus,
    actor_email: &str,
    actor_role: &str,
    assigned_to: Option<&str>,
) -> Result<(), WorkflowError> {
    if !current.status().is_reorderable() || !target.is_reorderable() {
        return Err(WorkflowError::InvalidTransition {
            from: state_name(current),
            to: target.as_str(),
        });
    }
    let allowed = actor_role == ROLE_ADMIN
        || assigned_to.map_or(true, |assignee| assignee.eq_ignore_ascii_case(actor_email));
    if !allowed {
        return Err(WorkflowError::NotAssignee);
    }
    Ok(())
}

/// Check that a project may be marked complete.
pub fn validate_completion(current: WorkflowState, notes: Option<&str>) -> Result<(), WorkflowError> {
    if current != WorkflowState::InProgress {
        return Err(WorkflowError::InvalidTransition {
            from: state_name(current),
            to: state_name(WorkflowState::DoneUnconfirmed),
        });
    }
    if notes.is_some_and(|n| n.len() > MAX_NOTES_LENGTH) {
        return Err(WorkflowError::NotesTooLong);
    }
    Ok(())
}

/// Check that a completion may be confirmed with the given credit.
pub fn validate_confirmation(
    current: WorkflowState,
    actor_role: &str,
    credit_amount: Cents,
) -> Result<(), WorkflowError> {
    if actor_role != ROLE_ADMIN {
        return Err(WorkflowError::AdminRequired);
    }
    if credit_amount < 0 {
        return Err(WorkflowError::InvalidCredit);
    }
    match current {
        WorkflowState::DoneUnconfirmed => Ok(()),
        WorkflowState::DoneConfirmed => Err(WorkflowError::AlreadyProcessed),
        other => Err(WorkflowError::InvalidTransition {
            from: state_name(other),
            to: state_name(WorkflowState::DoneConfirmed),
        }),
    }
}

// ---------------------------------------------------------------------------
// In-memory project record
// ---------------------------------------------------------------------------

/// Completion metadata, set when a project enters `done`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Completion {
    pub completed_at: Timestamp,
    pub completed_by: String,
    pub photo_url: Option<String>,
    pub notes: Option<String>,
}

/// Confirmation metadata. `confirmed_at` and `credit_awarded` exist together.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Confirmation {
    pub confirmed_at: Timestamp,
    pub confirmed_by: String,
    #[serde(with = "money::euros")]
    pub credit_awarded: Cents,
}

/// A project driven through the workflow without a database.
///
/// The repository layer implements the same transitions as conditional
/// updates; this type carries the rules for callers that keep projects in
/// memory and for tests.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectRecord {
    pub id: DbId,
    pub title: String,
    pub status: ProjectStatus,
    pub assigned_to: Option<String>,
    pub completion: Option<Completion>,
    pub confirmation: Option<Confirmation>,
}

impl ProjectRecord {
    pub fn new(id: DbId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            status: ProjectStatus::Open,
            assigned_to: None,
            completion: None,
            confirmation: None,
        }
    }

    pub fn state(&self) -> WorkflowState {
        WorkflowState::of(self.status, self.confirmation.is_some())
    }

    pub fn move_to(
        &mut self,
        target: ProjectStatus,
        actor_email: &str,
        actor_role: &str,
    ) -> Result<(), WorkflowError> {
        validate_reorder(
            self.state(),
            target,
            actor_email,
            actor_role,
            self.assigned_to.as_deref(),
        )?;
        self.status = target;
        Ok(())
    }

    pub fn complete(
        &mut self,
        actor_email: &str,
        notes: Option<String>,
        photo_url: Option<String>,
        now: Timestamp,
    ) -> Result<(), WorkflowError> {
        validate_completion(self.state(), notes.as_deref())?;
        self.status = ProjectStatus::Done;
        self.completion = Some(Completion {
            completed_at: now,
            completed_by: actor_email.to_string(),
            photo_url,
            notes,
        });
        Ok(())
    }

    /// Confirm the completion and credit the completer in `ledger`.
    ///
    /// A rejected confirmation leaves both the project and the ledger
    /// untouched.
    pub fn confirm<'l>(
        &mut self,
        admin_email: &str,
        admin_role: &str,
        credit_amount: Cents,
        now: Timestamp,
        ledger: &'l mut CreditLedger,
    ) -> Result<&'l CreditEntry, WorkflowError> {
        validate_confirmation(self.state(), admin_role, credit_amount)?;
        let completed_by = self
            .completion
            .as_ref()
            .map(|c| c.completed_by.clone())
            .ok_or(WorkflowError::InvalidTransition {
                from: state_name(self.state()),
                to: state_name(WorkflowState::DoneConfirmed),
            })?;

        self.confirmation = Some(Confirmation {
            confirmed_at: now,
            confirmed_by: admin_email.to_string(),
            credit_awarded: credit_amount,
        });
        Ok(ledger.append(
            &completed_by,
            credit_amount,
            &self.title,
            CreditKind::Earned,
            now,
        ))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::ROLE_USER;
    use assert_matches::assert_matches;
    use chrono::Utc;

    const ADMIN: &str = "admin@example.com";
    const WORKER: &str = "worker@example.com";

    fn in_progress_project() -> ProjectRecord {
        let mut p = ProjectRecord::new(1, "Mow front lawn");
        p.move_to(ProjectStatus::InProgress, WORKER, ROLE_USER).unwrap();
        p
    }

    #[test]
    fn statuses_round_trip_through_str() {
        for s in ProjectStatus::ALL {
            assert_eq!(s.as_str().parse::<ProjectStatus>().unwrap(), s);
        }
        assert!("offen".parse::<ProjectStatus>().is_err());
        assert_eq!("critical".parse::<Priority>().unwrap(), Priority::Critical);
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn reorder_among_open_states_is_free() {
        let mut p = ProjectRecord::new(1, "Fence");
        p.move_to(ProjectStatus::Next, WORKER, ROLE_USER).unwrap();
        p.move_to(ProjectStatus::InProgress, WORKER, ROLE_USER).unwrap();
        p.move_to(ProjectStatus::Open, WORKER, ROLE_USER).unwrap();
        assert_eq!(p.state(), WorkflowState::Open);
    }

    #[test]
    fn reorder_into_done_is_rejected() {
        let mut p = ProjectRecord::new(1, "Fence");
        assert_matches!(
            p.move_to(ProjectStatus::Done, ADMIN, ROLE_ADMIN),
            Err(WorkflowError::InvalidTransition { .. })
        );
    }

    #[test]
    fn reorder_restricted_to_admin_or_assignee() {
        let mut p = ProjectRecord::new(1, "Roof");
        p.assigned_to = Some(WORKER.to_string());
        assert_matches!(
            p.move_to(ProjectStatus::Next, "someone@example.com", ROLE_USER),
            Err(WorkflowError::NotAssignee)
        );
        assert!(p.move_to(ProjectStatus::Next, "Worker@Example.com", ROLE_USER).is_ok());
        assert!(p.move_to(ProjectStatus::Open, ADMIN, ROLE_ADMIN).is_ok());
    }

    #[test]
    fn completion_requires_in_progress() {
        let mut p = ProjectRecord::new(1, "Gutter");
        let err = p.complete(WORKER, None, None, Utc::now()).unwrap_err();
        assert_matches!(err, WorkflowError::InvalidTransition { from: "open", .. });
        assert_eq!(p.status, ProjectStatus::Open);
        assert!(p.completion.is_none());
    }

    #[test]
    fn completion_sets_metadata() {
        let mut p = in_progress_project();
        let now = Utc::now();
        p.complete(WORKER, Some("mowed front lawn".into()), None, now).unwrap();
        assert_eq!(p.state(), WorkflowState::DoneUnconfirmed);
        let c = p.completion.as_ref().unwrap();
        assert_eq!(c.completed_by, WORKER);
        assert_eq!(c.completed_at, now);
        assert_eq!(c.notes.as_deref(), Some("mowed front lawn"));
    }

    #[test]
    fn completing_twice_is_rejected() {
        let mut p = in_progress_project();
        p.complete(WORKER, None, None, Utc::now()).unwrap();
        assert_matches!(
            p.complete(WORKER, None, None, Utc::now()),
            Err(WorkflowError::InvalidTransition { .. })
        );
    }

    #[test]
    fn confirmation_awards_credit_to_completer() {
        let mut ledger = CreditLedger::new();
        let before = ledger.balance(WORKER);
        let mut p = in_progress_project();
        p.complete(WORKER, Some("mowed front lawn".into()), None, Utc::now()).unwrap();

        let entry = p.confirm(ADMIN, ROLE_ADMIN, 1_500, Utc::now(), &mut ledger).unwrap();
        assert_eq!(entry.owner_email, WORKER);
        assert_eq!(entry.reason, "Mow front lawn");
        assert_eq!(entry.kind, CreditKind::Earned);

        assert_eq!(ledger.balance(WORKER) - before, 1_500);
        assert_eq!(p.state(), WorkflowState::DoneConfirmed);
        let conf = p.confirmation.as_ref().unwrap();
        assert_eq!(conf.confirmed_by, ADMIN);
        assert_eq!(conf.credit_awarded, 1_500);
    }

    #[test]
    fn second_confirmation_is_rejected_without_ledger_append() {
        let mut ledger = CreditLedger::new();
        let mut p = in_progress_project();
        p.complete(WORKER, None, None, Utc::now()).unwrap();
        p.confirm(ADMIN, ROLE_ADMIN, 1_000, Utc::now(), &mut ledger).unwrap();

        let err = p.confirm(ADMIN, ROLE_ADMIN, 1_000, Utc::now(), &mut ledger).unwrap_err();
        assert_eq!(err, WorkflowError::AlreadyProcessed);
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.balance(WORKER), 1_000);
    }

    #[test]
    fn zero_credit_confirmation_is_allowed() {
        let mut ledger = CreditLedger::new();
        let mut p = in_progress_project();
        p.complete(WORKER, None, None, Utc::now()).unwrap();
        p.confirm(ADMIN, ROLE_ADMIN, 0, Utc::now(), &mut ledger).unwrap();
        assert_eq!(p.confirmation.as_ref().unwrap().credit_awarded, 0);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn confirmation_requires_admin_and_valid_credit() {
        let mut ledger = CreditLedger::new();
        let mut p = in_progress_project();
        p.complete(WORKER, None, None, Utc::now()).unwrap();
        assert_matches!(
            p.confirm(WORKER, ROLE_USER, 500, Utc::now(), &mut ledger),
            Err(WorkflowError::AdminRequired)
        );
        assert_matches!(
            p.confirm(ADMIN, ROLE_ADMIN, -100, Utc::now(), &mut ledger),
            Err(WorkflowError::InvalidCredit)
        );
        assert!(ledger.is_empty());
        assert!(p.confirmation.is_none());
    }

    #[test]
    fn confirming_an_unfinished_project_is_an_invalid_transition() {
        let mut ledger = CreditLedger::new();
        let mut p = in_progress_project();
        assert_matches!(
            p.confirm(ADMIN, ROLE_ADMIN, 500, Utc::now(), &mut ledger),
            Err(WorkflowError::InvalidTransition { from: "in_progress", .. })
        );
    }

    #[test]
    fn confirmed_state_is_terminal() {
        let mut ledger = CreditLedger::new();
        let mut p = in_progress_project();
        p.complete(WORKER, None, None, Utc::now()).unwrap();
        p.confirm(ADMIN, ROLE_ADMIN, 100, Utc::now(), &mut ledger).unwrap();
        assert!(p.state().is_terminal());
        assert!(p.move_to(ProjectStatus::Open, ADMIN, ROLE_ADMIN).is_err());
    }

    #[test]
    fn workflow_errors_map_to_core_error_classes() {
        assert_matches!(CoreError::from(WorkflowError::AlreadyProcessed), CoreError::Conflict(_));
        assert_matches!(
            CoreError::from(WorkflowError::InvalidTransition { from: "open", to: "done" }),
            CoreError::Conflict(_)
        );
        assert_matches!(CoreError::from(WorkflowError::InvalidCredit), CoreError::Validation(_));
        assert_matches!(CoreError::from(WorkflowError::AdminRequired), CoreError::Forbidden(_));
    }
}
