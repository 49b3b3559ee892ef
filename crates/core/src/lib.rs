//! Gardenkeep domain logic.
//!
//! Pure, I/O-free building blocks shared by the persistence and HTTP
//! layers:
//!
//! - [`due_status`]: due-state of recurring chores.
//! - [`credit`]: append-only credit ledger.
//! - [`task_catalog`]: chores and projects normalized into one task shape.
//! - [`board`]: filtering, sorting, columns and drag-and-drop for the board.
//! - [`project_workflow`]: project completion and confirmation state machine.
//! - [`booking`], [`issue`], [`media`]: booking pricing, defect triage and
//!   upload validation.
//! - [`email_draft`]: approval guard for queued outbound mail.
//! - [`money`]: integer cent amounts and their euro JSON form.

pub mod board;
pub mod booking;
pub mod credit;
pub mod due_status;
pub mod email_draft;
pub mod error;
pub mod issue;
pub mod media;
pub mod money;
pub mod pagination;
pub mod project_workflow;
pub mod roles;
pub mod task_catalog;
pub mod types;
