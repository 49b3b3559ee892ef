//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Multi-statement writes run in a
//! transaction and use conditional updates for their state guards.

pub mod booking_repo;
pub mod credit_repo;
pub mod dashboard_repo;
pub mod email_draft_repo;
pub mod issue_repo;
pub mod media_repo;
pub mod project_repo;
pub mod recurring_task_repo;
pub mod session_repo;
pub mod user_repo;

pub use booking_repo::BookingRepo;
pub use credit_repo::CreditRepo;
pub use dashboard_repo::DashboardRepo;
pub use email_draft_repo::EmailDraftRepo;
pub use issue_repo::IssueRepo;
pub use media_repo::MediaRepo;
pub use project_repo::ProjectRepo;
pub use recurring_task_repo::RecurringTaskRepo;
pub use session_repo::SessionRepo;
pub use user_repo::{AdminChange, UserRepo};
