//! Row models and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - `Deserialize` request DTOs, validated with `validator` where they come
//!   straight from a client
//! - Insert DTOs consumed by the repositories

pub mod booking;
pub mod credit;
pub mod dashboard;
pub mod email_draft;
pub mod issue;
pub mod media;
pub mod project;
pub mod recurring_task;
pub mod session;
pub mod user;
