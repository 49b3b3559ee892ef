//! Aggregates for the admin dashboard.

use gardenkeep_core::money::{self, Cents};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminStats {
    pub pending_bookings: i64,
    pub unconfirmed_completions: i64,
    #[serde(with = "money::euros")]
    pub total_credits_awarded: Cents,
    pub projects_by_status: Vec<StatusCount>,
}
