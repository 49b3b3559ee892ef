//! Admin dashboard aggregates.

use sqlx::PgPool;

use crate::models::dashboard::AdminStats;
use crate::repositories::{BookingRepo, CreditRepo, ProjectRepo};

pub struct DashboardRepo;

impl DashboardRepo {
    pub async fn stats(pool: &PgPool) -> Result<AdminStats, sqlx::Error> {
        let (unconfirmed_completions,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM projects WHERE status = 'done' AND confirmed_at IS NULL",
        )
        .fetch_one(pool)
        .await?;

        Ok(AdminStats {
            pending_bookings: BookingRepo::count_pending(pool).await?,
            unconfirmed_completions,
            total_credits_awarded: CreditRepo::total_awarded(pool).await?,
            projects_by_status: ProjectRepo::count_by_status(pool).await?,
        })
    }
}
