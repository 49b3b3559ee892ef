//! Periodic removal of dead refresh-token sessions.
//!
//! Expired sessions and sessions revoked by logout, refresh or deactivation
//! are kept for a grace period so recent activity stays inspectable, then
//! deleted.

use std::time::Duration;

use chrono::Utc;
use gardenkeep_db::repositories::SessionRepo;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

/// How long dead sessions are kept before deletion.
const RETENTION_DAYS: i64 = 7;

/// How often the cleanup job runs.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(6 * 3600);

/// Run the session cleanup loop until `cancel` is triggered.
pub async fn run(pool: PgPool, cancel: CancellationToken) {
    tracing::info!(
        retention_days = RETENTION_DAYS,
        interval_secs = CLEANUP_INTERVAL.as_secs(),
        "Session cleanup job started"
    );

    let mut interval = tokio::time::interval(CLEANUP_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Session cleanup job stopping");
                break;
            }
            _ = interval.tick() => {
                let cutoff = Utc::now() - chrono::Duration::days(RETENTION_DAYS);
                match SessionRepo::purge_stale(&pool, cutoff).await {
                    Ok(0) => tracing::debug!("Session cleanup: nothing to purge"),
                    Ok(deleted) => tracing::info!(deleted, "Session cleanup: purged stale sessions"),
                    Err(e) => tracing::error!(error = %e, "Session cleanup failed"),
                }
            }
        }
    }
}
