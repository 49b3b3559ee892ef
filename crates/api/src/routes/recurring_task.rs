//! Route definitions for the `/recurring-tasks` resource.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use axum::Router;
use gardenkeep_core::media::MAX_UPLOAD_BYTES;

use crate::handlers::recurring_task;
use crate::state::AppState;

/// Routes mounted at `/recurring-tasks`.
///
/// ```text
/// GET    /                -> list_recurring_tasks
/// POST   /                -> create_recurring_task (admin)
/// PUT    /{id}            -> update_recurring_task (admin)
/// DELETE /{id}            -> deactivate_recurring_task (admin)
/// POST   /{id}/complete   -> complete_recurring_task (JSON or multipart)
/// GET    /{id}/history    -> history
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(recurring_task::list_recurring_tasks).post(recurring_task::create_recurring_task),
        )
        .route(
            "/{id}",
            put(recurring_task::update_recurring_task)
                .delete(recurring_task::deactivate_recurring_task),
        )
        .route(
            "/{id}/complete",
            post(recurring_task::complete_recurring_task)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/{id}/history", get(recurring_task::history))
}
