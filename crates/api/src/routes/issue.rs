//! Route definitions for the `/issues` resource.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use gardenkeep_core::media::MAX_UPLOAD_BYTES;

use crate::handlers::issue;
use crate::state::AppState;

/// Routes mounted at `/issues`.
///
/// ```text
/// GET  /              -> list_issues
/// POST /              -> report_issue (JSON or multipart)
/// GET  /{id}          -> get_issue
/// POST /{id}/approve  -> approve_issue (admin)
/// POST /{id}/reject   -> reject_issue (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(issue::list_issues)
                .post(issue::report_issue)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/{id}", get(issue::get_issue))
        .route("/{id}/approve", post(issue::approve_issue))
        .route("/{id}/reject", post(issue::reject_issue))
}
