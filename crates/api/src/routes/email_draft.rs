//! Route definitions for the `/email-drafts` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::email_draft;
use crate::state::AppState;

/// Routes mounted at `/email-drafts`.
///
/// ```text
/// GET  /              -> list_drafts (admin)
/// POST /              -> create_draft
/// POST /{id}/approve  -> approve_draft (admin, sends the mail)
/// POST /{id}/reject   -> reject_draft (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(email_draft::list_drafts).post(email_draft::create_draft))
        .route("/{id}/approve", post(email_draft::approve_draft))
        .route("/{id}/reject", post(email_draft::reject_draft))
}
