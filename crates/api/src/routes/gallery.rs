//! Route definitions for the `/gallery` resource.

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use axum::Router;
use gardenkeep_core::media::MAX_UPLOAD_BYTES;

use crate::handlers::gallery;
use crate::state::AppState;

/// Routes mounted at `/gallery`.
///
/// ```text
/// GET    /         -> list_media
/// POST   /upload   -> upload_media (requires auth, multipart)
/// DELETE /{id}     -> delete_media (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(gallery::list_media))
        .route(
            "/upload",
            post(gallery::upload_media).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/{id}", delete(gallery::delete_media))
}
