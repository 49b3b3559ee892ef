//! Route definitions for the `/projects` resource.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use gardenkeep_core::media::MAX_UPLOAD_BYTES;

use crate::handlers::project;
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET   /               -> list_projects
/// POST  /               -> create_project
/// GET   /{id}           -> get_project
/// PATCH /{id}           -> update_project (fields + reorder)
/// POST  /{id}/complete  -> complete_project (JSON or multipart)
/// POST  /{id}/confirm   -> confirm_project (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(project::list_projects).post(project::create_project))
        .route(
            "/{id}",
            get(project::get_project).patch(project::update_project),
        )
        .route(
            "/{id}/complete",
            post(project::complete_project).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/{id}/confirm", post(project::confirm_project))
}
