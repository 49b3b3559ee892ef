//! Route definitions for the unified task board.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::task;
use crate::state::AppState;

/// Routes mounted at `/tasks`.
///
/// ```text
/// GET  /unified  -> unified (filtered + sorted tasks, filter options)
/// GET  /board    -> columns
/// POST /drop     -> drop_task
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/unified", get(task::unified))
        .route("/board", get(task::columns))
        .route("/drop", post(task::drop_task))
}
