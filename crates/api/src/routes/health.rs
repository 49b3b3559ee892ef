//! Liveness check.
//!
//! Database reachability is verified once at startup (`main.rs`), so this
//! endpoint never touches the pool and answers even while the database is
//! briefly unavailable.

use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Liveness {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

async fn liveness() -> Json<Liveness> {
    Json(Liveness {
        status: "ok",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Routes:
///
/// ```text
/// GET /health -> liveness (public)
/// ```
///
/// Mounted at the root, outside `/api/v1`.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(liveness))
}
