//! Route definitions for the public `/bookings` resource.
//!
//! Admin booking management is mounted under `/admin/bookings`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::booking;
use crate::state::AppState;

/// Routes mounted at `/bookings`. All public.
///
/// ```text
/// GET  /         -> occupied
/// POST /         -> create_booking
/// POST /quote    -> quote
/// GET  /pricing  -> pricing
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(booking::occupied).post(booking::create_booking))
        .route("/quote", post(booking::quote))
        .route("/pricing", get(booking::pricing))
}
