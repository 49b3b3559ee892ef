//! Route definitions for the `/admin` resource.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::{admin, booking};
use crate::state::AppState;

/// Routes mounted at `/admin`. All require the `admin` role.
///
/// ```text
/// GET    /users                  -> list_users
/// PATCH  /users/{id}             -> update_user
/// DELETE /users/{id}             -> deactivate_user
/// GET    /stats                  -> stats
/// GET    /pending-confirmations  -> pending_confirmations
/// GET    /bookings               -> list_bookings
/// PATCH  /bookings/{id}          -> update_booking_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(admin::list_users))
        .route(
            "/users/{id}",
            patch(admin::update_user).delete(admin::deactivate_user),
        )
        .route("/stats", get(admin::stats))
        .route("/pending-confirmations", get(admin::pending_confirmations))
        .route("/bookings", get(booking::list_bookings))
        .route("/bookings/{id}", patch(booking::update_booking_status))
}
