//! Route definitions for the `/credits` ledger.

use axum::routing::get;
use axum::Router;

use crate::handlers::credit;
use crate::state::AppState;

/// Routes mounted at `/credits`.
///
/// ```text
/// GET  /  -> get_credits (own, or any for admins)
/// POST /  -> create_credit (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(credit::get_credits).post(credit::create_credit))
}
