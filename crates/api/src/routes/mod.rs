pub mod admin;
pub mod auth;
pub mod booking;
pub mod credit;
pub mod email_draft;
pub mod gallery;
pub mod health;
pub mod issue;
pub mod project;
pub mod recurring_task;
pub mod task;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                     register (public)
/// /auth/login                        login (public)
/// /auth/refresh                      refresh (public)
/// /auth/logout                       logout (requires auth)
/// /auth/me                           current identity (requires auth)
///
/// /admin/users                       list (admin only)
/// /admin/users/{id}                  update, deactivate
/// /admin/stats                       dashboard counters
/// /admin/pending-confirmations       projects awaiting confirmation
/// /admin/bookings                    list
/// /admin/bookings/{id}               confirm or cancel
///
/// /recurring-tasks                   list, create (admin)
/// /recurring-tasks/{id}              update, deactivate (admin)
/// /recurring-tasks/{id}/complete     record a completion
/// /recurring-tasks/{id}/history      completion log
///
/// /projects                          list, create
/// /projects/{id}                     get, update/reorder
/// /projects/{id}/complete            in_progress -> done
/// /projects/{id}/confirm             confirm + credit (admin)
///
/// /tasks/unified                     filtered + sorted tasks
/// /tasks/board                       board columns
/// /tasks/drop                        drag-and-drop
///
/// /credits                           balance, manual entry (admin)
///
/// /bookings                          occupancy, request (public)
/// /bookings/quote                    price breakdown (public)
/// /bookings/pricing                  price list (public)
///
/// /issues                            list, report
/// /issues/{id}                       get
/// /issues/{id}/approve               approve into a project (admin)
/// /issues/{id}/reject                reject (admin)
///
/// /email-drafts                      list (admin), queue
/// /email-drafts/{id}/approve         send (admin)
/// /email-drafts/{id}/reject          reject (admin)
///
/// /gallery                           list (public)
/// /gallery/upload                    upload (requires auth)
/// /gallery/{id}                      delete (admin)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/admin", admin::router())
        .nest("/recurring-tasks", recurring_task::router())
        .nest("/projects", project::router())
        .nest("/tasks", task::router())
        .nest("/credits", credit::router())
        .nest("/bookings", booking::router())
        .nest("/issues", issue::router())
        .nest("/email-drafts", email_draft::router())
        .nest("/gallery", gallery::router())
}
