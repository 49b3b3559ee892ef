//! Handlers for the `/admin` resource (user management and dashboard).
//!
//! All handlers require the `admin` role via [`RequireAdmin`].

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use gardenkeep_core::error::CoreError;
use gardenkeep_core::roles::validate_role;
use gardenkeep_core::types::DbId;
use gardenkeep_db::models::user::{UpdateUser, User, UserResponse};
use gardenkeep_db::repositories::{AdminChange, DashboardRepo, ProjectRepo, SessionRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<impl IntoResponse> {
    let users = UserRepo::list(&state.pool).await?;
    let data: Vec<UserResponse> = users.iter().map(UserResponse::from).collect();
    Ok(Json(DataResponse { data }))
}

/// PATCH /api/v1/admin/users/{id}
///
/// Change a user's name, role or active flag.
pub async fn update_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUser>,
) -> AppResult<impl IntoResponse> {
    if let Some(role) = input.role.as_deref() {
        validate_role(role)?;
    }

    let user = match UserRepo::update(&state.pool, id, &input).await? {
        AdminChange::Applied(user) => user,
        AdminChange::NotFound => {
            return Err(AppError::Core(CoreError::NotFound { entity: "User", id }))
        }
        AdminChange::LastAdmin => return Err(last_admin()),
    };

    if !user.is_active {
        SessionRepo::revoke_all_for_user(&state.pool, user.id).await?;
    }

    tracing::info!(
        user_id = user.id,
        role = %user.role,
        is_active = user.is_active,
        admin = %admin.email,
        "User updated",
    );

    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}

/// DELETE /api/v1/admin/users/{id}
///
/// Soft-deactivate a user and revoke their sessions. Returns 204.
pub async fn deactivate_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    find_user(&state, id).await?;

    match UserRepo::deactivate(&state.pool, id).await? {
        AdminChange::Applied(true) => {
            SessionRepo::revoke_all_for_user(&state.pool, id).await?;
            tracing::info!(user_id = id, admin = %admin.email, "User deactivated");
        }
        AdminChange::Applied(false) | AdminChange::NotFound => {}
        AdminChange::LastAdmin => return Err(last_admin()),
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/stats
pub async fn stats(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<impl IntoResponse> {
    let stats = DashboardRepo::stats(&state.pool).await?;
    Ok(Json(DataResponse { data: stats }))
}

/// GET /api/v1/admin/pending-confirmations
///
/// Projects in `done(unconfirmed)`, oldest completion first.
pub async fn pending_confirmations(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<impl IntoResponse> {
    let projects = ProjectRepo::list_pending_confirmations(&state.pool).await?;
    Ok(Json(DataResponse { data: projects }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_user(state: &AppState, id: DbId) -> AppResult<User> {
    UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))
}

fn last_admin() -> AppError {
    AppError::Core(CoreError::Conflict("Cannot remove the last active admin".into()))
}
