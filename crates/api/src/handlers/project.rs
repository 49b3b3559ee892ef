//! Handlers for the `/projects` resource and its completion workflow.
//!
//! Status moves between `open`, `next` and `in_progress` are free reorders
//! for admins and the assignee. `done` is only reached through
//! `POST /projects/{id}/complete`, and credit is only booked by an admin
//! through `POST /projects/{id}/confirm`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use gardenkeep_core::error::CoreError;
use gardenkeep_core::money;
use gardenkeep_core::project_workflow::{
    validate_completion, validate_confirmation, validate_reorder, ProjectStatus, WorkflowError,
};
use gardenkeep_core::types::DbId;
use gardenkeep_db::models::project::{
    CompleteProject, ConfirmProject, CreateProject, Project, UpdateProject,
};
use gardenkeep_db::repositories::ProjectRepo;
use gardenkeep_events::event_types::{PROJECT_COMPLETED, PROJECT_CONFIRMED};
use gardenkeep_events::PlatformEvent;
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use super::completion_from_form;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::upload::JsonOrForm;

/// Query parameters for `GET /projects`.
#[derive(Debug, Deserialize)]
pub struct ProjectListParams {
    pub status: Option<ProjectStatus>,
}

// ---------------------------------------------------------------------------
// GET /projects
// ---------------------------------------------------------------------------

pub async fn list_projects(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ProjectListParams>,
) -> AppResult<impl IntoResponse> {
    let projects = ProjectRepo::list(&state.pool, params.status).await?;
    Ok(Json(DataResponse { data: projects }))
}

// ---------------------------------------------------------------------------
// POST /projects
// ---------------------------------------------------------------------------

/// Create a project in `open`. Priority defaults to `medium`.
pub async fn create_project(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(mut input): Json<CreateProject>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    input.created_by = Some(auth.email.clone());

    let project = ProjectRepo::create(&state.pool, &input).await?;
    tracing::info!(project_id = project.id, created_by = %auth.email, "Project created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: project })))
}

// ---------------------------------------------------------------------------
// GET /projects/{id}
// ---------------------------------------------------------------------------

pub async fn get_project(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let project = find_project(&state, id).await?;
    Ok(Json(DataResponse { data: project }))
}

// ---------------------------------------------------------------------------
// PATCH /projects/{id}
// ---------------------------------------------------------------------------

/// Edit fields and/or reorder the status.
///
/// Field edits are allowed for admins and the project's creator. A status
/// change follows the reorder rules; a move to `done` is refused.
pub async fn update_project(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProject>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let mut project = find_project(&state, id).await?;

    let has_field_changes = input.has_field_changes();
    if has_field_changes && !may_edit(&auth, &project) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only an admin or the creator may edit this project".into(),
        )));
    }

    if let Some(target) = input.status {
        if target != project.status()? {
            project = apply_move(&state, &auth, &project, target).await?;
        }
    }

    if has_field_changes {
        project = ProjectRepo::update_fields(&state.pool, id, &input)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Project",
                id,
            }))?;
    }

    Ok(Json(DataResponse { data: project }))
}

// ---------------------------------------------------------------------------
// POST /projects/{id}/complete
// ---------------------------------------------------------------------------

/// `in_progress -> done(unconfirmed)`.
///
/// Accepts JSON `{notes, photo_url}` or a multipart form with `notes` and a
/// `photo` file.
pub async fn complete_project(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    body: JsonOrForm<CompleteProject>,
) -> AppResult<impl IntoResponse> {
    let project = find_project(&state, id).await?;
    let current = project.workflow_state()?;
    // Checked before any photo is stored.
    validate_completion(current, None)?;

    let input = match body {
        JsonOrForm::Json(input) => input,
        JsonOrForm::Form(form) => {
            let (notes, photo_url) =
                completion_from_form(&state, form, &format!("project-{id}")).await?;
            CompleteProject { notes, photo_url }
        }
    };
    let notes = input.notes.as_deref().map(str::trim).filter(|n| !n.is_empty());
    validate_completion(current, notes)?;

    let project = ProjectRepo::complete(
        &state.pool,
        id,
        &auth.email,
        notes,
        input.photo_url.as_deref(),
    )
    .await?
    .ok_or_else(|| {
        AppError::Core(CoreError::Conflict(
            "Project is no longer in progress".into(),
        ))
    })?;

    tracing::info!(project_id = id, completed_by = %auth.email, "Project completed");

    state.event_bus.publish(
        PlatformEvent::new(PROJECT_COMPLETED)
            .with_source("project", id)
            .with_actor(auth.email.clone())
            .with_payload(json!({
                "title": project.title,
                "completed_by": auth.email,
            })),
    );

    Ok(Json(DataResponse { data: project }))
}

// ---------------------------------------------------------------------------
// POST /projects/{id}/confirm
// ---------------------------------------------------------------------------

/// `done(unconfirmed) -> done(confirmed)`, crediting the completer.
///
/// Confirming an already confirmed project is a conflict and books nothing.
pub async fn confirm_project(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ConfirmProject>,
) -> AppResult<impl IntoResponse> {
    let project = find_project(&state, id).await?;
    validate_confirmation(project.workflow_state()?, &auth.role, input.credit_amount)?;

    let confirmed = ProjectRepo::confirm(&state.pool, id, &auth.email, input.credit_amount)
        .await?
        .ok_or_else(|| AppError::from(WorkflowError::AlreadyProcessed))?;

    tracing::info!(
        project_id = id,
        confirmed_by = %auth.email,
        credit_cents = input.credit_amount,
        owner = %confirmed.credit.owner_email,
        "Project confirmed",
    );

    state.event_bus.publish(
        PlatformEvent::new(PROJECT_CONFIRMED)
            .with_source("project", id)
            .with_actor(auth.email.clone())
            .with_payload(json!({
                "title": confirmed.project.title,
                "completed_by": confirmed.credit.owner_email,
                "credit_amount": money::to_euros(input.credit_amount),
            })),
    );

    Ok(Json(DataResponse { data: confirmed }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub(crate) async fn find_project(state: &AppState, id: DbId) -> AppResult<Project> {
    ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))
}

/// Apply a guarded reorder. A concurrent move of the same project makes the
/// conditional update miss, which is reported as a conflict.
pub(crate) async fn apply_move(
    state: &AppState,
    auth: &AuthUser,
    project: &Project,
    target: ProjectStatus,
) -> AppResult<Project> {
    let from = project.status()?;
    validate_reorder(
        project.workflow_state()?,
        target,
        &auth.email,
        &auth.role,
        project.assigned_to.as_deref(),
    )?;

    let moved = ProjectRepo::move_status(&state.pool, project.id, from, target)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "Project was changed concurrently, reload and retry".into(),
            ))
        })?;

    tracing::info!(
        project_id = project.id,
        from = from.as_str(),
        to = target.as_str(),
        actor = %auth.email,
        "Project moved",
    );
    Ok(moved)
}

fn may_edit(auth: &AuthUser, project: &Project) -> bool {
    auth.is_admin()
        || project
            .created_by
            .as_deref()
            .is_some_and(|creator| creator.eq_ignore_ascii_case(&auth.email))
}
