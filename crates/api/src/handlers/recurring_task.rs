//! Handlers for the `/recurring-tasks` resource.
//!
//! Chores are listed with their derived due-state. Creating, editing and
//! retiring chores is admin-only; any signed-in user may complete one.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use gardenkeep_core::error::CoreError;
use gardenkeep_core::money;
use gardenkeep_core::pagination::{clamp_limit, clamp_offset};
use gardenkeep_core::task_catalog::RecurringCard;
use gardenkeep_core::types::DbId;
use gardenkeep_db::models::recurring_task::{
    CompleteRecurringTask, CreateRecurringTask, RecurringTask, UpdateRecurringTask,
};
use gardenkeep_db::repositories::RecurringTaskRepo;
use gardenkeep_events::event_types::RECURRING_TASK_COMPLETED;
use gardenkeep_events::PlatformEvent;
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use super::completion_from_form;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::upload::JsonOrForm;

/// Query parameters for `GET /recurring-tasks`.
#[derive(Debug, Deserialize)]
pub struct RecurringTaskListParams {
    pub category: Option<String>,
    /// Honored for admins only.
    #[serde(default)]
    pub include_inactive: bool,
}

/// A chore with its derived due-state.
#[derive(Debug, Serialize)]
pub struct RecurringTaskView {
    #[serde(flatten)]
    pub card: RecurringCard,
    pub is_active: bool,
}

impl RecurringTaskView {
    fn from_row(task: &RecurringTask) -> AppResult<Self> {
        Ok(Self {
            card: RecurringCard::from_source(task.to_source()?, Utc::now()),
            is_active: task.is_active,
        })
    }
}

// ---------------------------------------------------------------------------
// GET /recurring-tasks
// ---------------------------------------------------------------------------

pub async fn list_recurring_tasks(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<RecurringTaskListParams>,
) -> AppResult<impl IntoResponse> {
    let include_inactive = params.include_inactive && auth.is_admin();
    let tasks =
        RecurringTaskRepo::list(&state.pool, params.category.as_deref(), include_inactive).await?;

    let data = tasks
        .iter()
        .map(RecurringTaskView::from_row)
        .collect::<AppResult<Vec<_>>>()?;
    Ok(Json(DataResponse { data }))
}

// ---------------------------------------------------------------------------
// POST /recurring-tasks
// ---------------------------------------------------------------------------

pub async fn create_recurring_task(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateRecurringTask>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let task = RecurringTaskRepo::create(&state.pool, &input).await?;

    tracing::info!(
        recurring_task_id = task.id,
        cycle_days = task.cycle_days,
        admin = %admin.email,
        "Recurring task created",
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: RecurringTaskView::from_row(&task)?,
        }),
    ))
}

// ---------------------------------------------------------------------------
// PUT /recurring-tasks/{id}
// ---------------------------------------------------------------------------

pub async fn update_recurring_task(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateRecurringTask>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let task = RecurringTaskRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "RecurringTask",
            id,
        }))?;

    Ok(Json(DataResponse {
        data: RecurringTaskView::from_row(&task)?,
    }))
}

// ---------------------------------------------------------------------------
// DELETE /recurring-tasks/{id}
// ---------------------------------------------------------------------------

/// Soft-deactivate a chore. Its completion history is kept.
pub async fn deactivate_recurring_task(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    find_task(&state, id).await?;
    if RecurringTaskRepo::deactivate(&state.pool, id).await? {
        tracing::info!(recurring_task_id = id, admin = %admin.email, "Recurring task deactivated");
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// POST /recurring-tasks/{id}/complete
// ---------------------------------------------------------------------------

/// Record a completion. Accepts JSON `{notes, photo_url}` or a multipart
/// form with `notes` and a `photo` file.
pub async fn complete_recurring_task(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    body: JsonOrForm<CompleteRecurringTask>,
) -> AppResult<impl IntoResponse> {
    let task = find_task(&state, id).await?;
    if !task.is_active {
        return Err(AppError::Core(CoreError::Conflict(
            "Recurring task is no longer active".into(),
        )));
    }

    let input = match body {
        JsonOrForm::Json(input) => input,
        JsonOrForm::Form(form) => {
            let (notes, photo_url) =
                completion_from_form(&state, form, &format!("recurring-{id}")).await?;
            CompleteRecurringTask { notes, photo_url }
        }
    };
    input.validate()?;

    let completion = RecurringTaskRepo::complete(&state.pool, id, &auth.email, &input)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "Recurring task is no longer active".into(),
            ))
        })?;

    tracing::info!(
        recurring_task_id = id,
        completed_by = %auth.email,
        credit_cents = completion.task.credit_value,
        "Recurring task completed",
    );

    state.event_bus.publish(
        PlatformEvent::new(RECURRING_TASK_COMPLETED)
            .with_source("recurring_task", id)
            .with_actor(auth.email.clone())
            .with_payload(json!({
                "title": completion.task.title,
                "completed_by": auth.email,
                "credit_amount": completion.credit.as_ref().map(|c| money::to_euros(c.amount)),
            })),
    );

    Ok(Json(DataResponse { data: completion }))
}

// ---------------------------------------------------------------------------
// GET /recurring-tasks/{id}/history
// ---------------------------------------------------------------------------

pub async fn history(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    find_task(&state, id).await?;
    let limit = clamp_limit(params.limit, 50, 200);
    let offset = clamp_offset(params.offset);

    let entries = RecurringTaskRepo::history(&state.pool, id, limit, offset).await?;
    Ok(Json(DataResponse { data: entries }))
}

async fn find_task(state: &AppState, id: DbId) -> AppResult<RecurringTask> {
    RecurringTaskRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "RecurringTask",
            id,
        }))
}
