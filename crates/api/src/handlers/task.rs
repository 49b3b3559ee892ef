//! Handlers for the unified task board (`/tasks`).
//!
//! Chores and projects are loaded, normalized into [`Task`]s and run through
//! the board engine: filter, then sort, then optionally group into columns.

use std::str::FromStr;

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use gardenkeep_core::board::{
    self, drop_on_column, filter_options, group_into_columns, BoardColumns, BoardFilter,
    DropOutcome, FilterOptions, SortField, SortOrder,
};
use gardenkeep_core::error::CoreError;
use gardenkeep_core::project_workflow::ProjectStatus;
use gardenkeep_core::task_catalog::{normalize, RecurringCard, Task, TaskType};
use gardenkeep_core::types::DbId;
use gardenkeep_db::models::project::Project;
use gardenkeep_db::repositories::{ProjectRepo, RecurringTaskRepo};
use serde::{Deserialize, Serialize};

use super::project::{apply_move, find_project};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::split_csv;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters shared by `GET /tasks/unified` and `GET /tasks/board`.
///
/// Multi-select dimensions are comma-separated (`?categories=rasen,haus`).
#[derive(Debug, Default, Deserialize)]
pub struct BoardParams {
    pub categories: Option<String>,
    pub efforts: Option<String>,
    pub types: Option<String>,
    pub statuses: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

impl BoardParams {
    fn criteria(&self) -> AppResult<BoardFilter> {
        let types = split_csv(self.types.as_deref())
            .iter()
            .map(|t| TaskType::from_str(t))
            .collect::<Result<Vec<_>, CoreError>>()?;
        Ok(BoardFilter {
            categories: split_csv(self.categories.as_deref()),
            efforts: split_csv(self.efforts.as_deref()),
            types,
            statuses: split_csv(self.statuses.as_deref()),
        })
    }

    fn sort_key(&self) -> AppResult<(SortField, SortOrder)> {
        let field = match self.sort.as_deref() {
            Some(s) => SortField::from_str(s)?,
            None => SortField::default(),
        };
        let order = match self.order.as_deref() {
            Some(o) => SortOrder::from_str(o)?,
            None => SortOrder::default(),
        };
        Ok((field, order))
    }

    /// Filter then sort.
    fn apply(&self, tasks: Vec<Task>) -> AppResult<Vec<Task>> {
        let criteria = self.criteria()?;
        let (field, order) = self.sort_key()?;
        Ok(board::sort(board::filter(tasks, &criteria), field, order))
    }
}

#[derive(Debug, Serialize)]
pub struct UnifiedTasks {
    pub tasks: Vec<Task>,
    /// Distinct values over all tasks, before filtering.
    pub filters: FilterOptions,
}

/// Request body for `POST /tasks/drop`.
#[derive(Debug, Deserialize)]
pub struct DropRequest {
    pub task_type: TaskType,
    pub task_id: DbId,
    pub column: ProjectStatus,
}

#[derive(Debug, Serialize)]
pub struct DropResponse {
    #[serde(flatten)]
    pub outcome: DropOutcome,
    /// The project after a move; `None` when nothing changed.
    pub project: Option<Project>,
}

// ---------------------------------------------------------------------------
// GET /tasks/unified
// ---------------------------------------------------------------------------

pub async fn unified(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<BoardParams>,
) -> AppResult<impl IntoResponse> {
    let tasks = load_tasks(&state).await?;
    let filters = filter_options(&tasks);
    let tasks = params.apply(tasks)?;

    Ok(Json(DataResponse {
        data: UnifiedTasks { tasks, filters },
    }))
}

// ---------------------------------------------------------------------------
// GET /tasks/board
// ---------------------------------------------------------------------------

pub async fn columns(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<BoardParams>,
) -> AppResult<impl IntoResponse> {
    let tasks = params.apply(load_tasks(&state).await?)?;
    let columns: BoardColumns = group_into_columns(tasks);
    Ok(Json(DataResponse { data: columns }))
}

// ---------------------------------------------------------------------------
// POST /tasks/drop
// ---------------------------------------------------------------------------

/// Apply a drag-and-drop. Chores are ignored; dropping a project on `done`
/// answers that the completion action is required.
pub async fn drop_task(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<DropRequest>,
) -> AppResult<impl IntoResponse> {
    let (task, project) = match input.task_type {
        TaskType::Recurring => {
            let chore = RecurringTaskRepo::find_by_id(&state.pool, input.task_id)
                .await?
                .ok_or(AppError::Core(CoreError::NotFound {
                    entity: "RecurringTask",
                    id: input.task_id,
                }))?;
            let card = RecurringCard::from_source(chore.to_source()?, Utc::now());
            (Task::Recurring(card), None)
        }
        TaskType::Project => {
            let project = find_project(&state, input.task_id).await?;
            (Task::Project(project.to_card()?), Some(project))
        }
    };

    let outcome = drop_on_column(&task, input.column)?;
    let moved = match (&outcome, &project) {
        (DropOutcome::Move { to, .. }, Some(project)) => {
            Some(apply_move(&state, &auth, project, *to).await?)
        }
        _ => None,
    };

    Ok(Json(DataResponse {
        data: DropResponse {
            outcome,
            project: moved,
        },
    }))
}

async fn load_tasks(state: &AppState) -> AppResult<Vec<Task>> {
    let chores = RecurringTaskRepo::list(&state.pool, None, false).await?;
    let projects = ProjectRepo::list(&state.pool, None).await?;

    let sources = chores
        .iter()
        .map(|c| c.to_source())
        .collect::<Result<Vec<_>, CoreError>>()?;
    let cards = projects
        .iter()
        .map(Project::to_card)
        .collect::<Result<Vec<_>, CoreError>>()?;

    Ok(normalize(sources, cards, Utc::now()))
}
