//! Handlers for defect reports (`/issues`).
//!
//! Any signed-in user may report an issue, with an optional photo. Admins
//! triage reports: approval turns a report into a project, rejection closes
//! it. Both decisions are final.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use gardenkeep_core::error::CoreError;
use gardenkeep_core::issue::{resolve_category, validate_decision, validate_title};
use gardenkeep_core::media::ISSUE_PHOTO_CATEGORY;
use gardenkeep_core::types::DbId;
use gardenkeep_db::models::issue::{ApproveIssue, CreateIssue, Issue, RejectIssue, ReportIssue};
use gardenkeep_db::models::project::Project;
use gardenkeep_db::repositories::IssueRepo;
use gardenkeep_events::event_types::{ISSUE_DECIDED, ISSUE_REPORTED};
use gardenkeep_events::PlatformEvent;
use serde::Serialize;
use serde_json::json;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::upload::{store_upload, unique_suffix, JsonOrForm};

/// An approved report with the project created from it.
#[derive(Debug, Serialize)]
pub struct ApprovedIssue {
    pub issue: Issue,
    pub project: Project,
}

// ---------------------------------------------------------------------------
// POST /issues
// ---------------------------------------------------------------------------

/// Report a defect. Accepts JSON or a multipart form with `title`,
/// `description`, `category` and an optional `photo` file.
pub async fn report_issue(
    auth: AuthUser,
    State(state): State<AppState>,
    body: JsonOrForm<ReportIssue>,
) -> AppResult<impl IntoResponse> {
    let (input, photo) = match body {
        JsonOrForm::Json(input) => (input, None),
        JsonOrForm::Form(mut form) => {
            let photo = form.file.take();
            let input = ReportIssue {
                title: form.text("title").unwrap_or_default(),
                description: form.text("description"),
                category: form.text("category"),
            };
            (input, photo)
        }
    };
    input.validate()?;
    let title = validate_title(&input.title)?;
    let category = resolve_category(input.category.as_deref())?;

    let photo_url = match photo {
        Some(file) => {
            let stem = format!("issue-{}", unique_suffix());
            let stored =
                store_upload(state.media_store.as_ref(), ISSUE_PHOTO_CATEGORY, &stem, &file)
                    .await?;
            Some(stored.url)
        }
        None => None,
    };

    let issue = IssueRepo::create(
        &state.pool,
        &CreateIssue {
            title,
            description: input.description.filter(|d| !d.trim().is_empty()),
            category: category.to_string(),
            photo_url,
            reported_by: Some(auth.user_id),
            reporter_email: auth.email.clone(),
        },
    )
    .await?;

    tracing::info!(issue_id = issue.id, reporter = %auth.email, category, "Issue reported");

    state.event_bus.publish(
        PlatformEvent::new(ISSUE_REPORTED)
            .with_source("issue", issue.id)
            .with_actor(auth.email.clone())
            .with_payload(json!({
                "title": issue.title,
                "category": issue.category,
                "reporter_email": issue.reporter_email,
            })),
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: issue })))
}

// ---------------------------------------------------------------------------
// GET /issues
// ---------------------------------------------------------------------------

/// Admins see every report; other users see their own.
pub async fn list_issues(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let reported_by = (!auth.is_admin()).then_some(auth.user_id);
    let issues = IssueRepo::list(&state.pool, reported_by).await?;
    Ok(Json(DataResponse { data: issues }))
}

// ---------------------------------------------------------------------------
// GET /issues/{id}
// ---------------------------------------------------------------------------

pub async fn get_issue(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let issue = find_issue(&state, id).await?;
    if !auth.is_admin() && issue.reported_by != Some(auth.user_id) {
        return Err(AppError::Core(CoreError::Forbidden(
            "You can only view your own reports".into(),
        )));
    }
    Ok(Json(DataResponse { data: issue }))
}

// ---------------------------------------------------------------------------
// POST /issues/{id}/approve
// ---------------------------------------------------------------------------

pub async fn approve_issue(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<ApproveIssue>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let issue = find_issue(&state, id).await?;
    validate_decision(issue.status()?)?;

    let (issue, project) = IssueRepo::approve(
        &state.pool,
        id,
        input.priority,
        input.admin_notes.as_deref(),
        &admin.email,
    )
    .await?
    .ok_or_else(already_decided)?;

    tracing::info!(
        issue_id = id,
        project_id = project.id,
        admin = %admin.email,
        "Issue approved",
    );
    publish_decision(&state, &issue, &admin.email);

    Ok(Json(DataResponse {
        data: ApprovedIssue { issue, project },
    }))
}

// ---------------------------------------------------------------------------
// POST /issues/{id}/reject
// ---------------------------------------------------------------------------

pub async fn reject_issue(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<RejectIssue>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let issue = find_issue(&state, id).await?;
    validate_decision(issue.status()?)?;

    let issue = IssueRepo::reject(&state.pool, id, input.admin_notes.as_deref())
        .await?
        .ok_or_else(already_decided)?;

    tracing::info!(issue_id = id, admin = %admin.email, "Issue rejected");
    publish_decision(&state, &issue, &admin.email);

    Ok(Json(DataResponse { data: issue }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_issue(state: &AppState, id: DbId) -> AppResult<Issue> {
    IssueRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Issue", id }))
}

fn already_decided() -> AppError {
    AppError::Core(CoreError::Conflict("Issue has already been decided".into()))
}

fn publish_decision(state: &AppState, issue: &Issue, admin_email: &str) {
    state.event_bus.publish(
        PlatformEvent::new(ISSUE_DECIDED)
            .with_source("issue", issue.id)
            .with_actor(admin_email)
            .with_payload(json!({
                "title": issue.title,
                "status": issue.status,
                "reporter_email": issue.reporter_email,
                "project_id": issue.converted_to_project_id,
            })),
    );
}
