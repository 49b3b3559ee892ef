//! Handlers for the outbound mail approval queue (`/email-drafts`).
//!
//! Any signed-in user (in practice the assistant integration's account) may
//! queue a draft. Nothing leaves the system until an admin approves it;
//! approval claims the draft with a conditional `pending -> sent` update
//! before sending, so a draft is delivered at most once.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use gardenkeep_core::email_draft::{final_body, validate_decision, DraftStatus};
use gardenkeep_core::error::CoreError;
use gardenkeep_core::types::DbId;
use gardenkeep_db::models::email_draft::{
    ApproveEmailDraft, CreateEmailDraft, CreateEmailDraftRequest, EmailDraft, EmailDraftListParams,
};
use gardenkeep_db::repositories::EmailDraftRepo;
use gardenkeep_events::event_types::{EMAIL_DRAFT_DECIDED, EMAIL_DRAFT_QUEUED};
use gardenkeep_events::PlatformEvent;
use serde_json::json;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET /email-drafts
// ---------------------------------------------------------------------------

/// List drafts newest first. `?status=` defaults to `pending`; `all` lists
/// every status.
pub async fn list_drafts(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<EmailDraftListParams>,
) -> AppResult<impl IntoResponse> {
    let status = match params.status.as_deref() {
        None => Some(DraftStatus::Pending),
        Some("all") => None,
        Some(s) => Some(s.parse::<DraftStatus>()?),
    };
    let drafts = EmailDraftRepo::list(&state.pool, status).await?;
    Ok(Json(DataResponse { data: drafts }))
}

// ---------------------------------------------------------------------------
// POST /email-drafts
// ---------------------------------------------------------------------------

pub async fn create_draft(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateEmailDraftRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    if input.subject.trim().is_empty() || input.body.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Subject and body must not be blank".into(),
        )));
    }

    let draft = EmailDraftRepo::create(
        &state.pool,
        &CreateEmailDraft {
            to_email: input.to_email.trim().to_string(),
            to_name: input.to_name.filter(|n| !n.trim().is_empty()),
            subject: input.subject.trim().to_string(),
            body: input.body,
            task_id: input.task_id,
            task_title: input.task_title,
            created_by: auth.email.clone(),
        },
    )
    .await?;

    tracing::info!(draft_id = draft.id, to = %draft.to_email, by = %auth.email, "Email draft queued");

    state.event_bus.publish(
        PlatformEvent::new(EMAIL_DRAFT_QUEUED)
            .with_source("email_draft", draft.id)
            .with_actor(auth.email.clone())
            .with_payload(json!({
                "to_email": draft.to_email,
                "subject": draft.subject,
            })),
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: draft })))
}

// ---------------------------------------------------------------------------
// POST /email-drafts/{id}/approve
// ---------------------------------------------------------------------------

/// Send a pending draft, optionally with an edited body.
///
/// If delivery fails the claim is released and the draft stays pending.
pub async fn approve_draft(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<ApproveEmailDraft>,
) -> AppResult<impl IntoResponse> {
    let draft = find_draft(&state, id).await?;
    validate_decision(draft.status()?)?;
    let body = final_body(&draft.body, input.body.as_deref())?.to_string();

    let Some(mailer) = state.mailer.as_ref() else {
        return Err(AppError::ServiceUnavailable(
            "Email delivery is not configured".into(),
        ));
    };

    let claimed = EmailDraftRepo::mark_sent(&state.pool, id, &body, &admin.email)
        .await?
        .ok_or_else(already_decided)?;

    if let Err(e) = mailer.send(&claimed.to_email, &claimed.subject, &body).await {
        EmailDraftRepo::release(&state.pool, id).await?;
        return Err(AppError::Upstream(format!("Sending email draft {id} failed: {e}")));
    }

    tracing::info!(draft_id = id, to = %claimed.to_email, admin = %admin.email, "Email draft sent");
    publish_decision(&state, &claimed, &admin.email);

    Ok(Json(DataResponse { data: claimed }))
}

// ---------------------------------------------------------------------------
// POST /email-drafts/{id}/reject
// ---------------------------------------------------------------------------

pub async fn reject_draft(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let draft = find_draft(&state, id).await?;
    validate_decision(draft.status()?)?;

    let draft = EmailDraftRepo::reject(&state.pool, id, &admin.email)
        .await?
        .ok_or_else(already_decided)?;

    tracing::info!(draft_id = id, admin = %admin.email, "Email draft rejected");
    publish_decision(&state, &draft, &admin.email);

    Ok(Json(DataResponse { data: draft }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_draft(state: &AppState, id: DbId) -> AppResult<EmailDraft> {
    EmailDraftRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "EmailDraft", id }))
}

fn already_decided() -> AppError {
    AppError::Core(CoreError::Conflict("Email draft has already been decided".into()))
}

fn publish_decision(state: &AppState, draft: &EmailDraft, admin_email: &str) {
    state.event_bus.publish(
        PlatformEvent::new(EMAIL_DRAFT_DECIDED)
            .with_source("email_draft", draft.id)
            .with_actor(admin_email)
            .with_payload(json!({
                "to_email": draft.to_email,
                "subject": draft.subject,
                "status": draft.status,
            })),
    );
}
