//! Handlers for the `/credits` ledger.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use gardenkeep_core::credit::validate_manual_entry;
use gardenkeep_core::error::CoreError;
use gardenkeep_db::models::credit::{CreateCreditEntry, CreditSummary, ManualCreditRequest};
use gardenkeep_db::repositories::credit_repo::RECENT_ENTRIES;
use gardenkeep_db::repositories::CreditRepo;
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreditParams {
    /// Defaults to the caller's own email.
    pub email: Option<String>,
}

// ---------------------------------------------------------------------------
// GET /credits
// ---------------------------------------------------------------------------

/// Recent entries and balance of one owner. Users may only read their own.
pub async fn get_credits(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<CreditParams>,
) -> AppResult<impl IntoResponse> {
    let email = params
        .email
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| auth.email.clone());

    if email != auth.email && !auth.is_admin() {
        return Err(AppError::Core(CoreError::Forbidden(
            "You can only view your own credits".into(),
        )));
    }

    let credits = CreditRepo::recent_for_owner(&state.pool, &email, RECENT_ENTRIES).await?;
    let total = CreditRepo::balance(&state.pool, &email).await?;

    Ok(Json(DataResponse {
        data: CreditSummary {
            email,
            credits,
            total,
        },
    }))
}

// ---------------------------------------------------------------------------
// POST /credits
// ---------------------------------------------------------------------------

/// Book a manual entry, e.g. credit used against a stay.
pub async fn create_credit(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<ManualCreditRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    validate_manual_entry(input.amount, &input.reason, input.kind)?;

    let entry = CreditRepo::append(
        &state.pool,
        &CreateCreditEntry {
            owner_email: input.email.trim().to_lowercase(),
            amount: input.amount,
            reason: input.reason.trim().to_string(),
            kind: input.kind,
        },
    )
    .await?;

    tracing::info!(
        credit_entry_id = entry.id,
        owner = %entry.owner_email,
        amount_cents = entry.amount,
        kind = %entry.kind,
        admin = %admin.email,
        "Manual credit entry booked",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: entry })))
}
