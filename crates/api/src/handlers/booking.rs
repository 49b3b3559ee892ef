//! Handlers for holiday-let bookings.
//!
//! Requesting, quoting and the occupancy calendar are public. Listing and
//! deciding bookings lives under `/admin/bookings`. Prices are always
//! recomputed on the server from the configured price list.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::NaiveDate;
use gardenkeep_core::booking::{
    price_breakdown, validate_guests, validate_status_transition, BookingStatus, PriceBreakdown,
    DEFAULT_GUESTS,
};
use gardenkeep_core::error::CoreError;
use gardenkeep_core::money;
use gardenkeep_core::pagination::{clamp_limit, clamp_offset};
use gardenkeep_core::types::DbId;
use gardenkeep_db::models::booking::{
    Booking, BookingRequest, CreateBooking, QuoteRequest, UpdateBookingStatus,
};
use gardenkeep_db::repositories::BookingRepo;
use gardenkeep_events::event_types::{BOOKING_REQUESTED, BOOKING_STATUS_CHANGED};
use gardenkeep_events::PlatformEvent;
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /bookings` (calendar window).
#[derive(Debug, Deserialize)]
pub struct OccupancyParams {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

/// Query parameters for `GET /admin/bookings`.
#[derive(Debug, Deserialize)]
pub struct BookingListParams {
    pub status: Option<BookingStatus>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// A stored booking request with the price it was stored at.
#[derive(Debug, Serialize)]
pub struct BookingCreated {
    pub booking: Booking,
    pub price: PriceBreakdown,
}

// ---------------------------------------------------------------------------
// POST /bookings
// ---------------------------------------------------------------------------

/// Request a stay. Overlapping a pending or confirmed booking is a conflict.
pub async fn create_booking(
    State(state): State<AppState>,
    Json(input): Json<BookingRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let guests = input.guests.unwrap_or(DEFAULT_GUESTS);
    validate_guests(guests)?;

    let discount_code = input
        .discount_code
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());
    let price = price_breakdown(
        input.check_in,
        input.check_out,
        &state.config.pricing.pricing(),
        discount_code,
    )?;

    let create = CreateBooking {
        guest_name: input.name.trim().to_string(),
        guest_email: input.email.trim().to_lowercase(),
        guest_phone: input.phone.clone().filter(|p| !p.trim().is_empty()),
        check_in: input.check_in,
        check_out: input.check_out,
        guests,
        has_pets: input.pets,
        total_price: price.total,
        discount_code: discount_code.map(str::to_string),
        notes: input.notes.clone().filter(|n| !n.trim().is_empty()),
    };

    let booking = BookingRepo::create_if_available(&state.pool, &create)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "The requested dates are no longer available".into(),
            ))
        })?;

    tracing::info!(
        booking_id = booking.id,
        check_in = %booking.check_in,
        check_out = %booking.check_out,
        total_cents = booking.total_price,
        "Booking requested",
    );

    state.event_bus.publish(
        PlatformEvent::new(BOOKING_REQUESTED)
            .with_source("booking", booking.id)
            .with_actor(booking.guest_email.clone())
            .with_payload(json!({
                "guest_name": booking.guest_name,
                "guest_email": booking.guest_email,
                "check_in": booking.check_in.to_string(),
                "check_out": booking.check_out.to_string(),
                "total": money::to_euros(booking.total_price),
            })),
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: BookingCreated { booking, price },
        }),
    ))
}

// ---------------------------------------------------------------------------
// GET /bookings
// ---------------------------------------------------------------------------

/// Occupied date ranges for the public calendar. Guest details are not exposed.
pub async fn occupied(
    State(state): State<AppState>,
    Query(params): Query<OccupancyParams>,
) -> AppResult<impl IntoResponse> {
    let ranges = BookingRepo::occupied_ranges(&state.pool, params.start, params.end).await?;
    Ok(Json(DataResponse { data: ranges }))
}

// ---------------------------------------------------------------------------
// POST /bookings/quote
// ---------------------------------------------------------------------------

pub async fn quote(
    State(state): State<AppState>,
    Json(input): Json<QuoteRequest>,
) -> AppResult<impl IntoResponse> {
    let price = price_breakdown(
        input.check_in,
        input.check_out,
        &state.config.pricing.pricing(),
        input.discount_code.as_deref(),
    )?;
    Ok(Json(DataResponse { data: price }))
}

// ---------------------------------------------------------------------------
// GET /bookings/pricing
// ---------------------------------------------------------------------------

/// The public price list. The family code itself is never returned.
pub async fn pricing(State(state): State<AppState>) -> impl IntoResponse {
    Json(DataResponse {
        data: state.config.pricing.pricing(),
    })
}

// ---------------------------------------------------------------------------
// GET /admin/bookings
// ---------------------------------------------------------------------------

pub async fn list_bookings(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<BookingListParams>,
) -> AppResult<impl IntoResponse> {
    let limit = clamp_limit(params.limit, 100, 500);
    let offset = clamp_offset(params.offset);
    let bookings = BookingRepo::list(&state.pool, params.status, limit, offset).await?;
    Ok(Json(DataResponse { data: bookings }))
}

// ---------------------------------------------------------------------------
// PATCH /admin/bookings/{id}
// ---------------------------------------------------------------------------

/// `pending -> confirmed|cancelled`. The guest is notified.
pub async fn update_booking_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateBookingStatus>,
) -> AppResult<impl IntoResponse> {
    let booking = BookingRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Booking",
            id,
        }))?;
    validate_status_transition(booking.status()?, input.status)?;

    let booking = BookingRepo::decide(&state.pool, id, input.status)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "Booking was already decided".into(),
            ))
        })?;

    tracing::info!(
        booking_id = id,
        status = %booking.status,
        admin = %admin.email,
        "Booking status changed",
    );

    state.event_bus.publish(
        PlatformEvent::new(BOOKING_STATUS_CHANGED)
            .with_source("booking", id)
            .with_actor(admin.email.clone())
            .with_payload(json!({
                "guest_email": booking.guest_email,
                "status": booking.status,
                "check_in": booking.check_in.to_string(),
                "check_out": booking.check_out.to_string(),
            })),
    );

    Ok(Json(DataResponse { data: booking }))
}
