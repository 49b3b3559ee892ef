//! Booking entity model and DTOs.

use chrono::NaiveDate;
use gardenkeep_core::booking::BookingStatus;
use gardenkeep_core::error::CoreError;
use gardenkeep_core::money::{self, Cents};
use gardenkeep_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `bookings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Booking {
    pub id: DbId,
    pub guest_name: String,
    pub guest_email: String,
    pub guest_phone: Option<String>,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: i32,
    pub has_pets: bool,
    #[serde(with = "money::euros")]
    pub total_price: Cents,
    pub discount_code: Option<String>,
    pub notes: Option<String>,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Booking {
    pub fn status(&self) -> Result<BookingStatus, CoreError> {
        self.status.parse()
    }
}

/// Public booking request. Client-side totals are ignored.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: Option<i32>,
    #[serde(default)]
    pub pets: bool,
    pub discount_code: Option<String>,
    #[validate(length(max = 5000))]
    pub notes: Option<String>,
}

/// Price quote request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub discount_code: Option<String>,
}

/// DTO for inserting a booking with its server-computed price.
#[derive(Debug, Clone)]
pub struct CreateBooking {
    pub guest_name: String,
    pub guest_email: String,
    pub guest_phone: Option<String>,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: i32,
    pub has_pets: bool,
    pub total_price: Cents,
    pub discount_code: Option<String>,
    pub notes: Option<String>,
}

/// An occupied date range, as shown on the public calendar.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookedRange {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

/// Admin status change.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateBookingStatus {
    pub status: BookingStatus,
}
