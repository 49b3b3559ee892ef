//! Booking status rules and price calculation.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::money::{self, percent_of, Cents};

/// Minimum stay length (in nights) for the weekly discount.
pub const WEEKLY_DISCOUNT_MIN_NIGHTS: i64 = 7;

/// Guest count assumed when a request omits it.
pub const DEFAULT_GUESTS: i32 = 2;

/// Upper bound on guests per booking.
pub const MAX_GUESTS: i32 = 20;

// ---------------------------------------------------------------------------
// BookingStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    /// Whether a booking in this status blocks its date range.
    pub fn occupies_dates(self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            other => Err(CoreError::Validation(format!(
                "Invalid booking status '{other}'. Must be one of: pending, confirmed, cancelled"
            ))),
        }
    }
}

/// Only `pending -> confirmed` and `pending -> cancelled` are allowed.
pub fn validate_status_transition(from: BookingStatus, to: BookingStatus) -> Result<(), CoreError> {
    match (from, to) {
        (BookingStatus::Pending, BookingStatus::Confirmed | BookingStatus::Cancelled) => Ok(()),
        (BookingStatus::Pending, BookingStatus::Pending) => Err(CoreError::Validation(
            "Target status must be confirmed or cancelled".into(),
        )),
        _ => Err(CoreError::Conflict(format!(
            "Booking is already {from} and cannot change to {to}"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

/// Number of nights between two dates. Rejects stays of zero or fewer nights.
pub fn nights_between(check_in: NaiveDate, check_out: NaiveDate) -> Result<i64, CoreError> {
    let nights = (check_out - check_in).num_days();
    if nights <= 0 {
        return Err(CoreError::Validation(
            "Check-out date must be after check-in date".into(),
        ));
    }
    Ok(nights)
}

/// Half-open interval overlap: a stay ending on the day another starts does
/// not conflict.
pub fn ranges_overlap(a: (NaiveDate, NaiveDate), b: (NaiveDate, NaiveDate)) -> bool {
    a.0 < b.1 && b.0 < a.1
}

pub fn validate_guests(guests: i32) -> Result<(), CoreError> {
    if !(1..=MAX_GUESTS).contains(&guests) {
        return Err(CoreError::Validation(format!(
            "Guest count must be between 1 and {MAX_GUESTS}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Pricing
// ---------------------------------------------------------------------------

/// Price list applied to booking requests.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pricing {
    #[serde(with = "money::euros")]
    pub per_night: Cents,
    pub weekly_discount_percent: i64,
    pub family_discount_percent: i64,
    #[serde(skip)]
    pub family_code: String,
}

impl Pricing {
    /// Case-insensitive match against the family discount code.
    pub fn is_family_code(&self, code: &str) -> bool {
        !self.family_code.is_empty() && code.trim().eq_ignore_ascii_case(&self.family_code)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceBreakdown {
    pub nights: i64,
    #[serde(with = "money::euros")]
    pub base_price: Cents,
    #[serde(with = "money::euros")]
    pub weekly_discount: Cents,
    #[serde(with = "money::euros")]
    pub family_discount: Cents,
    #[serde(with = "money::euros")]
    pub total: Cents,
    /// `None` when no code was given.
    pub discount_code_valid: Option<bool>,
}

/// Compute the price of a stay.
///
/// The weekly discount applies to the base price from seven nights on; the
/// family discount applies to what remains after it. Each discount is
/// rounded to whole cents.
pub fn price_breakdown(
    check_in: NaiveDate,
    check_out: NaiveDate,
    pricing: &Pricing,
    discount_code: Option<&str>,
) -> Result<PriceBreakdown, CoreError> {
    let nights = nights_between(check_in, check_out)?;
    let base_price = nights * pricing.per_night;

    let weekly_discount = if nights >= WEEKLY_DISCOUNT_MIN_NIGHTS {
        percent_of(base_price, pricing.weekly_discount_percent)
    } else {
        0
    };

    let code = discount_code.map(str::trim).filter(|c| !c.is_empty());
    let discount_code_valid = code.map(|c| pricing.is_family_code(c));
    let family_discount = if discount_code_valid == Some(true) {
        percent_of(base_price - weekly_discount, pricing.family_discount_percent)
    } else {
        0
    };

    Ok(PriceBreakdown {
        nights,
        base_price,
        weekly_discount,
        family_discount,
        total: base_price - weekly_discount - family_discount,
        discount_code_valid,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn pricing() -> Pricing {
        Pricing {
            per_night: 5_000,
            weekly_discount_percent: 10,
            family_discount_percent: 50,
            family_code: "FAMILY".into(),
        }
    }

    #[test]
    fn seven_nights_get_weekly_discount() {
        let b = price_breakdown(date(2026, 2, 10), date(2026, 2, 17), &pricing(), None).unwrap();
        assert_eq!(b.nights, 7);
        assert_eq!(b.base_price, 35_000);
        assert_eq!(b.weekly_discount, 3_500);
        assert_eq!(b.family_discount, 0);
        assert_eq!(b.total, 31_500);
        assert_eq!(b.discount_code_valid, None);
    }

    #[test]
    fn short_stay_has_no_weekly_discount() {
        let b = price_breakdown(date(2026, 2, 10), date(2026, 2, 13), &pricing(), None).unwrap();
        assert_eq!(b.nights, 3);
        assert_eq!(b.weekly_discount, 0);
        assert_eq!(b.total, 15_000);
    }

    #[test]
    fn family_discount_applies_after_weekly() {
        let b = price_breakdown(date(2026, 2, 10), date(2026, 2, 17), &pricing(), Some("family"))
            .unwrap();
        assert_eq!(b.family_discount, 15_750);
        assert_eq!(b.total, 15_750);
        assert_eq!(b.discount_code_valid, Some(true));
    }

    #[test]
    fn unknown_code_is_reported_invalid() {
        let b = price_breakdown(date(2026, 2, 10), date(2026, 2, 12), &pricing(), Some("SUMMER"))
            .unwrap();
        assert_eq!(b.discount_code_valid, Some(false));
        assert_eq!(b.family_discount, 0);
        assert_eq!(b.total, 10_000);
    }

    #[test]
    fn blank_code_counts_as_absent() {
        let b = price_breakdown(date(2026, 2, 10), date(2026, 2, 12), &pricing(), Some("  "))
            .unwrap();
        assert_eq!(b.discount_code_valid, None);
    }

    #[test]
    fn checkout_must_follow_checkin() {
        assert_matches!(
            price_breakdown(date(2026, 2, 10), date(2026, 2, 10), &pricing(), None),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            nights_between(date(2026, 2, 10), date(2026, 2, 9)),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn overlap_is_half_open() {
        let stay = (date(2026, 5, 1), date(2026, 5, 5));
        assert!(ranges_overlap(stay, (date(2026, 5, 4), date(2026, 5, 8))));
        assert!(ranges_overlap(stay, (date(2026, 4, 28), date(2026, 5, 10))));
        assert!(!ranges_overlap(stay, (date(2026, 5, 5), date(2026, 5, 8))));
        assert!(!ranges_overlap(stay, (date(2026, 4, 25), date(2026, 5, 1))));
    }

    #[test]
    fn status_transitions_only_leave_pending() {
        use BookingStatus::*;
        assert!(validate_status_transition(Pending, Confirmed).is_ok());
        assert!(validate_status_transition(Pending, Cancelled).is_ok());
        assert_matches!(validate_status_transition(Pending, Pending), Err(CoreError::Validation(_)));
        assert_matches!(validate_status_transition(Confirmed, Cancelled), Err(CoreError::Conflict(_)));
        assert_matches!(validate_status_transition(Cancelled, Confirmed), Err(CoreError::Conflict(_)));
    }

    #[test]
    fn guest_count_bounds() {
        assert!(validate_guests(1).is_ok());
        assert!(validate_guests(DEFAULT_GUESTS).is_ok());
        assert!(validate_guests(0).is_err());
        assert!(validate_guests(MAX_GUESTS + 1).is_err());
    }

    #[test]
    fn occupying_statuses() {
        assert!(BookingStatus::Pending.occupies_dates());
        assert!(BookingStatus::Confirmed.occupies_dates());
        assert!(!BookingStatus::Cancelled.occupies_dates());
    }
}
