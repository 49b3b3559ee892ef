//! Due-state computation for recurring chores.
//!
//! A chore is `overdue` once more whole days than its cycle length have
//! passed since the last completion, `due-soon` once more than 70% of the
//! cycle has elapsed, and `ok` otherwise. A chore that was never completed is
//! always `overdue`.

use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

/// Fraction of the cycle after which a chore becomes `due-soon`.
pub const DUE_SOON_FRACTION: f64 = 0.7;

const SECONDS_PER_DAY: i64 = 86_400;

// ---------------------------------------------------------------------------
// CycleDays
// ---------------------------------------------------------------------------

/// A validated, strictly positive cycle length in days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CycleDays(i32);

impl CycleDays {
    pub fn new(days: i32) -> Result<Self, CoreError> {
        if days <= 0 {
            return Err(CoreError::Validation(format!(
                "Cycle length must be greater than 0 days (got {days})"
            )));
        }
        Ok(Self(days))
    }

    pub fn get(self) -> i32 {
        self.0
    }
}

impl TryFrom<i32> for CycleDays {
    type Error = CoreError;

    fn try_from(days: i32) -> Result<Self, Self::Error> {
        Self::new(days)
    }
}

impl<'de> Deserialize<'de> for CycleDays {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let days = i32::deserialize(deserializer)?;
        CycleDays::new(days).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// DueStatus
// ---------------------------------------------------------------------------

/// Due-state of a recurring chore.
///
/// Variants are declared in severity order so `Ord` ranks
/// `Ok < DueSoon < Overdue`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DueStatus {
    #[serde(rename = "ok")]
    Ok,
    #[serde(rename = "due-soon")]
    DueSoon,
    #[serde(rename = "overdue")]
    Overdue,
}

impl DueStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DueStatus::Ok => "ok",
            DueStatus::DueSoon => "due-soon",
            DueStatus::Overdue => "overdue",
        }
    }

    /// Whether the chore needs attention (shown in the board's `open` column).
    pub fn needs_attention(self) -> bool {
        matches!(self, DueStatus::DueSoon | DueStatus::Overdue)
    }
}

impl fmt::Display for DueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DueStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ok" => Ok(DueStatus::Ok),
            "due-soon" => Ok(DueStatus::DueSoon),
            "overdue" => Ok(DueStatus::Overdue),
            other => Err(CoreError::Validation(format!(
                "Invalid due status '{other}'. Must be one of: ok, due-soon, overdue"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Derivation
// ---------------------------------------------------------------------------

/// Whole days elapsed between `last_done` and `now`, rounded down.
///
/// Negative when `last_done` lies in the future.
pub fn days_since(last_done: Timestamp, now: Timestamp) -> i64 {
    (now - last_done).num_seconds().div_euclid(SECONDS_PER_DAY)
}

/// Compute the due-state of a chore.
pub fn derive_status(last_done: Option<Timestamp>, cycle: CycleDays, now: Timestamp) -> DueStatus {
    let Some(last_done) = last_done else {
        return DueStatus::Overdue;
    };

    let elapsed = days_since(last_done, now);
    let cycle_days = i64::from(cycle.get());

    if elapsed > cycle_days {
        DueStatus::Overdue
    } else if elapsed as f64 > DUE_SOON_FRACTION * cycle_days as f64 {
        DueStatus::DueSoon
    } else {
        DueStatus::Ok
    }
}

/// The date the chore is next expected, if it was ever completed.
pub fn next_due(last_done: Option<Timestamp>, cycle: CycleDays) -> Option<Timestamp> {
    last_done.map(|done| done + Duration::days(i64::from(cycle.get())))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
