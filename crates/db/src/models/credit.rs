//! Credit ledger row model and DTOs.
//!
//! Amounts are stored as cents and read or written as euros in JSON.

use gardenkeep_core::credit::CreditKind;
use gardenkeep_core::money::{self, Cents};
use gardenkeep_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the append-only `credit_entries` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CreditEntry {
    pub id: DbId,
    pub owner_email: String,
    #[serde(with = "money::euros")]
    pub amount: Cents,
    pub reason: String,
    pub kind: String,
    pub created_at: Timestamp,
}

/// DTO for appending a ledger entry.
#[derive(Debug, Clone)]
pub struct CreateCreditEntry {
    pub owner_email: String,
    pub amount: Cents,
    pub reason: String,
    pub kind: CreditKind,
}

/// Admin request to book a manual entry.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ManualCreditRequest {
    #[validate(email)]
    pub email: String,
    #[serde(with = "money::euros")]
    pub amount: Cents,
    pub reason: String,
    pub kind: CreditKind,
}

/// An owner's recent entries together with their balance.
#[derive(Debug, Clone, Serialize)]
pub struct CreditSummary {
    pub email: String,
    pub credits: Vec<CreditEntry>,
    #[serde(with = "money::euros")]
    pub total: Cents,
}
