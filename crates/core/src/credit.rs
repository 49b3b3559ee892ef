//! Append-only credit ledger.
//!
//! Credit is an informal balance earned for maintenance work and used
//! against booking costs. Entries are never mutated; the balance of an owner
//! is the sum of all of their entry amounts. Amounts are integer cents, so
//! the sum is exact whatever the append order. Overdraft is allowed.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::money::{self, Cents};
use crate::types::{DbId, Timestamp};

/// Reason recorded for a recurring task completion when the title is empty.
pub const DEFAULT_REASON: &str = "maintenance work";

/// Maximum length of a ledger reason.
pub const MAX_REASON_LENGTH: usize = 200;

// ---------------------------------------------------------------------------
// CreditKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreditKind {
    Earned,
    Used,
}

impl CreditKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CreditKind::Earned => "earned",
            CreditKind::Used => "used",
        }
    }
}

impl fmt::Display for CreditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CreditKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "earned" => Ok(CreditKind::Earned),
            "used" => Ok(CreditKind::Used),
            other => Err(CoreError::Validation(format!(
                "Invalid credit kind '{other}'. Must be one of: earned, used"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a manually booked ledger entry.
///
/// Earned entries must not be negative and used entries must not be
/// positive, so the sign of the amount always agrees with its kind. The
/// reason must be non-empty.
pub fn validate_manual_entry(amount: Cents, reason: &str, kind: CreditKind) -> Result<(), CoreError> {
    if reason.trim().is_empty() {
        return Err(CoreError::Validation("Credit reason must not be empty".into()));
    }
    if reason.len() > MAX_REASON_LENGTH {
        return Err(CoreError::Validation(format!(
            "Credit reason exceeds maximum length of {MAX_REASON_LENGTH} characters"
        )));
    }
    match kind {
        CreditKind::Earned if amount < 0 => Err(CoreError::Validation(
            "Earned credit must not be negative".into(),
        )),
        CreditKind::Used if amount > 0 => Err(CoreError::Validation(
            "Used credit must not be positive".into(),
        )),
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// One immutable ledger line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreditEntry {
    pub id: DbId,
    pub owner_email: String,
    #[serde(with = "money::euros")]
    pub amount: Cents,
    pub reason: String,
    pub kind: CreditKind,
    pub created_at: Timestamp,
}

/// Sum the amounts of a sequence of entries.
pub fn balance_of<'a>(entries: impl IntoIterator<Item = &'a CreditEntry>) -> Cents {
    entries.into_iter().map(|e| e.amount).sum()
}

/// In-memory ledger keyed by owner email.
///
/// Entries for one owner keep their append order. The database-backed
/// ledger in `gardenkeep-db` follows the same contract.
#[derive(Debug, Default, Clone)]
pub struct CreditLedger {
    entries: BTreeMap<String, Vec<CreditEntry>>,
    next_id: DbId,
}

impl CreditLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry for `owner`. Always succeeds.
    pub fn append(
        &mut self,
        owner: &str,
        amount: Cents,
        reason: &str,
        kind: CreditKind,
        at: Timestamp,
    ) -> &CreditEntry {
        self.next_id += 1;
        let entry = CreditEntry {
            id: self.next_id,
            owner_email: owner.to_string(),
            amount,
            reason: reason.to_string(),
            kind,
            created_at: at,
        };
        let owned = self.entries.entry(owner.to_string()).or_default();
        owned.push(entry);
        &owned[owned.len() - 1]
    }

    pub fn entries_for(&self, owner: &str) -> &[CreditEntry] {
        self.entries.get(owner).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn balance(&self, owner: &str) -> Cents {
        balance_of(self.entries_for(owner))
    }

    /// Total number of entries across all owners.
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
