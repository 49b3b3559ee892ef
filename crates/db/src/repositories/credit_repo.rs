//! Repository for the append-only `credit_entries` table.
//!
//! Entries are only ever inserted. Balances are computed with `SUM` over an
//! owner's rows, so concurrent appends need no coordination.

use gardenkeep_core::money::Cents;
use sqlx::{PgConnection, PgPool};

use crate::models::credit::{CreateCreditEntry, CreditEntry};

const COLUMNS: &str = "id, owner_email, amount, reason, kind, created_at";

/// Number of entries returned by [`CreditRepo::recent_for_owner`] by default.
pub const RECENT_ENTRIES: i64 = 20;

pub struct CreditRepo;

impl CreditRepo {
    /// Append an entry, returning the stored row.
    pub async fn append(pool: &PgPool, input: &CreateCreditEntry) -> Result<CreditEntry, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        Self::append_with(&mut conn, input).await
    }

    /// Append an entry on an existing connection or transaction.
    pub async fn append_with(
        conn: &mut PgConnection,
        input: &CreateCreditEntry,
    ) -> Result<CreditEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO credit_entries (owner_email, amount, reason, kind)
             VALUES (LOWER($1), $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CreditEntry>(&query)
            .bind(&input.owner_email)
            .bind(input.amount)
            .bind(&input.reason)
            .bind(input.kind.as_str())
            .fetch_one(conn)
            .await
    }

    /// The newest `limit` entries of an owner, newest first.
    pub async fn recent_for_owner(
        pool: &PgPool,
        owner_email: &str,
        limit: i64,
    ) -> Result<Vec<CreditEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM credit_entries
             WHERE owner_email = LOWER($1)
             ORDER BY id DESC
             LIMIT $2"
        );
        sqlx::query_as::<_, CreditEntry>(&query)
            .bind(owner_email)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Sum of all entry amounts of an owner. Zero when there are none.
    pub async fn balance(pool: &PgPool, owner_email: &str) -> Result<Cents, sqlx::Error> {
        let (total,): (Cents,) = sqlx::query_as(
            "SELECT COALESCE(SUM(amount), 0)::BIGINT
             FROM credit_entries WHERE owner_email = LOWER($1)",
        )
        .bind(owner_email)
        .fetch_one(pool)
        .await?;
        Ok(total)
    }

    /// Sum of all `earned` entries across owners.
    pub async fn total_awarded(pool: &PgPool) -> Result<Cents, sqlx::Error> {
        let (total,): (Cents,) = sqlx::query_as(
            "SELECT COALESCE(SUM(amount), 0)::BIGINT
             FROM credit_entries WHERE kind = 'earned'",
        )
        .fetch_one(pool)
        .await?;
        Ok(total)
    }
}
