//! Repository for the `bookings` table.

use chrono::NaiveDate;
use gardenkeep_core::booking::BookingStatus;
use gardenkeep_core::types::DbId;
use sqlx::PgPool;

use crate::models::booking::{BookedRange, Booking, CreateBooking};

const COLUMNS: &str = "id, guest_name, guest_email, guest_phone, check_in, check_out, guests, \
                        has_pets, total_price, discount_code, notes, status, created_at, updated_at";

/// Advisory lock key serializing the overlap check with the insert.
const BOOKING_LOCK_KEY: i64 = 0x6761_7264_656e;

pub struct BookingRepo;

impl BookingRepo {
    /// Insert a booking unless its dates overlap a pending or confirmed one.
    ///
    /// The overlap check and the insert run under a transaction-scoped
    /// advisory lock. Returns `None` when the dates are taken.
    pub async fn create_if_available(
        pool: &PgPool,
        input: &CreateBooking,
    ) -> Result<Option<Booking>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(BOOKING_LOCK_KEY)
            .execute(&mut *tx)
            .await?;

        let (taken,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (
                SELECT 1 FROM bookings
                WHERE status IN ('pending', 'confirmed')
                  AND check_in < $2 AND $1 < check_out
             )",
        )
        .bind(input.check_in)
        .bind(input.check_out)
        .fetch_one(&mut *tx)
        .await?;
        if taken {
            tracing::debug!(check_in = %input.check_in, check_out = %input.check_out, "Booking dates already taken");
            return Ok(None);
        }

        let query = format!(
            "INSERT INTO bookings
                (guest_name, guest_email, guest_phone, check_in, check_out, guests,
                 has_pets, total_price, discount_code, notes)
             VALUES ($1, LOWER($2), $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        let booking = sqlx::query_as::<_, Booking>(&query)
            .bind(&input.guest_name)
            .bind(&input.guest_email)
            .bind(&input.guest_phone)
            .bind(input.check_in)
            .bind(input.check_out)
            .bind(input.guests)
            .bind(input.has_pets)
            .bind(input.total_price)
            .bind(&input.discount_code)
            .bind(&input.notes)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(booking))
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Booking>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM bookings WHERE id = $1");
        sqlx::query_as::<_, Booking>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Admin listing, newest first, optionally by status.
    pub async fn list(
        pool: &PgPool,
        status: Option<BookingStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Booking>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM bookings
             WHERE ($1::TEXT IS NULL OR status = $1)
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Booking>(&query)
            .bind(status.map(BookingStatus::as_str))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Pending and confirmed date ranges, optionally clipped to a window.
    pub async fn occupied_ranges(
        pool: &PgPool,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<BookedRange>, sqlx::Error> {
        sqlx::query_as::<_, BookedRange>(
            "SELECT check_in, check_out FROM bookings
             WHERE status IN ('pending', 'confirmed')
               AND ($1::DATE IS NULL OR check_out > $1)
               AND ($2::DATE IS NULL OR check_in < $2)
             ORDER BY check_in, id",
        )
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await
    }

    /// `pending -> confirmed|cancelled`. Returns `None` when the booking does
    /// not exist or is no longer pending.
    pub async fn decide(
        pool: &PgPool,
        id: DbId,
        status: BookingStatus,
    ) -> Result<Option<Booking>, sqlx::Error> {
        let query = format!(
            "UPDATE bookings SET status = $2
             WHERE id = $1 AND status = 'pending'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Booking>(&query)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(pool)
            .await
    }

    pub async fn count_pending(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM bookings WHERE status = 'pending'")
                .fetch_one(pool)
                .await?;
        Ok(count)
    }
}
