//! Repository for the `recurring_tasks` and `maintenance_log` tables.

use gardenkeep_core::credit::{CreditKind, DEFAULT_REASON};
use gardenkeep_core::types::DbId;
use sqlx::PgPool;

use crate::models::credit::CreateCreditEntry;
use crate::models::recurring_task::{
    CompleteRecurringTask, CreateRecurringTask, MaintenanceLogEntry, RecurringCompletion,
    RecurringTask, UpdateRecurringTask,
};
use crate::repositories::CreditRepo;

const COLUMNS: &str = "id, title, description, category, effort, cycle_days, credit_value, \
                        last_completed_at, last_completed_by, is_active, created_at, updated_at";

const LOG_COLUMNS: &str = "id, recurring_task_id, completed_by, completed_at, notes, photo_url, \
                            credit_awarded, created_at, updated_at";

/// Recurring chores. Rows are deactivated, never deleted, since the
/// maintenance log references them.
pub struct RecurringTaskRepo;

impl RecurringTaskRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateRecurringTask,
    ) -> Result<RecurringTask, sqlx::Error> {
        let query = format!(
            "INSERT INTO recurring_tasks (title, description, category, effort, cycle_days, credit_value)
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, 0))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RecurringTask>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.category)
            .bind(&input.effort)
            .bind(input.cycle_days)
            .bind(input.credit_value)
            .fetch_one(pool)
            .await
    }

    /// Find a chore by ID, including inactive ones.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<RecurringTask>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM recurring_tasks WHERE id = $1");
        sqlx::query_as::<_, RecurringTask>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List chores, optionally restricted to one category.
    pub async fn list(
        pool: &PgPool,
        category: Option<&str>,
        include_inactive: bool,
    ) -> Result<Vec<RecurringTask>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM recurring_tasks
             WHERE ($1::TEXT IS NULL OR category = $1)
               AND ($2 OR is_active = true)
             ORDER BY category, title, id"
        );
        sqlx::query_as::<_, RecurringTask>(&query)
            .bind(category)
            .bind(include_inactive)
            .fetch_all(pool)
            .await
    }

    /// Update a chore. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateRecurringTask,
    ) -> Result<Option<RecurringTask>, sqlx::Error> {
        let query = format!(
            "UPDATE recurring_tasks SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                category = COALESCE($4, category),
                effort = COALESCE($5, effort),
                cycle_days = COALESCE($6, cycle_days),
                credit_value = COALESCE($7, credit_value),
                is_active = COALESCE($8, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RecurringTask>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.category)
            .bind(&input.effort)
            .bind(input.cycle_days)
            .bind(input.credit_value)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Soft-deactivate a chore. Returns `true` if the row was updated.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE recurring_tasks SET is_active = false WHERE id = $1 AND is_active = true",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record a completion in one transaction: reset the chore's clock,
    /// append to the maintenance log, and credit the completer when the chore
    /// carries a positive credit value.
    ///
    /// Returns `None` if the chore does not exist or is inactive.
    pub async fn complete(
        pool: &PgPool,
        id: DbId,
        completed_by: &str,
        input: &CompleteRecurringTask,
    ) -> Result<Option<RecurringCompletion>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE recurring_tasks
             SET last_completed_at = NOW(), last_completed_by = $2
             WHERE id = $1 AND is_active = true
             RETURNING {COLUMNS}"
        );
        let Some(task) = sqlx::query_as::<_, RecurringTask>(&query)
            .bind(id)
            .bind(completed_by)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let log_query = format!(
            "INSERT INTO maintenance_log
                (recurring_task_id, completed_by, completed_at, notes, photo_url, credit_awarded)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {LOG_COLUMNS}"
        );
        let log = sqlx::query_as::<_, MaintenanceLogEntry>(&log_query)
            .bind(task.id)
            .bind(completed_by)
            .bind(task.last_completed_at)
            .bind(&input.notes)
            .bind(&input.photo_url)
            .bind(task.credit_value)
            .fetch_one(&mut *tx)
            .await?;

        let credit = if task.credit_value > 0 {
            let reason = if task.title.trim().is_empty() {
                DEFAULT_REASON.to_string()
            } else {
                task.title.clone()
            };
            let entry = CreateCreditEntry {
                owner_email: completed_by.to_string(),
                amount: task.credit_value,
                reason,
                kind: CreditKind::Earned,
            };
            Some(CreditRepo::append_with(&mut tx, &entry).await?)
        } else {
            None
        };

        tx.commit().await?;
        Ok(Some(RecurringCompletion { task, log, credit }))
    }

    /// Completion history of a chore, newest first.
    pub async fn history(
        pool: &PgPool,
        id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<MaintenanceLogEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {LOG_COLUMNS} FROM maintenance_log
             WHERE recurring_task_id = $1
             ORDER BY completed_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, MaintenanceLogEntry>(&query)
            .bind(id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}
