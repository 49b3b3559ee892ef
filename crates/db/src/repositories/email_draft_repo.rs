//! Repository for the `email_drafts` table.

use gardenkeep_core::email_draft::DraftStatus;
use gardenkeep_core::types::DbId;
use sqlx::PgPool;

use crate::models::email_draft::{CreateEmailDraft, EmailDraft};

const COLUMNS: &str = "id, to_email, to_name, subject, body, final_body, task_id, task_title, \
                        status, created_by, decided_by, decided_at, created_at, updated_at";

pub struct EmailDraftRepo;

impl EmailDraftRepo {
    pub async fn create(pool: &PgPool, input: &CreateEmailDraft) -> Result<EmailDraft, sqlx::Error> {
        let query = format!(
            "INSERT INTO email_drafts (to_email, to_name, subject, body, task_id, task_title, created_by)
             VALUES (LOWER($1), $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EmailDraft>(&query)
            .bind(&input.to_email)
            .bind(&input.to_name)
            .bind(&input.subject)
            .bind(&input.body)
            .bind(input.task_id)
            .bind(&input.task_title)
            .bind(&input.created_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<EmailDraft>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM email_drafts WHERE id = $1");
        sqlx::query_as::<_, EmailDraft>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List drafts newest first; `None` lists every status.
    pub async fn list(
        pool: &PgPool,
        status: Option<DraftStatus>,
    ) -> Result<Vec<EmailDraft>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM email_drafts
             WHERE ($1::TEXT IS NULL OR status = $1)
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, EmailDraft>(&query)
            .bind(status.map(DraftStatus::as_str))
            .fetch_all(pool)
            .await
    }

    /// Claim a pending draft for sending: `pending -> sent`.
    ///
    /// Returns `None` when the draft does not exist or was already decided,
    /// so only one approver ever sends a given draft.
    pub async fn mark_sent(
        pool: &PgPool,
        id: DbId,
        final_body: &str,
        decided_by: &str,
    ) -> Result<Option<EmailDraft>, sqlx::Error> {
        let query = format!(
            "UPDATE email_drafts
             SET status = 'sent', final_body = $2, decided_by = $3, decided_at = NOW()
             WHERE id = $1 AND status = 'pending'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EmailDraft>(&query)
            .bind(id)
            .bind(final_body)
            .bind(decided_by)
            .fetch_optional(pool)
            .await
    }

    /// Undo a claim whose delivery failed: `sent -> pending`.
    pub async fn release(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE email_drafts
             SET status = 'pending', final_body = NULL, decided_by = NULL, decided_at = NULL
             WHERE id = $1 AND status = 'sent'",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Reject a pending draft. Returns `None` when it was already decided.
    pub async fn reject(
        pool: &PgPool,
        id: DbId,
        decided_by: &str,
    ) -> Result<Option<EmailDraft>, sqlx::Error> {
        let query = format!(
            "UPDATE email_drafts
             SET status = 'rejected', decided_by = $2, decided_at = NOW()
             WHERE id = $1 AND status = 'pending'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EmailDraft>(&query)
            .bind(id)
            .bind(decided_by)
            .fetch_optional(pool)
            .await
    }
}
