//! Repository for the `projects` table.
//!
//! Workflow transitions are conditional updates: the `WHERE` clause carries
//! the expected current state, and a `None` result means the project was not
//! in that state when the statement ran.

use gardenkeep_core::credit::CreditKind;
use gardenkeep_core::project_workflow::{Priority, ProjectStatus};
use gardenkeep_core::money::Cents;
use gardenkeep_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::credit::CreateCreditEntry;
use crate::models::dashboard::StatusCount;
use crate::models::project::{ConfirmedProject, CreateProject, Project, UpdateProject};
use crate::repositories::CreditRepo;

const COLUMNS: &str = "id, title, description, category, effort, priority, status, \
                        estimated_cost, credit_value, assigned_to, created_by, \
                        completed_at, completed_by, completion_photo, completion_notes, \
                        confirmed_at, confirmed_by, credit_awarded, created_at, updated_at";

pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project with status `open`.
    pub async fn create(pool: &PgPool, input: &CreateProject) -> Result<Project, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        Self::create_with(&mut conn, input).await
    }

    /// Insert a new project on an existing connection or transaction.
    pub async fn create_with(
        conn: &mut PgConnection,
        input: &CreateProject,
    ) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects
                (title, description, category, effort, priority, estimated_cost,
                 credit_value, assigned_to, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, LOWER($8), $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.category)
            .bind(&input.effort)
            .bind(input.priority.unwrap_or_default().as_str())
            .bind(&input.estimated_cost)
            .bind(input.credit_value)
            .bind(&input.assigned_to)
            .bind(&input.created_by)
            .fetch_one(conn)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List projects, optionally restricted to one status.
    pub async fn list(
        pool: &PgPool,
        status: Option<ProjectStatus>,
    ) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects
             WHERE ($1::TEXT IS NULL OR status = $1)
             ORDER BY
                CASE priority
                    WHEN 'critical' THEN 0 WHEN 'high' THEN 1
                    WHEN 'medium' THEN 2 ELSE 3
                END,
                created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(status.map(ProjectStatus::as_str))
            .fetch_all(pool)
            .await
    }

    /// Update plain fields. Status is left untouched.
    pub async fn update_fields(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProject,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                category = COALESCE($4, category),
                effort = COALESCE($5, effort),
                priority = COALESCE($6, priority),
                estimated_cost = COALESCE($7, estimated_cost),
                credit_value = COALESCE($8, credit_value),
                assigned_to = COALESCE(LOWER($9), assigned_to)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.category)
            .bind(&input.effort)
            .bind(input.priority.map(Priority::as_str))
            .bind(&input.estimated_cost)
            .bind(input.credit_value)
            .bind(&input.assigned_to)
            .fetch_optional(pool)
            .await
    }

    /// Move a project between `open`, `next` and `in_progress`, provided it
    /// is still in `from`.
    pub async fn move_status(
        pool: &PgPool,
        id: DbId,
        from: ProjectStatus,
        to: ProjectStatus,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET status = $3
             WHERE id = $1 AND status = $2 AND status <> 'done'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(from.as_str())
            .bind(to.as_str())
            .fetch_optional(pool)
            .await
    }

    /// `in_progress -> done(unconfirmed)`.
    pub async fn complete(
        pool: &PgPool,
        id: DbId,
        completed_by: &str,
        notes: Option<&str>,
        photo_url: Option<&str>,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                status = 'done',
                completed_at = NOW(),
                completed_by = $2,
                completion_notes = $3,
                completion_photo = $4
             WHERE id = $1 AND status = 'in_progress'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(completed_by)
            .bind(notes)
            .bind(photo_url)
            .fetch_optional(pool)
            .await
    }

    /// `done(unconfirmed) -> done(confirmed)`, crediting the completer.
    ///
    /// The update only matches while `confirmed_at IS NULL`, so of two
    /// simultaneous confirmations exactly one succeeds and exactly one ledger
    /// entry is written. Returns `None` when nothing matched.
    pub async fn confirm(
        pool: &PgPool,
        id: DbId,
        confirmed_by: &str,
        credit_amount: Cents,
    ) -> Result<Option<ConfirmedProject>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE projects SET
                confirmed_at = NOW(),
                confirmed_by = $2,
                credit_awarded = $3
             WHERE id = $1
               AND status = 'done'
               AND confirmed_at IS NULL
               AND completed_by IS NOT NULL
             RETURNING {COLUMNS}"
        );
        let Some(project) = sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(confirmed_by)
            .bind(credit_amount)
            .fetch_optional(&mut *tx)
            .await?
        else {
            tracing::debug!(project_id = id, "Confirmation matched no unconfirmed project");
            return Ok(None);
        };

        let entry = CreateCreditEntry {
            owner_email: project.completed_by.clone().unwrap_or_default(),
            amount: credit_amount,
            reason: project.title.clone(),
            kind: CreditKind::Earned,
        };
        let credit = CreditRepo::append_with(&mut tx, &entry).await?;

        tx.commit().await?;
        Ok(Some(ConfirmedProject { project, credit }))
    }

    /// Projects in `done(unconfirmed)`, oldest completion first.
    pub async fn list_pending_confirmations(pool: &PgPool) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects
             WHERE status = 'done' AND confirmed_at IS NULL
             ORDER BY completed_at ASC, id ASC"
        );
        sqlx::query_as::<_, Project>(&query).fetch_all(pool).await
    }

    pub async fn count_by_status(pool: &PgPool) -> Result<Vec<StatusCount>, sqlx::Error> {
        sqlx::query_as::<_, StatusCount>(
            "SELECT status, COUNT(*) AS count FROM projects GROUP BY status ORDER BY status",
        )
        .fetch_all(pool)
        .await
    }
}
