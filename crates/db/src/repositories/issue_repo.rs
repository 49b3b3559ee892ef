//! Repository for the `issues` table.

use gardenkeep_core::project_workflow::Priority;
use gardenkeep_core::types::DbId;
use sqlx::PgPool;

use crate::models::issue::{CreateIssue, Issue};
use crate::models::project::{CreateProject, Project};
use crate::repositories::ProjectRepo;

const COLUMNS: &str = "id, title, description, category, photo_url, reported_by, reporter_email, \
                        status, admin_notes, converted_to_project_id, decided_at, created_at, updated_at";

pub struct IssueRepo;

impl IssueRepo {
    pub async fn create(pool: &PgPool, input: &CreateIssue) -> Result<Issue, sqlx::Error> {
        let query = format!(
            "INSERT INTO issues (title, description, category, photo_url, reported_by, reporter_email)
             VALUES ($1, $2, $3, $4, $5, LOWER($6))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Issue>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.category)
            .bind(&input.photo_url)
            .bind(input.reported_by)
            .bind(&input.reporter_email)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Issue>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM issues WHERE id = $1");
        sqlx::query_as::<_, Issue>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List reports newest first; `reported_by` restricts to one reporter.
    pub async fn list(pool: &PgPool, reported_by: Option<DbId>) -> Result<Vec<Issue>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM issues
             WHERE ($1::BIGINT IS NULL OR reported_by = $1)
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Issue>(&query)
            .bind(reported_by)
            .fetch_all(pool)
            .await
    }

    /// Approve a pending report and turn it into a project, atomically.
    ///
    /// Returns `None` when the report does not exist or was already decided.
    pub async fn approve(
        pool: &PgPool,
        id: DbId,
        priority: Option<Priority>,
        admin_notes: Option<&str>,
        approved_by: &str,
    ) -> Result<Option<(Issue, Project)>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let claim = format!(
            "UPDATE issues SET status = 'approved', admin_notes = $2, decided_at = NOW()
             WHERE id = $1 AND status = 'pending'
             RETURNING {COLUMNS}"
        );
        let Some(issue) = sqlx::query_as::<_, Issue>(&claim)
            .bind(id)
            .bind(admin_notes)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let project = ProjectRepo::create_with(
            &mut tx,
            &CreateProject {
                title: issue.title.clone(),
                description: issue.description.clone(),
                category: issue.category.clone(),
                effort: None,
                priority,
                estimated_cost: None,
                credit_value: None,
                assigned_to: None,
                created_by: Some(approved_by.to_string()),
            },
        )
        .await?;

        let link = format!(
            "UPDATE issues SET converted_to_project_id = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        let issue = sqlx::query_as::<_, Issue>(&link)
            .bind(issue.id)
            .bind(project.id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some((issue, project)))
    }

    /// Reject a pending report. Returns `None` when it was already decided.
    pub async fn reject(
        pool: &PgPool,
        id: DbId,
        admin_notes: Option<&str>,
    ) -> Result<Option<Issue>, sqlx::Error> {
        let query = format!(
            "UPDATE issues SET status = 'rejected', admin_notes = $2, decided_at = NOW()
             WHERE id = $1 AND status = 'pending'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Issue>(&query)
            .bind(id)
            .bind(admin_notes)
            .fetch_optional(pool)
            .await
    }
}
