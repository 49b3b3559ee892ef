//! Integration tests for project completion and confirmation.
//!
//! Exercises the conditional updates against a real database:
//! - Completion only matches `in_progress` projects
//! - Confirmation credits the completer exactly once
//! - Concurrent confirmations write exactly one ledger entry
//! - Reorder moves respect the expected current status

use gardenkeep_core::project_workflow::ProjectStatus;
use gardenkeep_db::models::project::CreateProject;
use gardenkeep_db::repositories::{CreditRepo, ProjectRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_project(title: &str) -> CreateProject {
    CreateProject {
        title: title.to_string(),
        description: None,
        category: "garten".to_string(),
        effort: None,
        priority: None,
        estimated_cost: None,
        credit_value: None,
        assigned_to: None,
        created_by: Some("creator@example.com".to_string()),
    }
}

async fn in_progress(pool: &PgPool, title: &str) -> i64 {
    let project = ProjectRepo::create(pool, &new_project(title)).await.unwrap();
    ProjectRepo::move_status(pool, project.id, ProjectStatus::Open, ProjectStatus::InProgress)
        .await
        .unwrap()
        .expect("open project should move to in_progress");
    project.id
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_create_defaults_to_open_medium(pool: PgPool) {
    let project = ProjectRepo::create(&pool, &new_project("Fence")).await.unwrap();
    assert_eq!(project.status, "open");
    assert_eq!(project.priority, "medium");
    assert!(project.completed_at.is_none());
    assert!(project.confirmed_at.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_move_requires_expected_status(pool: PgPool) {
    let project = ProjectRepo::create(&pool, &new_project("Shed")).await.unwrap();

    let stale = ProjectRepo::move_status(&pool, project.id, ProjectStatus::Next, ProjectStatus::Open)
        .await
        .unwrap();
    assert!(stale.is_none(), "move from a status the project is not in must not match");

    let moved = ProjectRepo::move_status(&pool, project.id, ProjectStatus::Open, ProjectStatus::Next)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(moved.status, "next");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_complete_only_from_in_progress(pool: PgPool) {
    let project = ProjectRepo::create(&pool, &new_project("Gutter")).await.unwrap();
    let result = ProjectRepo::complete(&pool, project.id, "worker@example.com", None, None)
        .await
        .unwrap();
    assert!(result.is_none(), "open project must not complete");

    let id = in_progress(&pool, "Gutter 2").await;
    let done = ProjectRepo::complete(&pool, id, "worker@example.com", Some("mowed front lawn"), None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(done.status, "done");
    assert_eq!(done.completed_by.as_deref(), Some("worker@example.com"));
    assert_eq!(done.completion_notes.as_deref(), Some("mowed front lawn"));
    assert!(done.completed_at.is_some());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_confirm_credits_completer(pool: PgPool) {
    let id = in_progress(&pool, "Mow front lawn").await;
    ProjectRepo::complete(&pool, id, "worker@example.com", Some("mowed front lawn"), None)
        .await
        .unwrap()
        .unwrap();
    let before = CreditRepo::balance(&pool, "worker@example.com").await.unwrap();

    let confirmed = ProjectRepo::confirm(&pool, id, "admin@example.com", 1_500)
        .await
        .unwrap()
        .expect("first confirmation should succeed");

    assert_eq!(confirmed.project.credit_awarded, Some(1_500));
    assert_eq!(confirmed.project.confirmed_by.as_deref(), Some("admin@example.com"));
    assert_eq!(confirmed.credit.owner_email, "worker@example.com");
    assert_eq!(confirmed.credit.reason, "Mow front lawn");
    assert_eq!(confirmed.credit.kind, "earned");

    let after = CreditRepo::balance(&pool, "worker@example.com").await.unwrap();
    assert_eq!(after - before, 1_500);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_second_confirm_is_rejected_without_entry(pool: PgPool) {
    let id = in_progress(&pool, "Roof").await;
    ProjectRepo::complete(&pool, id, "worker@example.com", None, None)
        .await
        .unwrap()
        .unwrap();
    ProjectRepo::confirm(&pool, id, "admin@example.com", 1_000)
        .await
        .unwrap()
        .unwrap();

    let second = ProjectRepo::confirm(&pool, id, "admin@example.com", 1_000).await.unwrap();
    assert!(second.is_none());

    let entries = CreditRepo::recent_for_owner(&pool, "worker@example.com", 20).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(CreditRepo::balance(&pool, "worker@example.com").await.unwrap(), 1_000);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_concurrent_confirmations_write_one_entry(pool: PgPool) {
    let id = in_progress(&pool, "Hedge").await;
    ProjectRepo::complete(&pool, id, "worker@example.com", None, None)
        .await
        .unwrap()
        .unwrap();

    let (a, b) = tokio::join!(
        ProjectRepo::confirm(&pool, id, "admin@example.com", 700),
        ProjectRepo::confirm(&pool, id, "other-admin@example.com", 700),
    );
    let successes = [a.unwrap(), b.unwrap()].iter().filter(|r| r.is_some()).count();
    assert_eq!(successes, 1);

    let entries = CreditRepo::recent_for_owner(&pool, "worker@example.com", 20).await.unwrap();
    assert_eq!(entries.len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_confirm_unfinished_project_matches_nothing(pool: PgPool) {
    let id = in_progress(&pool, "Pond").await;
    let result = ProjectRepo::confirm(&pool, id, "admin@example.com", 500).await.unwrap();
    assert!(result.is_none());
    assert!(CreditRepo::recent_for_owner(&pool, "worker@example.com", 20)
        .await
        .unwrap()
        .is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_pending_confirmations_and_counts(pool: PgPool) {
    let done_id = in_progress(&pool, "Done one").await;
    ProjectRepo::complete(&pool, done_id, "worker@example.com", None, None)
        .await
        .unwrap()
        .unwrap();
    ProjectRepo::create(&pool, &new_project("Still open")).await.unwrap();

    let pending = ProjectRepo::list_pending_confirmations(&pool).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, done_id);

    let counts = ProjectRepo::count_by_status(&pool).await.unwrap();
    let done = counts.iter().find(|c| c.status == "done").map(|c| c.count);
    let open = counts.iter().find(|c| c.status == "open").map(|c| c.count);
    assert_eq!(done, Some(1));
    assert_eq!(open, Some(1));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_confirmation_pair_is_enforced_by_schema(pool: PgPool) {
    let project = ProjectRepo::create(&pool, &new_project("Invariant")).await.unwrap();
    let result = sqlx::query("UPDATE projects SET confirmed_at = NOW() WHERE id = $1")
        .bind(project.id)
        .execute(&pool)
        .await;
    assert!(result.is_err(), "confirmed_at without credit_awarded must violate a check");
}
