//! Integration tests for the last-active-admin guard on user changes.

use assert_matches::assert_matches;
use gardenkeep_core::roles::{ROLE_ADMIN, ROLE_USER};
use gardenkeep_core::types::DbId;
use gardenkeep_db::models::user::{CreateUser, UpdateUser};
use gardenkeep_db::repositories::{AdminChange, UserRepo};
use sqlx::PgPool;

async fn new_user(pool: &PgPool, username: &str, role: &str) -> DbId {
    UserRepo::create(
        pool,
        &CreateUser {
            email: format!("{username}@example.com"),
            username: username.to_string(),
            name: None,
            password_hash: "not-a-real-hash".to_string(),
            role: role.to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

fn demote() -> UpdateUser {
    UpdateUser {
        role: Some(ROLE_USER.to_string()),
        ..Default::default()
    }
}

async fn active_admins(pool: &PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = 'admin' AND is_active = true")
        .fetch_one(pool)
        .await
        .unwrap()
}

#[sqlx::test(migrations = "./migrations")]
async fn test_demoting_the_only_admin_is_refused(pool: PgPool) {
    let root = new_user(&pool, "root", ROLE_ADMIN).await;

    let result = UserRepo::update(&pool, root, &demote()).await.unwrap();

    assert_matches!(result, AdminChange::LastAdmin);
    assert_eq!(active_admins(&pool).await, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_demoting_one_of_two_admins_is_applied(pool: PgPool) {
    let root = new_user(&pool, "root", ROLE_ADMIN).await;
    new_user(&pool, "second", ROLE_ADMIN).await;

    let result = UserRepo::update(&pool, root, &demote()).await.unwrap();

    assert_matches!(result, AdminChange::Applied(user) if user.role == ROLE_USER);
    assert_eq!(active_admins(&pool).await, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_renaming_the_only_admin_is_applied(pool: PgPool) {
    let root = new_user(&pool, "root", ROLE_ADMIN).await;
    let rename = UpdateUser {
        name: Some("Gärtnerin".to_string()),
        ..Default::default()
    };

    let result = UserRepo::update(&pool, root, &rename).await.unwrap();

    assert_matches!(result, AdminChange::Applied(user) if user.name.as_deref() == Some("Gärtnerin"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_of_missing_user_reports_not_found(pool: PgPool) {
    let result = UserRepo::update(&pool, 9_999, &UpdateUser::default()).await.unwrap();
    assert_matches!(result, AdminChange::NotFound);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_concurrent_demotions_keep_one_admin(pool: PgPool) {
    let first = new_user(&pool, "first", ROLE_ADMIN).await;
    let second = new_user(&pool, "second", ROLE_ADMIN).await;

    let demotion = demote();
    let (a, b) = tokio::join!(
        UserRepo::update(&pool, first, &demotion),
        UserRepo::update(&pool, second, &demotion),
    );
    let outcomes = [a.unwrap(), b.unwrap()];

    let applied = outcomes.iter().filter(|o| matches!(o, AdminChange::Applied(_))).count();
    let refused = outcomes.iter().filter(|o| matches!(o, AdminChange::LastAdmin)).count();
    assert_eq!((applied, refused), (1, 1));
    assert_eq!(active_admins(&pool).await, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_concurrent_demotion_and_deactivation_keep_one_admin(pool: PgPool) {
    let first = new_user(&pool, "first", ROLE_ADMIN).await;
    let second = new_user(&pool, "second", ROLE_ADMIN).await;

    let demotion = demote();
    let (a, b) = tokio::join!(
        UserRepo::update(&pool, first, &demotion),
        UserRepo::deactivate(&pool, second),
    );
    a.unwrap();
    b.unwrap();

    assert_eq!(active_admins(&pool).await, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_deactivating_a_regular_user_is_applied_once(pool: PgPool) {
    new_user(&pool, "root", ROLE_ADMIN).await;
    let anna = new_user(&pool, "anna", ROLE_USER).await;

    assert_eq!(UserRepo::deactivate(&pool, anna).await.unwrap(), AdminChange::Applied(true));
    assert_eq!(UserRepo::deactivate(&pool, anna).await.unwrap(), AdminChange::Applied(false));
}
