//! Repository for the `users` table.

use gardenkeep_core::roles::ROLE_ADMIN;
use gardenkeep_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::user::{CreateUser, UpdateUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, email, username, name, password_hash, role, is_active, \
                        last_login_at, created_at, updated_at";

/// Outcome of a user change that may remove an active admin.
#[derive(Debug, Clone, PartialEq)]
pub enum AdminChange<T> {
    Applied(T),
    NotFound,
    /// Refused: no active admin would remain.
    LastAdmin,
}

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (email, username, name, password_hash, role)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.email)
            .bind(&input.username)
            .bind(&input.name)
            .bind(&input.password_hash)
            .bind(&input.role)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email. Emails are stored lowercased.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = LOWER($1)");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by either email or username, for login.
    pub async fn find_by_login(pool: &PgPool, login: &str) -> Result<Option<User>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM users WHERE email = LOWER($1) OR username = $1 LIMIT 1");
        sqlx::query_as::<_, User>(&query)
            .bind(login)
            .fetch_optional(pool)
            .await
    }

    /// List all users ordered by most recently created first.
    pub async fn list(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, User>(&query).fetch_all(pool).await
    }

    /// Update a user. Only non-`None` fields in `input` are applied.
    ///
    /// A change that demotes or deactivates the only active admin is refused
    /// with [`AdminChange::LastAdmin`]. The active admin rows stay locked
    /// until the update commits, so concurrent demotions are serialized.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateUser,
    ) -> Result<AdminChange<User>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let removes_admin = input.role.as_deref().is_some_and(|r| r != ROLE_ADMIN)
            || input.is_active == Some(false);
        if removes_admin && is_last_active_admin(&mut *tx, id).await? {
            return Ok(AdminChange::LastAdmin);
        }

        let query = format!(
            "UPDATE users SET
                name = COALESCE($2, name),
                role = COALESCE($3, role),
                is_active = COALESCE($4, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.role)
            .bind(input.is_active)
            .fetch_optional(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(user.map_or(AdminChange::NotFound, AdminChange::Applied))
    }

    /// Soft-deactivate a user by setting `is_active = false`.
    ///
    /// Applies `true` if the row was updated and `false` if it was already
    /// inactive. Guarded like [`UserRepo::update`].
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<AdminChange<bool>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if is_last_active_admin(&mut *tx, id).await? {
            return Ok(AdminChange::LastAdmin);
        }

        let result =
            sqlx::query("UPDATE users SET is_active = false WHERE id = $1 AND is_active = true")
                .bind(id)
                .execute(&mut *tx)
                .await?;
        tx.commit().await?;

        Ok(AdminChange::Applied(result.rows_affected() > 0))
    }

    /// Record a successful login by setting `last_login_at` to now.
    pub async fn record_successful_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}

/// Lock every active admin row and report whether `id` is the only one.
async fn is_last_active_admin(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
    let admins: Vec<DbId> = sqlx::query_scalar(
        "SELECT id FROM users WHERE role = 'admin' AND is_active = true ORDER BY id FOR UPDATE",
    )
    .fetch_all(conn)
    .await?;
    Ok(admins.len() == 1 && admins[0] == id)
}
