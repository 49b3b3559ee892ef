//! Repository for the `media_items` table.

use gardenkeep_core::types::DbId;
use sqlx::PgPool;

use crate::models::media::{CreateMediaItem, MediaItem};

const COLUMNS: &str = "id, file_path, original_name, name, description, category, kind, \
                        content_type, size_bytes, uploaded_by, created_at";

pub struct MediaRepo;

impl MediaRepo {
    pub async fn create(pool: &PgPool, input: &CreateMediaItem) -> Result<MediaItem, sqlx::Error> {
        let query = format!(
            "INSERT INTO media_items
                (file_path, original_name, name, description, category, kind,
                 content_type, size_bytes, uploaded_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MediaItem>(&query)
            .bind(&input.file_path)
            .bind(&input.original_name)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.category)
            .bind(&input.kind)
            .bind(&input.content_type)
            .bind(input.size_bytes)
            .bind(&input.uploaded_by)
            .fetch_one(pool)
            .await
    }

    /// Newest first, optionally by category.
    pub async fn list(pool: &PgPool, category: Option<&str>) -> Result<Vec<MediaItem>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM media_items
             WHERE ($1::TEXT IS NULL OR category = $1)
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, MediaItem>(&query)
            .bind(category)
            .fetch_all(pool)
            .await
    }

    /// Whether a stored path is already taken.
    pub async fn path_exists(pool: &PgPool, file_path: &str) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM media_items WHERE file_path = $1)")
                .bind(file_path)
                .fetch_one(pool)
                .await?;
        Ok(exists)
    }

    /// Delete a row, returning it so the caller can remove the stored file.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<MediaItem>, sqlx::Error> {
        let query = format!("DELETE FROM media_items WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, MediaItem>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
