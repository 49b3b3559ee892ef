//! Gallery media model and DTOs.

use gardenkeep_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `media_items` table. `file_path` is relative to the media root.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MediaItem {
    pub id: DbId,
    pub file_path: String,
    pub original_name: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: String,
    pub kind: String,
    pub content_type: Option<String>,
    pub size_bytes: i64,
    pub uploaded_by: String,
    pub created_at: Timestamp,
}

/// DTO for recording a stored upload.
#[derive(Debug, Clone)]
pub struct CreateMediaItem {
    pub file_path: String,
    pub original_name: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: String,
    pub kind: String,
    pub content_type: Option<String>,
    pub size_bytes: i64,
    pub uploaded_by: String,
}
