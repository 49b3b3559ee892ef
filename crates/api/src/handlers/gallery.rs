//! Handlers for the photo/video gallery (`/gallery`).

use std::path::Path as FsPath;

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use gardenkeep_core::error::CoreError;
use gardenkeep_core::media::{self, DEFAULT_MEDIA_CATEGORY};
use gardenkeep_core::types::DbId;
use gardenkeep_db::models::media::{CreateMediaItem, MediaItem};
use gardenkeep_db::repositories::MediaRepo;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::response::DataResponse;
use crate::state::AppState;
use crate::storage::MediaStore;
use crate::upload::{read_form, store_upload, unique_suffix};

#[derive(Debug, Deserialize)]
pub struct GalleryParams {
    pub category: Option<String>,
}

/// A media item with its public URL.
#[derive(Debug, Serialize)]
pub struct GalleryItem {
    #[serde(flatten)]
    pub item: MediaItem,
    pub url: String,
}

impl GalleryItem {
    fn new(item: MediaItem, store: &dyn MediaStore) -> Self {
        let url = store.url_for(&item.file_path);
        Self { item, url }
    }
}

// ---------------------------------------------------------------------------
// GET /gallery
// ---------------------------------------------------------------------------

/// List media newest first, optionally within one category.
pub async fn list_media(
    State(state): State<AppState>,
    Query(params): Query<GalleryParams>,
) -> AppResult<impl IntoResponse> {
    let items = MediaRepo::list(&state.pool, params.category.as_deref()).await?;
    let data: Vec<GalleryItem> = items
        .into_iter()
        .map(|item| GalleryItem::new(item, state.media_store.as_ref()))
        .collect();
    Ok(Json(DataResponse { data }))
}

// ---------------------------------------------------------------------------
// POST /gallery/upload
// ---------------------------------------------------------------------------

/// Upload one file. Multipart fields: `file` (required), `category`, `name`,
/// `description`.
///
/// The file is stored as `<category>/<slug>.<ext>`, where the slug comes
/// from `name` or the original file name; taken or empty slugs get a random
/// suffix.
pub async fn upload_media(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let form = read_form(multipart).await?;
    let file = form
        .file
        .as_ref()
        .ok_or_else(|| AppError::BadRequest("Missing 'file' field".into()))?;

    let category = form
        .text("category")
        .map(|c| c.to_lowercase())
        .unwrap_or_else(|| DEFAULT_MEDIA_CATEGORY.to_string());
    media::validate_category(&category)?;
    let checked = media::validate_upload(&file.filename, file.content_type.as_deref())?;
    media::validate_size(file.data.len())?;

    let name = form.text("name");
    let original_stem = FsPath::new(&file.filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string();
    let stem = match media::slugify(name.as_deref().unwrap_or(&original_stem)) {
        Some(slug) => {
            let candidate = format!("{category}/{slug}.{}", checked.extension);
            if MediaRepo::path_exists(&state.pool, &candidate).await? {
                format!("{slug}-{}", unique_suffix())
            } else {
                slug
            }
        }
        None => unique_suffix(),
    };

    let stored = store_upload(state.media_store.as_ref(), &category, &stem, file).await?;

    let created = MediaRepo::create(
        &state.pool,
        &CreateMediaItem {
            file_path: stored.relative_path.clone(),
            original_name: file.filename.clone(),
            name,
            description: form.text("description"),
            category,
            kind: stored.upload.kind.as_str().to_string(),
            content_type: file.content_type.clone(),
            size_bytes: stored.size_bytes,
            uploaded_by: auth.email.clone(),
        },
    )
    .await;

    let item = match created {
        Ok(item) => item,
        Err(e) => {
            if let Err(cleanup) = state.media_store.delete(&stored.relative_path).await {
                tracing::warn!(error = %cleanup, path = %stored.relative_path, "Failed to remove orphaned upload");
            }
            return Err(e.into());
        }
    };

    tracing::info!(
        media_id = item.id,
        path = %item.file_path,
        bytes = item.size_bytes,
        uploaded_by = %auth.email,
        "Media uploaded",
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: GalleryItem::new(item, state.media_store.as_ref()),
        }),
    ))
}

// ---------------------------------------------------------------------------
// DELETE /gallery/{id}
// ---------------------------------------------------------------------------

/// Remove the row and its stored file. A file that cannot be removed is
/// logged; the row stays deleted.
pub async fn delete_media(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let item = MediaRepo::delete(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "MediaItem",
            id,
        }))?;

    if let Err(e) = state.media_store.delete(&item.file_path).await {
        tracing::warn!(error = %e, path = %item.file_path, "Failed to remove media file");
    }

    tracing::info!(media_id = id, admin = %admin.email, "Media deleted");
    Ok(StatusCode::NO_CONTENT)
}
