//! Multipart form handling shared by the photo-accepting endpoints.
//!
//! [`JsonOrForm`] lets one route accept either a JSON body or a
//! `multipart/form-data` form with an attached file. [`store_upload`] checks
//! a file against the media rules and writes it through the [`MediaStore`].

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use axum::Json;
use gardenkeep_core::media::{self, ValidatedUpload};
use serde::de::DeserializeOwned;

use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::storage::MediaStore;

/// One uploaded file part.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// The text fields and the first file part of a multipart form.
#[derive(Debug, Default)]
pub struct FormParts {
    pub fields: HashMap<String, String>,
    pub file: Option<UploadedFile>,
}

impl FormParts {
    /// A trimmed, non-empty text field.
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }
}

/// Drain a multipart stream. Parts carrying a filename are files; the rest
/// are text fields.
pub async fn read_form(mut multipart: Multipart) -> AppResult<FormParts> {
    let mut form = FormParts::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        if let Some(filename) = field.file_name().map(str::to_string) {
            let content_type = field.content_type().map(str::to_string);
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            if form.file.is_none() && !data.is_empty() {
                form.file = Some(UploadedFile {
                    filename,
                    content_type,
                    data,
                });
            }
        } else {
            let text = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            form.fields.insert(name, text);
        }
    }

    Ok(form)
}

/// A request body given either as JSON or as a multipart form.
///
/// A request without a `Content-Type` is treated as an empty JSON body.
#[derive(Debug)]
pub enum JsonOrForm<T> {
    Json(T),
    Form(FormParts),
}

impl<T> FromRequest<AppState> for JsonOrForm<T>
where
    T: DeserializeOwned + Default + Send,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_ascii_lowercase);

        match content_type {
            None => Ok(JsonOrForm::Json(T::default())),
            Some(ct) if ct.starts_with("multipart/form-data") => {
                let multipart = Multipart::from_request(req, state)
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                Ok(JsonOrForm::Form(read_form(multipart).await?))
            }
            Some(_) => {
                let Json(body) = Json::<T>::from_request(req, state)
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                Ok(JsonOrForm::Json(body))
            }
        }
    }
}

/// A file that passed validation and was written to the store.
#[derive(Debug, Clone)]
pub struct StoredUpload {
    pub relative_path: String,
    pub url: String,
    pub upload: ValidatedUpload,
    pub size_bytes: i64,
}

/// Validate `file` and store it as `<category>/<stem>.<ext>`.
pub async fn store_upload(
    store: &dyn MediaStore,
    category: &str,
    stem: &str,
    file: &UploadedFile,
) -> AppResult<StoredUpload> {
    let upload = media::validate_upload(&file.filename, file.content_type.as_deref())?;
    media::validate_size(file.data.len())?;
    media::validate_category(category)?;

    let relative_path = format!("{category}/{stem}.{}", upload.extension);
    store.put(&relative_path, &file.data).await?;

    Ok(StoredUpload {
        url: store.url_for(&relative_path),
        relative_path,
        upload,
        size_bytes: i64::try_from(file.data.len()).unwrap_or(i64::MAX),
    })
}

/// Short random suffix for generated file names.
pub fn unique_suffix() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
}
