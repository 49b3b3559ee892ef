pub mod admin;
pub mod auth;
pub mod booking;
pub mod credit;
pub mod email_draft;
pub mod gallery;
pub mod issue;
pub mod project;
pub mod recurring_task;
pub mod task;

use gardenkeep_core::media::COMPLETION_PHOTO_CATEGORY;

use crate::error::AppResult;
use crate::state::AppState;
use crate::upload::{store_upload, unique_suffix, FormParts};

/// Notes and photo reference of a completion submitted as a multipart form.
///
/// An attached `photo` part is stored under the completions category; a
/// plain `photo_url` field is taken as is.
pub(crate) async fn completion_from_form(
    state: &AppState,
    form: FormParts,
    stem: &str,
) -> AppResult<(Option<String>, Option<String>)> {
    let notes = form.text("notes");
    let photo_url = match &form.file {
        Some(file) => {
            let stored = store_upload(
                state.media_store.as_ref(),
                COMPLETION_PHOTO_CATEGORY,
                &format!("{stem}-{}", unique_suffix()),
                file,
            )
            .await?;
            Some(stored.url)
        }
        None => form.text("photo_url"),
    };
    Ok((notes, photo_url))
}
