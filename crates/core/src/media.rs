//! Upload validation and file naming for gallery media and completion photos.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "heic", "heif"];
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "webm", "avi"];

/// Maximum accepted upload size (100 MB).
pub const MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// Maximum length of a generated slug.
pub const MAX_SLUG_LENGTH: usize = 50;

/// Category used when an upload names none.
pub const DEFAULT_MEDIA_CATEGORY: &str = "sonstiges";

/// Directory under the media root holding completion photos.
pub const COMPLETION_PHOTO_CATEGORY: &str = "completions";

/// Directory under the media root holding issue photos.
pub const ISSUE_PHOTO_CATEGORY: &str = "issues";

static NON_SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9\s-]").expect("valid regex"));
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static HYPHENS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-+").expect("valid regex"));
static CATEGORY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9_-]{0,39}$").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }

    fn mime_prefix(self) -> &'static str {
        match self {
            MediaKind::Image => "image/",
            MediaKind::Video => "video/",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The lowercased extension of `filename`, if it has one.
pub fn extension_of(filename: &str) -> Option<String> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

pub fn kind_for_extension(ext: &str) -> Option<MediaKind> {
    if IMAGE_EXTENSIONS.contains(&ext) {
        Some(MediaKind::Image)
    } else if VIDEO_EXTENSIONS.contains(&ext) {
        Some(MediaKind::Video)
    } else {
        None
    }
}

/// A checked upload: its kind and normalized extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedUpload {
    pub kind: MediaKind,
    pub extension: String,
}

/// Reject uploads whose extension or declared MIME type is not supported.
///
/// `application/octet-stream` is accepted as "unknown" and the extension
/// decides; any other declared type must match the extension's kind.
pub fn validate_upload(filename: &str, content_type: Option<&str>) -> Result<ValidatedUpload, CoreError> {
    let extension = extension_of(filename)
        .ok_or_else(|| CoreError::Validation("File name has no extension".into()))?;
    let kind = kind_for_extension(&extension).ok_or_else(|| {
        CoreError::Validation(format!("File type '.{extension}' is not allowed"))
    })?;

    if let Some(mime) = content_type.map(str::trim).filter(|m| !m.is_empty()) {
        let mime = mime.to_ascii_lowercase();
        if mime != "application/octet-stream" && !mime.starts_with(kind.mime_prefix()) {
            return Err(CoreError::Validation(format!(
                "Content type '{mime}' does not match a supported {kind} format"
            )));
        }
    }

    Ok(ValidatedUpload { kind, extension })
}

pub fn validate_size(len: usize) -> Result<(), CoreError> {
    if len == 0 {
        return Err(CoreError::Validation("Uploaded file is empty".into()));
    }
    if len > MAX_UPLOAD_BYTES {
        return Err(CoreError::Validation(format!(
            "File exceeds size limit of {} MB",
            MAX_UPLOAD_BYTES / (1024 * 1024)
        )));
    }
    Ok(())
}

/// Validate a gallery category, which doubles as a directory name.
pub fn validate_category(category: &str) -> Result<(), CoreError> {
    if !CATEGORY_RE.is_match(category) {
        return Err(CoreError::Validation(format!(
            "Invalid media category '{category}'"
        )));
    }
    Ok(())
}

/// Turn free text into a URL-safe slug. German umlauts are transliterated.
pub fn slugify(text: &str) -> Option<String> {
    let lowered = text
        .to_lowercase()
        .replace('ä', "ae")
        .replace('ö', "oe")
        .replace('ü', "ue")
        .replace('ß', "ss");
    let cleaned = NON_SLUG_RE.replace_all(&lowered, "");
    let hyphenated = WHITESPACE_RE.replace_all(cleaned.trim(), "-");
    let collapsed = HYPHENS_RE.replace_all(&hyphenated, "-");
    let slug: String = collapsed.chars().take(MAX_SLUG_LENGTH).collect();
    (!slug.is_empty()).then_some(slug)
}
