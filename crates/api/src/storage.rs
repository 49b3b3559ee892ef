//! Media storage for gallery uploads and completion/issue photos.
//!
//! Handlers talk to a [`MediaStore`] trait object held in the app state.
//! [`LocalMediaStore`] writes below a root directory that the router also
//! serves under [`MEDIA_URL_PREFIX`].

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

/// URL prefix under which stored media is served.
pub const MEDIA_URL_PREFIX: &str = "/media";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The relative path is absolute or escapes the media root.
    #[error("Invalid media path: {0}")]
    InvalidPath(String),
}

/// Stores uploaded bytes under stable relative paths like
/// `completions/project-7-1a2b.jpg`.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Write `data` at `relative_path`, creating parent directories.
    async fn put(&self, relative_path: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Remove the file at `relative_path`. Missing files are not an error.
    async fn delete(&self, relative_path: &str) -> Result<(), StorageError>;

    /// Public URL of a stored file.
    fn url_for(&self, relative_path: &str) -> String {
        format!("{MEDIA_URL_PREFIX}/{relative_path}")
    }
}

/// Filesystem-backed [`MediaStore`].
pub struct LocalMediaStore {
    root: PathBuf,
}

impl LocalMediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, relative_path: &str) -> Result<PathBuf, StorageError> {
        let rel = Path::new(relative_path);
        let is_plain = !relative_path.is_empty()
            && rel.components().all(|c| matches!(c, Component::Normal(_)));
        if !is_plain {
            return Err(StorageError::InvalidPath(relative_path.to_string()));
        }
        Ok(self.root.join(rel))
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    async fn put(&self, relative_path: &str, data: &[u8]) -> Result<(), StorageError> {
        let path = self.resolve(relative_path)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, data).await?;
        tracing::debug!(path = %path.display(), bytes = data.len(), "Stored media file");
        Ok(())
    }

    async fn delete(&self, relative_path: &str) -> Result<(), StorageError> {
        let path = self.resolve(relative_path)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
