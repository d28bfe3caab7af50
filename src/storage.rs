//! Attachment storage - the blob store behind request attachments.
//!
//! The workflow only records the path returned by [`BlobStorage::store`]; it never reads
//! attachment content. [`LocalBlobStorage`] keeps files under a root directory, laid out
//! like a public disk (`purchase_requests/<generated name>`).

use crate::errors::{Error, Result};
use std::future::Future;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Largest accepted attachment, 5 MiB
pub const MAX_ATTACHMENT_BYTES: usize = 5 * 1024 * 1024;

/// Accepted attachment extensions
pub const ALLOWED_EXTENSIONS: [&str; 8] = ["pdf", "jpg", "jpeg", "png", "doc", "docx", "xls", "xlsx"];

const ATTACHMENT_PREFIX: &str = "purchase_requests";

/// An uploaded file waiting to be stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentUpload {
    /// Original client file name, used only for its extension
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl AttachmentUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Lowercased extension of the client file name.
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
    }

    /// Checks size and type limits.
    ///
    /// # Errors
    /// `Validation` on `attachment` when the file is too large or of an unaccepted type.
    pub fn validate(&self) -> Result<()> {
        if self.bytes.len() > MAX_ATTACHMENT_BYTES {
            return Err(Error::validation(
                "attachment",
                "The attachment must not be greater than 5120 kilobytes.",
            ));
        }

        match self.extension() {
            Some(ext) if ALLOWED_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
            _ => Err(Error::validation(
                "attachment",
                format!(
                    "The attachment must be a file of type: {}.",
                    ALLOWED_EXTENSIONS.join(", ")
                ),
            )),
        }
    }
}

/// Blob store used for attachments
pub trait BlobStorage: Send + Sync {
    /// Stores the upload and returns its path.
    fn store(&self, upload: &AttachmentUpload) -> impl Future<Output = Result<String>> + Send;

    /// Deletes the blob at `path`. Deleting a missing blob is not an error.
    fn delete(&self, path: &str) -> impl Future<Output = Result<()>> + Send;

    /// Whether a blob exists at `path`.
    fn exists(&self, path: &str) -> impl Future<Output = Result<bool>> + Send;

    /// Public URL for the blob at `path`.
    fn url(&self, path: &str) -> String;
}

/// Filesystem-backed blob store
#[derive(Debug)]
pub struct LocalBlobStorage {
    root: PathBuf,
    base_url: String,
    sequence: AtomicU64,
}

impl LocalBlobStorage {
    /// Creates a store rooted at `root`, serving URLs under `/storage`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_base_url(root, "/storage")
    }

    pub fn with_base_url(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            sequence: AtomicU64::new(0),
        }
    }

    /// Maps a stored path onto the filesystem, refusing anything outside the root.
    fn full_path(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path);
        let confined = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if path.is_empty() || !confined {
            return Err(Error::validation(
                "attachment",
                format!("Invalid attachment path: {path}"),
            ));
        }
        Ok(self.root.join(relative))
    }

    fn generate_name(&self, extension: &str) -> String {
        let now = chrono::Utc::now();
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!(
            "{}-{}-{sequence}.{extension}",
            now.format("%Y%m%d%H%M%S"),
            now.timestamp_subsec_nanos()
        )
    }
}

impl BlobStorage for LocalBlobStorage {
    async fn store(&self, upload: &AttachmentUpload) -> Result<String> {
        upload.validate()?;
        let extension = upload.extension().unwrap_or_default();
        let path = format!("{ATTACHMENT_PREFIX}/{}", self.generate_name(&extension));
        let full_path = self.full_path(&path)?;

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&full_path, &upload.bytes).await?;
        debug!("Stored attachment at {}", path);
        Ok(path)
    }

    async fn delete(&self, path: &str) -> Result<()> {
        match tokio::fs::remove_file(self.full_path(path)?).await {
            Ok(()) => {
                debug!("Deleted attachment {}", path);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        Ok(tokio::fs::try_exists(self.full_path(path)?).await?)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}
