use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use uuid::Uuid;

use crate::error::ApiError;

/// Hard cap on attached images. Enforced against the declared content length
/// before the body is read, and again while buffering the upload.
pub(crate) const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Filesystem bucket for recipe images. Knows nothing about which recipe
/// references a blob; the record store owns that relationship.
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn blob_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Unguessable storage name. The original extension is kept so the
    /// content type can be derived when the blob is served back.
    fn generated_name(original_filename: &str) -> String {
        let stem = Uuid::new_v4().as_hyphenated().to_string();
        match sanitized_extension(original_filename) {
            Some(ext) => format!("{stem}.{ext}"),
            None => stem,
        }
    }

    pub(crate) async fn put(
        &self,
        bytes: &[u8],
        original_filename: &str,
    ) -> Result<String, ApiError> {
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(ApiError::PayloadTooLarge);
        }

        tokio::fs::create_dir_all(&self.root)
            .await
            .context("Failed to ensure blob directory exists")?;

        let name = Self::generated_name(original_filename);
        let path = self.blob_path(&name);

        let mut file = File::create(&path)
            .await
            .with_context(|| format!("Unable to create blob file: {path:?}"))?;
        file.write_all(bytes)
            .await
            .context("Unable to write blob")?;
        file.sync_all().await.context("Failed to fsync blob")?;

        debug!(name = %name, size = bytes.len(), "Stored blob");

        Ok(name)
    }

    pub(crate) async fn open(&self, name: &str) -> Result<Option<(File, u64)>> {
        let path = self.blob_path(name);

        let metadata = match tokio::fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err).context("Unable to stat blob"),
        };

        let file = File::open(&path)
            .await
            .with_context(|| format!("Unable to open blob file: {path:?}"))?;

        Ok(Some((file, metadata.len())))
    }

    /// Deleting a blob that is already gone is not an error.
    pub(crate) async fn delete(&self, name: &str) -> Result<()> {
        match tokio::fs::remove_file(self.blob_path(name)).await {
            Ok(()) => {
                debug!(name = %name, "Deleted blob");
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).context("Unable to delete blob"),
        }
    }
}

pub(crate) fn content_type_for(name: &str) -> &'static str {
    match sanitized_extension(name).as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

fn sanitized_extension(filename: &str) -> Option<String> {
    let ext = Path::new(filename).extension()?.to_str()?;
    if ext.is_empty() || ext.len() > 8 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
