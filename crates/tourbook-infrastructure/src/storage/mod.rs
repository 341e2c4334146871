//! Activity photo storage on the local filesystem.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{error, info};
use uuid::Uuid;

use tourbook_core::error::DomainError;
use tourbook_core::ports::{PhotoStorage, PhotoUpload};

/// Stores photos as `<uuid>.<ext>` directly under `root`; the stored file
/// name is the reference kept on the activity.
pub struct LocalPhotoStorage {
    root: PathBuf,
}

impl LocalPhotoStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, reference: &str) -> Result<PathBuf, DomainError> {
        let plain = !reference.is_empty()
            && !reference.contains(&['/', '\\'][..])
            && reference != "."
            && reference != "..";
        if !plain {
            return Err(DomainError::StorageError(format!("invalid photo reference: {}", reference)));
        }
        Ok(self.root.join(reference))
    }
}

#[async_trait]
impl PhotoStorage for LocalPhotoStorage {
    async fn store(&self, upload: &PhotoUpload) -> Result<String, DomainError> {
        upload.check()?;
        let extension = upload.extension().unwrap_or_else(|| "jpg".to_string());
        let reference = format!("{}.{}", Uuid::new_v4(), extension);

        tokio::fs::create_dir_all(&self.root).await.map_err(|e| {
            error!("Failed to create photo directory {}: {}", self.root.display(), e);
            DomainError::StorageError(e.to_string())
        })?;

        let path = self.path_for(&reference)?;
        tokio::fs::write(&path, &upload.bytes).await.map_err(|e| {
            error!("Failed to write photo {}: {}", path.display(), e);
            DomainError::StorageError(e.to_string())
        })?;

        info!("Stored photo {} ({} bytes)", reference, upload.bytes.len());
        Ok(reference)
    }

    /// Deleting a missing photo is not an error.
    async fn delete(&self, reference: &str) -> Result<(), DomainError> {
        let path = self.path_for(reference)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => {
                error!("Failed to delete photo {}: {}", path.display(), e);
                Err(DomainError::StorageError(e.to_string()))
            }
        }
    }
}
