//! Activity photo storage gateway

use async_trait::async_trait;
use crate::error::DomainError;

/// Upper bound for an uploaded photo, in bytes.
pub const MAX_PHOTO_BYTES: usize = 1024 * 1024;

const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "gif", "bmp", "webp"];

#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl PhotoUpload {
    pub fn extension(&self) -> Option<String> {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
    }

    pub fn check(&self) -> Result<(), DomainError> {
        match self.extension() {
            Some(ext) if IMAGE_EXTENSIONS.contains(&ext.as_str()) => {}
            _ => {
                return Err(DomainError::ValidationError(format!(
                    "image: {} is not an image",
                    self.file_name
                )))
            }
        }
        if self.bytes.is_empty() || self.bytes.len() > MAX_PHOTO_BYTES {
            return Err(DomainError::ValidationError(
                "image: size must be between 1 byte and 1024 kilobytes".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PhotoStorage: Send + Sync {
    /// Stores the photo and returns the reference saved on the activity.
    async fn store(&self, upload: &PhotoUpload) -> Result<String, DomainError>;
    async fn delete(&self, reference: &str) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_small_images_only() {
        let ok = PhotoUpload { file_name: "Lake.JPG".into(), bytes: vec![1; 10] };
        assert!(ok.check().is_ok());

        let not_image = PhotoUpload { file_name: "notes.txt".into(), bytes: vec![1; 10] };
        assert!(not_image.check().is_err());

        let too_big = PhotoUpload { file_name: "big.png".into(), bytes: vec![0; MAX_PHOTO_BYTES + 1] };
        assert!(too_big.check().is_err());
    }
}
