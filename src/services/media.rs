// src/services/media.rs
// DOCUMENTATION: Recipe image storage
// PURPOSE: Decode base64 data URLs and keep image files under MEDIA_ROOT

use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::errors::FoodgramError;

/// Sub-directory of MEDIA_ROOT holding recipe images
pub const RECIPE_IMAGE_DIR: &str = "recipes/images";

/// Decoded upload: file extension plus raw bytes
#[derive(Debug, PartialEq)]
pub struct DecodedImage {
    pub extension: &'static str,
    pub bytes: Vec<u8>,
}

/// Parse `data:image/<fmt>;base64,<payload>`
pub fn decode_data_url(data_url: &str) -> Result<DecodedImage, FoodgramError> {
    let invalid = |msg: &str| FoodgramError::ValidationError(format!("image: {}", msg));

    let rest = data_url
        .trim()
        .strip_prefix("data:")
        .ok_or_else(|| invalid("expected a data URL"))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| invalid("missing payload"))?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or_else(|| invalid("payload must be base64 encoded"))?;

    let extension = match mime.to_ascii_lowercase().as_str() {
        "image/png" => "png",
        "image/jpeg" | "image/jpg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        other => return Err(invalid(&format!("unsupported type '{}'", other))),
    };

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|_| invalid("invalid base64 payload"))?;
    if bytes.is_empty() {
        return Err(invalid("empty file"));
    }

    Ok(DecodedImage { extension, bytes })
}

pub struct MediaStorage {
    root: PathBuf,
}

impl MediaStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Decode and write an uploaded image, returning its path relative to the media root
    pub async fn save_recipe_image(&self, data_url: &str) -> Result<String, FoodgramError> {
        let image = decode_data_url(data_url)?;
        let relative = format!("{}/{}.{}", RECIPE_IMAGE_DIR, Uuid::new_v4().simple(), image.extension);

        let dir = self.root.join(RECIPE_IMAGE_DIR);
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            log::error!("Cannot create media directory {}: {}", dir.display(), e);
            FoodgramError::InternalError
        })?;

        let target = self.root.join(&relative);
        tokio::fs::write(&target, &image.bytes).await.map_err(|e| {
            log::error!("Cannot write image {}: {}", target.display(), e);
            FoodgramError::InternalError
        })?;

        log::debug!("Stored recipe image {} ({} bytes)", relative, image.bytes.len());
        Ok(relative)
    }

    /// Best-effort removal of a stored file
    pub async fn remove(&self, relative: &str) {
        if relative.is_empty() || Path::new(relative).is_absolute() || relative.contains("..") {
            return;
        }
        let target = self.root.join(relative);
        if let Err(e) = tokio::fs::remove_file(&target).await {
            log::warn!("Could not remove media file {}: {}", target.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1x1 transparent PNG
    const PNG: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

    #[test]
    fn test_decode_png() {
        let image = decode_data_url(PNG).unwrap();
        assert_eq!(image.extension, "png");
        assert_eq!(&image.bytes[1..4], b"PNG");
    }

    #[test]
    fn test_decode_rejects_bad_input() {
        assert!(decode_data_url("iVBORw0KGgo=").is_err());
        assert!(decode_data_url("data:text/plain;base64,aGVsbG8=").is_err());
        assert!(decode_data_url("data:image/png,rawdata").is_err());
        assert!(decode_data_url("data:image/png;base64,@@@").is_err());
        assert!(decode_data_url("data:image/png;base64,").is_err());
    }

    #[test]
    fn test_save_and_remove() {
        let root = std::env::temp_dir().join(format!("foodgram-media-{}", Uuid::new_v4().simple()));
        let storage = MediaStorage::new(&root);

        let relative = tokio_test::block_on(storage.save_recipe_image(PNG)).unwrap();
        assert!(relative.starts_with("recipes/images/"));
        assert!(relative.ends_with(".png"));
        assert!(root.join(&relative).exists());

        tokio_test::block_on(storage.remove(&relative));
        assert!(!root.join(&relative).exists());

        let _ = std::fs::remove_dir_all(&root);
    }
}
