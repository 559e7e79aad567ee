//! Photo upload service.
//!
//! Validates and stores report photos, returning the public URL that a
//! submission can reference.

use std::sync::Arc;

use komuna_common::{AppError, AppResult, StorageBackend, generate_storage_key};
use serde::Serialize;

/// Maximum accepted photo size (10MB).
pub const MAX_PHOTO_SIZE: usize = 10 * 1024 * 1024;

/// Accepted photo content types.
const ALLOWED_CONTENT_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];

/// Input for a photo upload.
#[derive(Debug)]
pub struct UploadPhotoInput {
    /// Original file name, used only to pick the storage extension.
    pub file_name: String,
    /// Declared MIME type.
    pub content_type: String,
    /// Raw file bytes.
    pub data: Vec<u8>,
}

/// A stored photo.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredPhoto {
    /// Public URL referencing the photo.
    pub url: String,
    /// Storage key.
    pub key: String,
    /// File size in bytes.
    pub size: u64,
    /// MIME content type.
    pub content_type: String,
    /// Decoded pixel width.
    pub width: u32,
    /// Decoded pixel height.
    pub height: u32,
}

/// Photo service.
#[derive(Clone)]
pub struct PhotoService {
    storage: Arc<dyn StorageBackend>,
}

impl PhotoService {
    /// Create a new photo service.
    #[must_use]
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self { storage }
    }

    /// Validate and store a photo, returning its public URL.
    pub async fn upload(&self, input: UploadPhotoInput) -> AppResult<StoredPhoto> {
        if input.data.is_empty() {
            return Err(AppError::BadRequest("Photo is empty".to_string()));
        }

        if input.data.len() > MAX_PHOTO_SIZE {
            return Err(AppError::BadRequest(format!(
                "Photo too large. Maximum size is {MAX_PHOTO_SIZE} bytes"
            )));
        }

        if !ALLOWED_CONTENT_TYPES.contains(&input.content_type.as_str()) {
            return Err(AppError::BadRequest(format!(
                "Unsupported photo type: {}",
                input.content_type
            )));
        }

        // Decode to prove the bytes really are an image, and to record
        // the dimensions.
        let decoded = image::load_from_memory(&input.data)
            .map_err(|e| AppError::BadRequest(format!("Not a valid image: {e}")))?;

        let key = generate_storage_key(&input.file_name);
        let uploaded = self
            .storage
            .upload(&key, &input.data, &input.content_type)
            .await?;

        Ok(StoredPhoto {
            url: uploaded.url,
            key: uploaded.key,
            size: uploaded.size,
            content_type: uploaded.content_type,
            width: decoded.width(),
            height: decoded.height(),
        })
    }
}
