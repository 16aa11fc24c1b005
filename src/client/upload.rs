//! Staged photo upload: local checks, presign, direct PUT, commit.

use crate::{
    client::{
        api_client::{ApiClient, ClientError, CreateOrderRequest},
        notifications::NotificationBus,
    },
    models::{
        order::OrderDetails,
        photo::{MAX_PHOTO_BYTES, PhotoReference, is_allowed_image_type},
    },
};
use base64::{Engine as _, engine::general_purpose};
use bytes::Bytes;
use reqwest::header;
use std::{io, path::Path};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("File size must be less than 10MB")]
    TooLarge,
    #[error("Only JPG, PNG, and HEIC formats are supported")]
    UnsupportedType,
    #[error("Failed to get upload URL: {0}")]
    Presign(ClientError),
    #[error("Upload failed: {0}")]
    Transfer(reqwest::Error),
    #[error("Upload failed with status {0}")]
    Status(u16),
    #[error("Failed to create order: {0}")]
    Order(ClientError),
    #[error("Could not read photo: {0}")]
    Read(#[from] io::Error),
}

/// A photo the user picked, held in memory.
#[derive(Debug, Clone)]
pub struct LocalPhoto {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl LocalPhoto {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk, inferring its MIME type from the extension.
    ///
    /// Files over the size ceiling are refused from their metadata and never
    /// read into memory.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, UploadError> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?
            .to_string();
        if tokio::fs::metadata(path).await?.len() > MAX_PHOTO_BYTES {
            return Err(UploadError::TooLarge);
        }
        let bytes = tokio::fs::read(path).await?;
        Ok(Self::new(file_name, content_type_for(path), bytes))
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Local, non-authoritative preview as a `data:` URL.
    pub fn preview_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.content_type,
            general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("heic") => "image/heic",
        Some("heif") => "image/heif",
        _ => "application/octet-stream",
    }
}

/// Pre-flight checks that never touch the network.
pub fn check_photo(photo: &LocalPhoto) -> Result<(), UploadError> {
    if photo.size() > MAX_PHOTO_BYTES {
        return Err(UploadError::TooLarge);
    }
    if !is_allowed_image_type(&photo.content_type) {
        return Err(UploadError::UnsupportedType);
    }
    Ok(())
}

/// Drives one photo from local selection to a committed object reference.
///
/// Every stage failure ends the attempt; nothing is retried and no partial
/// reference is returned.
#[derive(Debug, Clone)]
pub struct UploadCoordinator {
    api: ApiClient,
    notifications: NotificationBus,
}

impl UploadCoordinator {
    pub fn new(api: ApiClient, notifications: NotificationBus) -> Self {
        Self { api, notifications }
    }

    pub async fn upload(&self, photo: &LocalPhoto) -> Result<PhotoReference, UploadError> {
        if let Err(err) = check_photo(photo) {
            self.notifications.error(err.to_string());
            return Err(err);
        }

        match self.transfer(photo).await {
            Ok(reference) => {
                tracing::info!(key = %reference.key, "photo uploaded");
                self.notifications.success("Photo uploaded successfully!");
                Ok(reference)
            }
            Err(err) => {
                tracing::warn!(error = %err, file = %photo.file_name, "photo upload failed");
                self.notifications.error(err.to_string());
                Err(err)
            }
        }
    }

    async fn transfer(&self, photo: &LocalPhoto) -> Result<PhotoReference, UploadError> {
        let target = self
            .api
            .presign(&photo.file_name, &photo.content_type)
            .await
            .map_err(UploadError::Presign)?;

        let digest = md5::compute(&photo.bytes);
        let response = self
            .api
            .http()
            .put(&target.url)
            .header(header::CONTENT_TYPE, &photo.content_type)
            .header("Content-MD5", general_purpose::STANDARD.encode(digest.0))
            .body(photo.bytes.clone())
            .send()
            .await
            .map_err(UploadError::Transfer)?;

        if !response.status().is_success() {
            return Err(UploadError::Status(response.status().as_u16()));
        }

        Ok(PhotoReference {
            key: target.key,
            url: target.file_url,
        })
    }

    /// Submit the order for an uploaded photo; returns the order id.
    pub async fn submit_order(
        &self,
        details: &OrderDetails,
        photo: &PhotoReference,
    ) -> Result<String, UploadError> {
        let request = CreateOrderRequest {
            order_details: details,
            photo_s3_key: &photo.key,
            photo_s3_url: &photo.url,
        };
        match self.api.create_order(&request).await {
            Ok(order_id) => {
                self.notifications
                    .success(format!("Order created successfully! Order ID: {}", order_id));
                Ok(order_id)
            }
            Err(err) => {
                let err = UploadError::Order(err);
                self.notifications.error(err.to_string());
                Err(err)
            }
        }
    }
}
