//! Types describing an uploaded photo and the presigned upload that produces it.

use serde::{Deserialize, Serialize};

/// MIME types accepted for customer photos, on both the client and the server.
pub const ALLOWED_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/heic", "image/heif"];

/// Largest photo the client will try to upload (10 MiB).
pub const MAX_PHOTO_BYTES: u64 = 10 * 1024 * 1024;

pub fn is_allowed_image_type(content_type: &str) -> bool {
    ALLOWED_IMAGE_TYPES.contains(&content_type)
}

/// Body of `POST /presign`.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct PresignRequest {
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub file_type: Option<String>,
}

/// A reserved object key plus the short-lived URL that may write it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PresignedUpload {
    /// Signed PUT URL.
    pub url: String,
    /// Object key the URL is bound to.
    pub key: String,
    /// Public URL the object will have once written.
    pub file_url: String,
}

/// Object key and URL of a photo whose upload completed.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PhotoReference {
    pub key: String,
    pub url: String,
}
