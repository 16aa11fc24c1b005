//! `POST /presign`: issue a short-lived upload URL for one customer photo.

use crate::{
    errors::AppError,
    handlers::{accept_body, parse_json_body},
    models::photo::{PresignRequest, PresignedUpload},
    state::AppState,
};
use axum::{
    Json,
    extract::{State, rejection::BytesRejection},
};
use bytes::Bytes;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignResponse {
    pub success: bool,
    #[serde(flatten)]
    pub upload: PresignedUpload,
}

/// Body `{fileName, fileType}` → `{success, url, key, fileUrl}`.
pub async fn presign_upload(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<PresignResponse>, AppError> {
    let request: PresignRequest = parse_json_body(&accept_body(body)?)?;
    let upload = state.presign.presign(request).await?;
    Ok(Json(PresignResponse {
        success: true,
        upload,
    }))
}
