pub mod contact_handlers;
pub mod health_handlers;
pub mod order_handlers;
pub mod presign_handlers;

use crate::{
    errors::AppError,
    services::validation::{MAX_ORDER_BODY_BYTES, ValidationError},
};
use axum::{extract::rejection::BytesRejection, http::StatusCode};
use bytes::Bytes;
use serde::de::DeserializeOwned;

/// Turn a body the extractor refused into the usual `{success:false, error}`
/// rejection. Bodies over the router's limit are reported as too large.
pub(crate) fn accept_body(body: Result<Bytes, BytesRejection>) -> Result<Bytes, AppError> {
    body.map_err(|rejection| {
        tracing::debug!(reason = %rejection.body_text(), "request body refused");
        let err = if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ValidationError::PayloadTooLarge {
                limit: MAX_ORDER_BODY_BYTES,
            }
        } else {
            ValidationError::MalformedBody
        };
        AppError::bad_request(err.to_string())
    })
}

/// Parse a JSON request body; an empty body counts as `{}`.
///
/// Parsing is done here rather than with the `Json` extractor so malformed
/// bodies get the same `{success:false, error}` shape as other rejections.
pub(crate) fn parse_json_body<T: DeserializeOwned + Default>(body: &[u8]) -> Result<T, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|_| AppError::bad_request(ValidationError::MalformedBody.to_string()))
}
