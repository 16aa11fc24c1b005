//! `POST /contactMessage`: store a message from the contact form.

use crate::{
    errors::AppError,
    handlers::{accept_body, parse_json_body},
    services::contact_service::ContactRequest,
    state::AppState,
};
use axum::{
    Json,
    extract::{State, rejection::BytesRejection},
};
use bytes::Bytes;
use serde::Serialize;

pub const CONTACT_ACK: &str = "Your message has been received. We will get back to you soon!";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactResponse {
    pub success: bool,
    pub message_id: String,
    pub message: &'static str,
}

pub async fn save_contact_message(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ContactResponse>, AppError> {
    let request: ContactRequest = parse_json_body(&accept_body(body)?)?;
    let message_id = state.contacts.save_message(request).await?;
    Ok(Json(ContactResponse {
        success: true,
        message_id,
        message: CONTACT_ACK,
    }))
}
