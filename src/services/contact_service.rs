//! Validates and stores contact-form messages.

use crate::{
    models::contact::{CONTACT_STATUS_NEW, ContactMessage},
    services::{
        ServiceResult, ids,
        store::RecordStore,
        validation::{ValidationError, validate_message_body},
    },
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

/// Body of `POST /contactMessage`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Clone)]
pub struct ContactService {
    store: Arc<dyn RecordStore>,
}

impl ContactService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Validate and persist one message; returns its id.
    pub async fn save_message(&self, request: ContactRequest) -> ServiceResult<String> {
        let message = validate_contact(request, Utc::now())?;
        self.store.put_contact_message(&message).await?;
        info!(message_id = %message.message_id, "contact message saved");
        Ok(message.message_id)
    }
}

pub fn validate_contact(request: ContactRequest, now: DateTime<Utc>) -> ServiceResult<ContactMessage> {
    let present = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
    let (Some(name), Some(email), Some(phone), Some(message)) = (
        present(request.name),
        present(request.email),
        present(request.phone),
        present(request.message),
    ) else {
        return Err(ValidationError::Missing(
            "Missing required fields: name, email, phone, message".into(),
        )
        .into());
    };

    let message = validate_message_body(&message)?;

    Ok(ContactMessage {
        message_id: ids::message_id(now),
        name: name.trim().to_string(),
        email: email.trim().to_string(),
        phone: phone.trim().to_string(),
        message,
        created_at: now,
        status: CONTACT_STATUS_NEW.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(message: &str) -> ContactRequest {
        ContactRequest {
            name: Some("Ravi".into()),
            email: Some("ravi@example.com".into()),
            phone: Some("9876543210".into()),
            message: Some(message.into()),
        }
    }

    #[test]
    fn builds_new_message() {
        let msg = validate_contact(request("  Do you ship to Pune?  "), Utc::now()).unwrap();
        assert_eq!(msg.status, "new");
        assert_eq!(msg.message, "Do you ship to Pune?");
        assert!(msg.message_id.starts_with("msg_"));
    }

    #[test]
    fn missing_fields_are_listed() {
        let mut req = request("Do you ship to Pune?");
        req.phone = Some("   ".into());
        let err = validate_contact(req, Utc::now()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required fields: name, email, phone, message"
        );
    }

    #[test]
    fn short_and_long_messages_are_rejected() {
        let err = validate_contact(request("hello"), Utc::now()).unwrap_err();
        assert_eq!(err.to_string(), "Message must be at least 10 characters long");

        let err = validate_contact(request(&"x".repeat(1001)), Utc::now()).unwrap_err();
        assert_eq!(err.to_string(), "Message cannot exceed 1000 characters");
    }
}
