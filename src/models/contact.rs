//! Represents a message left through the contact form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Status written for every new contact message.
pub const CONTACT_STATUS_NEW: &str = "new";

/// A persisted contact message.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    /// `msg_<millis>_<suffix>`; primary key of the contact table.
    pub message_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    /// Message body, 10 to 1000 characters once trimmed.
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub status: String,
}
