//! Represents a figurine order and the customer fields it carries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Customer and shipping details submitted with an order.
///
/// Field names follow the wire format (`fullName`, `zipCode`, ...).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetails {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

/// Lifecycle status of an order.
///
/// This service only ever writes `Pending`; later transitions belong to
/// back-office tooling that shares the same table.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(OrderStatus::Pending),
            "processing" => Some(OrderStatus::Processing),
            "completed" => Some(OrderStatus::Completed),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }
}

/// A persisted order record, one row/item per order.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// `ORDER-<millis>-<suffix>`; primary key of the orders table.
    pub order_id: String,

    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,

    /// Object key of the uploaded photo (`user-photos/<millis>-<name>`).
    #[serde(rename = "photoS3Key")]
    pub photo_s3_key: String,

    /// Public URL of the uploaded photo.
    #[serde(rename = "photoS3Url")]
    pub photo_s3_url: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub status: OrderStatus,
}

impl Order {
    /// Build a fresh `Pending` order from validated input.
    pub fn new(
        order_id: String,
        details: OrderDetails,
        photo_s3_key: String,
        photo_s3_url: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            order_id,
            full_name: details.full_name,
            email: details.email,
            phone: details.phone,
            street_address: details.street_address,
            city: details.city,
            state: details.state,
            zip_code: details.zip_code,
            photo_s3_key,
            photo_s3_url,
            created_at: now,
            updated_at: now,
            status: OrderStatus::Pending,
        }
    }
}
