//! Record persistence seam.
//!
//! A `RecordStore` writes one item per call and never updates an existing
//! item. Backends: `sqlite_store::SqliteStore` and
//! `dynamo_store::DynamoStore`.

use crate::models::{contact::ContactMessage, order::Order};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record `{0}` already exists")]
    AlreadyExists(String),
    #[error("stored record is malformed: {0}")]
    Corrupt(String),
    #[error("store backend error: {0}")]
    Backend(String),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert one order. Fails with `AlreadyExists` instead of overwriting.
    async fn put_order(&self, order: &Order) -> StoreResult<()>;

    /// Insert one contact message. Fails with `AlreadyExists` instead of overwriting.
    async fn put_contact_message(&self, message: &ContactMessage) -> StoreResult<()>;

    async fn get_order(&self, order_id: &str) -> StoreResult<Option<Order>>;

    /// Orders placed with `email`, newest first.
    async fn orders_by_email(&self, email: &str) -> StoreResult<Vec<Order>>;

    /// Cheap connectivity check used by the readiness probe.
    async fn ping(&self) -> StoreResult<()>;
}
