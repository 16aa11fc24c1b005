//! Validates order submissions and writes one order record each.

use crate::{
    config::AppConfig,
    models::order::Order,
    services::{
        ServiceError, ServiceResult, ids,
        store::RecordStore,
        validation::{
            MAX_ORDER_BODY_BYTES, ValidationError, validate_order_details, validate_photo_key,
            validate_photo_url,
        },
    },
};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn RecordStore>,
    bucket: Option<String>,
    region: String,
    folder_prefix: String,
}

impl OrderService {
    pub fn new(store: Arc<dyn RecordStore>, cfg: &AppConfig) -> Self {
        Self {
            store,
            bucket: cfg.bucket_name.clone(),
            region: cfg.region.clone(),
            folder_prefix: cfg.folder_prefix.clone(),
        }
    }

    /// Validate a raw `POST /create-order` body and persist the order.
    ///
    /// Returns the new order id. Identical submissions create separate
    /// orders; there is no idempotency key.
    pub async fn create_order(&self, body: &[u8]) -> ServiceResult<String> {
        let order = self.validate(body, Utc::now())?;
        self.store.put_order(&order).await?;
        info!(order_id = %order.order_id, photo_key = %order.photo_s3_key, "order created");
        Ok(order.order_id)
    }

    /// Run the full validation sequence and build the record to write.
    ///
    /// Checks run in a fixed order and stop at the first violation: body
    /// size, required parts, customer fields, photo key, photo URL.
    pub fn validate(&self, body: &[u8], now: DateTime<Utc>) -> ServiceResult<Order> {
        if body.len() > MAX_ORDER_BODY_BYTES {
            return Err(ValidationError::PayloadTooLarge {
                limit: MAX_ORDER_BODY_BYTES,
            }
            .into());
        }
        let payload: Value =
            serde_json::from_slice(body).map_err(|_| ValidationError::MalformedBody)?;
        let Some(payload) = payload.as_object() else {
            return Err(ValidationError::MalformedBody.into());
        };

        let details = payload.get("orderDetails").filter(|v| !v.is_null());
        let photo_key = non_empty_str(payload.get("photoS3Key"));
        let photo_url = non_empty_str(payload.get("photoS3Url"));
        let (Some(details), Some(photo_key), Some(photo_url)) = (details, photo_key, photo_url)
        else {
            return Err(
                ValidationError::Missing("Missing order details or photo info".into()).into(),
            );
        };

        let Some(details) = details.as_object() else {
            return Err(ValidationError::Missing("orderDetails must be an object".into()).into());
        };
        let details = validate_order_details(details)?;

        validate_photo_key(photo_key, &self.folder_prefix)?;

        let bucket = self
            .bucket
            .as_deref()
            .ok_or(ServiceError::Misconfigured("S3 bucket name is not configured"))?;
        validate_photo_url(photo_url, bucket, &self.region)?;

        // Any top-level `status` the caller sent is ignored; new orders are
        // always pending.
        Ok(Order::new(
            ids::order_id(now),
            details,
            photo_key.to_string(),
            photo_url.to_string(),
            now,
        ))
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Args,
        models::order::OrderStatus,
        services::{sqlite_store::SqliteStore, store::StoreError},
    };
    use serde_json::json;

    fn config() -> AppConfig {
        let args = Args {
            bucket: Some("shop-uploads".into()),
            ..Args::default()
        };
        AppConfig::from_sources(args, |_| None).unwrap().0
    }

    async fn service() -> (OrderService, SqliteStore) {
        let store = SqliteStore::connect("sqlite::memory:").await.unwrap();
        store.migrate().await.unwrap();
        (OrderService::new(Arc::new(store.clone()), &config()), store)
    }

    fn body() -> Value {
        json!({
            "orderDetails": {
                "fullName": "Asha Rao",
                "email": "asha@example.com",
                "phone": "+91 98765 43210",
                "streetAddress": "12 MG Road",
                "city": "Bengaluru",
                "state": "Karnataka",
                "zipCode": "560001"
            },
            "photoS3Key": "user-photos/1740823200000-me.jpg",
            "photoS3Url": "https://shop-uploads.s3.us-east-1.amazonaws.com/user-photos/1740823200000-me.jpg"
        })
    }

    async fn order_count(store: &SqliteStore) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&*store.db)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn valid_order_is_written_as_pending() {
        let (service, store) = service().await;
        let mut payload = body();
        payload["status"] = json!("completed");

        let id = service
            .create_order(payload.to_string().as_bytes())
            .await
            .unwrap();

        let order = store.get_order(&id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.created_at, order.updated_at);
        assert_eq!(order.email, "asha@example.com");
    }

    #[tokio::test]
    async fn oversized_body_is_rejected_first() {
        let (service, store) = service().await;
        let mut payload = body();
        payload["padding"] = json!("x".repeat(MAX_ORDER_BODY_BYTES));
        let err = service
            .create_order(payload.to_string().as_bytes())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Validation(ValidationError::PayloadTooLarge { .. })
        ));
        assert_eq!(order_count(&store).await, 0);
    }

    #[tokio::test]
    async fn missing_parts_are_rejected() {
        let (service, _store) = service().await;
        for part in ["orderDetails", "photoS3Key", "photoS3Url"] {
            let mut payload = body();
            payload.as_object_mut().unwrap().remove(part);
            let err = service
                .validate(payload.to_string().as_bytes(), Utc::now())
                .unwrap_err();
            assert_eq!(err.to_string(), "Missing order details or photo info");
        }

        let err = service.validate(b"[1,2]", Utc::now()).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Validation(ValidationError::MalformedBody)
        ));
        let err = service.validate(b"{not json", Utc::now()).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Validation(ValidationError::MalformedBody)
        ));
    }

    #[tokio::test]
    async fn photo_key_and_url_are_checked() {
        let (service, _store) = service().await;

        let mut payload = body();
        payload["photoS3Key"] = json!("user-photos/../admin/x.jpg");
        assert!(matches!(
            service.validate(payload.to_string().as_bytes(), Utc::now()),
            Err(ServiceError::Validation(ValidationError::InvalidPhotoKey(_)))
        ));

        let mut payload = body();
        payload["photoS3Url"] = json!("https://attacker.example/me.jpg");
        assert!(matches!(
            service.validate(payload.to_string().as_bytes(), Utc::now()),
            Err(ServiceError::Validation(ValidationError::InvalidPhotoUrl(_)))
        ));
    }

    #[tokio::test]
    async fn store_failures_surface_as_store_errors() {
        let (service, store) = service().await;
        store.db.close().await;
        let err = service
            .create_order(body().to_string().as_bytes())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Store(StoreError::Sqlx(_))));
    }
}
