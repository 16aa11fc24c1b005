//! DynamoDB-backed `RecordStore`.
//!
//! Items use the camelCase attribute names the storefront has always written
//! (`orderId`, `fullName`, `photoS3Key`, ...); timestamps are RFC 3339 strings.

use crate::{
    models::{
        contact::ContactMessage,
        order::{Order, OrderStatus},
    },
    services::store::{RecordStore, StoreError, StoreResult},
};
use async_trait::async_trait;
use aws_sdk_dynamodb::{Client, types::AttributeValue};
use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::HashMap;

/// Secondary index (`email` hash, `createdAt` range) on the orders table.
pub const ORDERS_BY_EMAIL_INDEX: &str = "email-createdAt-index";

type Item = HashMap<String, AttributeValue>;

#[derive(Clone)]
pub struct DynamoStore {
    client: Client,
    orders_table: String,
    contact_table: String,
}

impl DynamoStore {
    pub fn new(
        client: Client,
        orders_table: impl Into<String>,
        contact_table: impl Into<String>,
    ) -> Self {
        Self {
            client,
            orders_table: orders_table.into(),
            contact_table: contact_table.into(),
        }
    }
}

#[async_trait]
impl RecordStore for DynamoStore {
    async fn put_order(&self, order: &Order) -> StoreResult<()> {
        let result = self
            .client
            .put_item()
            .table_name(&self.orders_table)
            .set_item(Some(order_to_item(order)))
            .condition_expression("attribute_not_exists(orderId)")
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_conditional_check_failed_exception()) =>
            {
                Err(StoreError::AlreadyExists(order.order_id.clone()))
            }
            Err(err) => Err(StoreError::Backend(format!(
                "put_item on {}: {}",
                self.orders_table, err
            ))),
        }
    }

    async fn put_contact_message(&self, message: &ContactMessage) -> StoreResult<()> {
        let result = self
            .client
            .put_item()
            .table_name(&self.contact_table)
            .set_item(Some(contact_to_item(message)))
            .condition_expression("attribute_not_exists(messageId)")
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_conditional_check_failed_exception()) =>
            {
                Err(StoreError::AlreadyExists(message.message_id.clone()))
            }
            Err(err) => Err(StoreError::Backend(format!(
                "put_item on {}: {}",
                self.contact_table, err
            ))),
        }
    }

    async fn get_order(&self, order_id: &str) -> StoreResult<Option<Order>> {
        let output = self
            .client
            .get_item()
            .table_name(&self.orders_table)
            .key("orderId", AttributeValue::S(order_id.to_string()))
            .send()
            .await
            .map_err(|err| {
                StoreError::Backend(format!("get_item on {}: {}", self.orders_table, err))
            })?;

        output.item().map(item_to_order).transpose()
    }

    async fn orders_by_email(&self, email: &str) -> StoreResult<Vec<Order>> {
        let mut orders = Vec::new();
        let mut start_key: Option<Item> = None;
        loop {
            let output = self
                .client
                .query()
                .table_name(&self.orders_table)
                .index_name(ORDERS_BY_EMAIL_INDEX)
                .key_condition_expression("email = :email")
                .expression_attribute_values(":email", AttributeValue::S(email.to_string()))
                .scan_index_forward(false)
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|err| {
                    StoreError::Backend(format!("query on {}: {}", self.orders_table, err))
                })?;

            for item in output.items() {
                orders.push(item_to_order(item)?);
            }

            match output.last_evaluated_key() {
                Some(key) if !key.is_empty() => start_key = Some(key.clone()),
                _ => break,
            }
        }
        Ok(orders)
    }

    async fn ping(&self) -> StoreResult<()> {
        self.client
            .describe_table()
            .table_name(&self.orders_table)
            .send()
            .await
            .map(|_| ())
            .map_err(|err| {
                StoreError::Backend(format!("describe_table {}: {}", self.orders_table, err))
            })
    }
}

fn timestamp(value: DateTime<Utc>) -> AttributeValue {
    AttributeValue::S(value.to_rfc3339_opts(SecondsFormat::Millis, true))
}

fn order_to_item(order: &Order) -> Item {
    let mut item = HashMap::new();
    let mut put = |name: &str, value: &str| {
        item.insert(name.to_string(), AttributeValue::S(value.to_string()));
    };
    put("orderId", &order.order_id);
    put("fullName", &order.full_name);
    put("email", &order.email);
    put("phone", &order.phone);
    put("streetAddress", &order.street_address);
    put("city", &order.city);
    put("state", &order.state);
    put("zipCode", &order.zip_code);
    put("photoS3Key", &order.photo_s3_key);
    put("photoS3Url", &order.photo_s3_url);
    put("status", order.status.as_str());
    item.insert("createdAt".into(), timestamp(order.created_at));
    item.insert("updatedAt".into(), timestamp(order.updated_at));
    item
}

fn contact_to_item(message: &ContactMessage) -> Item {
    let mut item = HashMap::new();
    let mut put = |name: &str, value: &str| {
        item.insert(name.to_string(), AttributeValue::S(value.to_string()));
    };
    put("messageId", &message.message_id);
    put("name", &message.name);
    put("email", &message.email);
    put("phone", &message.phone);
    put("message", &message.message);
    put("status", &message.status);
    item.insert("createdAt".into(), timestamp(message.created_at));
    item
}

fn string_attr(item: &Item, name: &str) -> StoreResult<String> {
    item.get(name)
        .and_then(|v| v.as_s().ok())
        .cloned()
        .ok_or_else(|| StoreError::Corrupt(format!("missing string attribute `{}`", name)))
}

fn time_attr(item: &Item, name: &str) -> StoreResult<DateTime<Utc>> {
    let raw = string_attr(item, name)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|err| StoreError::Corrupt(format!("attribute `{}`: {}", name, err)))
}

fn item_to_order(item: &Item) -> StoreResult<Order> {
    let created_at = time_attr(item, "createdAt")?;
    // Items written before `updatedAt` existed only carry `createdAt`.
    let updated_at = match item.get("updatedAt") {
        Some(_) => time_attr(item, "updatedAt")?,
        None => created_at,
    };
    let status_raw = string_attr(item, "status")?;
    let status = OrderStatus::parse(&status_raw)
        .ok_or_else(|| StoreError::Corrupt(format!("unknown order status `{}`", status_raw)))?;

    Ok(Order {
        order_id: string_attr(item, "orderId")?,
        full_name: string_attr(item, "fullName")?,
        email: string_attr(item, "email")?,
        phone: string_attr(item, "phone")?,
        street_address: string_attr(item, "streetAddress")?,
        city: string_attr(item, "city")?,
        state: string_attr(item, "state")?,
        zip_code: string_attr(item, "zipCode")?,
        photo_s3_key: string_attr(item, "photoS3Key")?,
        photo_s3_url: string_attr(item, "photoS3Url")?,
        created_at,
        updated_at,
        status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::order::OrderDetails;
    use chrono::TimeZone;

    fn sample() -> Order {
        Order::new(
            "ORDER-1740823200000-ABC123DEF".into(),
            OrderDetails {
                full_name: "Asha Rao".into(),
                email: "asha@example.com".into(),
                phone: "9876543210".into(),
                street_address: "12 MG Road".into(),
                city: "Bengaluru".into(),
                state: "Karnataka".into(),
                zip_code: "560001".into(),
            },
            "user-photos/1740823199000-me.jpg".into(),
            "https://b.s3.us-east-1.amazonaws.com/user-photos/1740823199000-me.jpg".into(),
            Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap(),
        )
    }

    #[test]
    fn order_items_use_storefront_attribute_names() {
        let item = order_to_item(&sample());
        assert_eq!(
            item.get("orderId").and_then(|v| v.as_s().ok()).map(String::as_str),
            Some("ORDER-1740823200000-ABC123DEF")
        );
        assert_eq!(
            item.get("status").and_then(|v| v.as_s().ok()).map(String::as_str),
            Some("pending")
        );
        assert_eq!(
            item.get("createdAt").and_then(|v| v.as_s().ok()).map(String::as_str),
            Some("2025-03-01T10:00:00.000Z")
        );
        assert!(item.contains_key("photoS3Key"));
        assert!(item.contains_key("photoS3Url"));
        assert_eq!(item.len(), 13);
    }

    #[test]
    fn items_decode_back_into_orders() {
        let order = sample();
        assert_eq!(item_to_order(&order_to_item(&order)).unwrap(), order);
    }

    #[test]
    fn legacy_items_without_updated_at_decode() {
        let mut item = order_to_item(&sample());
        item.remove("updatedAt");
        let order = item_to_order(&item).unwrap();
        assert_eq!(order.updated_at, order.created_at);
    }

    #[test]
    fn malformed_items_are_reported() {
        let mut item = order_to_item(&sample());
        item.insert("status".into(), AttributeValue::S("shipped".into()));
        assert!(matches!(item_to_order(&item), Err(StoreError::Corrupt(_))));

        item.remove("email");
        assert!(matches!(item_to_order(&item), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn contact_items_carry_every_field() {
        let message = ContactMessage {
            message_id: "msg_1_abc".into(),
            name: "Ravi".into(),
            email: "ravi@example.com".into(),
            phone: "9876543210".into(),
            message: "Do you ship to Pune?".into(),
            created_at: Utc::now(),
            status: "new".into(),
        };
        let item = contact_to_item(&message);
        for name in [
            "messageId",
            "name",
            "email",
            "phone",
            "message",
            "status",
            "createdAt",
        ] {
            assert!(item.contains_key(name), "missing {}", name);
        }
    }
}
