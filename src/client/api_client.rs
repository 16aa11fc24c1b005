//! HTTP client for the storefront API.

use crate::models::{order::OrderDetails, photo::PresignedUpload};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    /// The API answered `{success:false, error}`.
    #[error("{0}")]
    Rejected(String),
    #[error("Unexpected response from server: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct PresignBody<'a> {
    file_name: &'a str,
    file_type: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateOrderRequest<'a> {
    #[serde(rename = "orderDetails")]
    pub order_details: &'a OrderDetails,
    #[serde(rename = "photoS3Key")]
    pub photo_s3_key: &'a str,
    #[serde(rename = "photoS3Url")]
    pub photo_s3_url: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContactMessageRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    pub message: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateOrderReply {
    order_id: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ContactReply {
    pub message_id: String,
    pub message: String,
}

/// Calls `/presign`, `/create-order` and `/contactMessage` under `base_url`.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub async fn presign(
        &self,
        file_name: &str,
        file_type: &str,
    ) -> Result<PresignedUpload, ClientError> {
        self.post_json(
            "/presign",
            &PresignBody {
                file_name,
                file_type,
            },
        )
        .await
    }

    /// Returns the new order id.
    pub async fn create_order(&self, request: &CreateOrderRequest<'_>) -> Result<String, ClientError> {
        let reply: CreateOrderReply = self.post_json("/create-order", request).await?;
        Ok(reply.order_id)
    }

    pub async fn send_contact_message(
        &self,
        request: &ContactMessageRequest<'_>,
    ) -> Result<ContactReply, ClientError> {
        self.post_json("/contactMessage", request).await
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, ClientError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let response = self.http.post(&url).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;
        tracing::debug!(%url, %status, "api response");

        let value: Value = serde_json::from_str(&text).map_err(|_| {
            ClientError::InvalidResponse(format!("status {} with non-JSON body", status))
        })?;
        let value = unwrap_envelope(value)?;
        decode_reply(status, value)
    }
}

/// Serverless proxy integrations may hand back the whole
/// `{statusCode, headers, body:"<json>"}` envelope; unwrap it if present.
pub fn unwrap_envelope(value: Value) -> Result<Value, ClientError> {
    match (value.get("statusCode"), value.get("body")) {
        (Some(_), Some(Value::String(body))) => serde_json::from_str(body)
            .map_err(|e| ClientError::InvalidResponse(format!("envelope body: {}", e))),
        _ => Ok(value),
    }
}

fn decode_reply<R: DeserializeOwned>(status: StatusCode, value: Value) -> Result<R, ClientError> {
    if value.get("success").and_then(Value::as_bool) != Some(true) {
        let message = value
            .get("error")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));
        return Err(ClientError::Rejected(message));
    }
    serde_json::from_value(value).map_err(|e| ClientError::InvalidResponse(e.to_string()))
}
