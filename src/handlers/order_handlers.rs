//! `POST /create-order`: validate an order and write it to the orders table.

use crate::{errors::AppError, handlers::accept_body, state::AppState};
use axum::{
    Json,
    extract::{State, rejection::BytesRejection},
};
use bytes::Bytes;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub success: bool,
    pub order_id: String,
}

/// The raw body goes to the service so its size is checked before parsing.
/// Bodies past the router limit never reach it and are refused here.
pub async fn create_order(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<CreateOrderResponse>, AppError> {
    let body = accept_body(body)?;
    let order_id = state.orders.create_order(&body).await?;
    Ok(Json(CreateOrderResponse {
        success: true,
        order_id,
    }))
}
