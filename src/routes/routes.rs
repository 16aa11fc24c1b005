//! Defines routes for the storefront order API.
//!
//! ## Structure
//! - **Workflow endpoints**
//!   - `POST /presign`        -> presigned photo upload URL
//!   - `POST /create-order`   -> validate and store an order
//!   - `POST /contactMessage` -> validate and store a contact message
//!
//! - **Probes**
//!   - `GET /healthz`, `GET /readyz`
//!
//! Browser callers are admitted by the CORS layer built from `allowed_origins`.

use crate::{
    config::AppConfig,
    handlers::{
        contact_handlers::save_contact_message,
        health_handlers::{healthz, readyz},
        order_handlers::create_order,
        presign_handlers::presign_upload,
    },
    services::validation::MAX_ORDER_BODY_BYTES,
    state::AppState,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

/// Build the route table. The router carries `AppState` to all handlers.
pub fn routes() -> Router<AppState> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // upload + order workflow
        .route("/presign", post(presign_upload))
        .route("/create-order", post(create_order))
        .route("/contactMessage", post(save_contact_message))
}

/// Routes plus tracing and CORS layers, with state attached.
///
/// Every endpoint takes a small JSON body, so one body limit covers them all.
pub fn app(cfg: &AppConfig, state: AppState) -> Router {
    routes()
        .layer(DefaultBodyLimit::max(MAX_ORDER_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&cfg.allowed_origins))
        .with_state(state)
}

/// CORS for `POST` + preflight with a JSON body. `*` admits any origin.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    if origins.iter().any(|o| o == "*") {
        return base.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("ignoring invalid CORS origin `{}`", origin);
                None
            }
        })
        .collect();
    base.allow_origin(AllowOrigin::list(allowed))
}
