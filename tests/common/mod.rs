#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::put,
};
use figurine_orders::{
    config::{AppConfig, Args},
    models::{contact::ContactMessage, order::Order},
    routes::routes,
    services::{
        signer::{SignerError, UploadSigner},
        store::{RecordStore, StoreError, StoreResult},
    },
    state::AppState,
};
use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicU16, AtomicUsize, Ordering},
    },
    time::Duration,
};
use tokio::net::TcpListener;

pub const BUCKET: &str = "shop-uploads";

pub fn test_config() -> AppConfig {
    let args = Args {
        bucket: Some(BUCKET.into()),
        ..Args::default()
    };
    AppConfig::from_sources(args, |_| None)
        .expect("default config should load")
        .0
}

/// In-memory store that records every write; can be told to fail.
#[derive(Default)]
pub struct RecordingStore {
    pub orders: Mutex<Vec<Order>>,
    pub contacts: Mutex<Vec<ContactMessage>>,
    pub fail: bool,
}

impl RecordingStore {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn orders(&self) -> Vec<Order> {
        self.orders.lock().expect("poisoned mutex").clone()
    }

    pub fn contacts(&self) -> Vec<ContactMessage> {
        self.contacts.lock().expect("poisoned mutex").clone()
    }
}

#[async_trait]
impl RecordStore for RecordingStore {
    async fn put_order(&self, order: &Order) -> StoreResult<()> {
        if self.fail {
            return Err(StoreError::Backend("table ido-orders unavailable".into()));
        }
        self.orders.lock().expect("poisoned mutex").push(order.clone());
        Ok(())
    }

    async fn put_contact_message(&self, message: &ContactMessage) -> StoreResult<()> {
        if self.fail {
            return Err(StoreError::Backend("table unavailable".into()));
        }
        self.contacts
            .lock()
            .expect("poisoned mutex")
            .push(message.clone());
        Ok(())
    }

    async fn get_order(&self, order_id: &str) -> StoreResult<Option<Order>> {
        Ok(self.orders().into_iter().find(|o| o.order_id == order_id))
    }

    async fn orders_by_email(&self, email: &str) -> StoreResult<Vec<Order>> {
        Ok(self.orders().into_iter().filter(|o| o.email == email).collect())
    }

    async fn ping(&self) -> StoreResult<()> {
        if self.fail {
            return Err(StoreError::Backend("unreachable".into()));
        }
        Ok(())
    }
}

/// Signer that points uploads at a local fake bucket and counts calls.
pub struct FakeSigner {
    pub upload_base: String,
    pub calls: AtomicUsize,
}

impl FakeSigner {
    pub fn new(upload_base: impl Into<String>) -> Self {
        Self {
            upload_base: upload_base.into(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UploadSigner for FakeSigner {
    async fn presign_put(
        &self,
        bucket: &str,
        key: &str,
        _content_type: &str,
        expires_in: Duration,
    ) -> Result<String, SignerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!(
            "{}/{}/{}?X-Amz-Expires={}",
            self.upload_base,
            bucket,
            key,
            expires_in.as_secs()
        ))
    }
}

async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server error");
    });
    format!("http://{}", addr)
}

/// Start the API on an ephemeral port and return its base URL.
pub async fn spawn_app(store: Arc<dyn RecordStore>, signer: Arc<dyn UploadSigner>) -> String {
    let cfg = test_config();
    let state = AppState::new(&cfg, store, signer);
    serve(routes::app(&cfg, state)).await
}

#[derive(Debug, Clone)]
pub struct ReceivedUpload {
    pub key: String,
    pub content_type: Option<String>,
    pub content_md5: Option<String>,
    pub body: Bytes,
}

/// Stand-in for the object store's presigned PUT endpoint.
#[derive(Clone, Default)]
pub struct FakeBucket {
    pub uploads: Arc<Mutex<Vec<ReceivedUpload>>>,
    /// Status to answer with; 0 means 200.
    pub status: Arc<AtomicU16>,
}

impl FakeBucket {
    pub fn uploads(&self) -> Vec<ReceivedUpload> {
        self.uploads.lock().expect("poisoned mutex").clone()
    }

    pub fn answer_with(&self, status: StatusCode) {
        self.status.store(status.as_u16(), Ordering::SeqCst);
    }
}

async fn receive_upload(
    State(bucket): State<FakeBucket>,
    Path((_bucket, key)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let status = match bucket.status.load(Ordering::SeqCst) {
        0 => StatusCode::OK,
        code => StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
    };
    if status.is_success() {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        bucket
            .uploads
            .lock()
            .expect("poisoned mutex")
            .push(ReceivedUpload {
                key,
                content_type: header("content-type"),
                content_md5: header("content-md5"),
                body,
            });
    }
    status
}

/// Start a fake bucket; returns its base URL and handle.
pub async fn spawn_bucket() -> (String, FakeBucket) {
    let bucket = FakeBucket::default();
    let app = Router::new()
        .route("/{bucket}/{*key}", put(receive_upload))
        .with_state(bucket.clone());
    (serve(app).await, bucket)
}

/// Base URL of a port nothing listens on.
pub async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{}", addr)
}

pub fn order_body(key: &str, url: &str) -> serde_json::Value {
    serde_json::json!({
        "orderDetails": {
            "fullName": "Asha Rao",
            "email": "asha@example.com",
            "phone": "+91 98765 43210",
            "streetAddress": "12 MG Road",
            "city": "Bengaluru",
            "state": "Karnataka",
            "zipCode": "560001"
        },
        "photoS3Key": key,
        "photoS3Url": url
    })
}

pub fn valid_order_body() -> serde_json::Value {
    order_body(
        "user-photos/1740823200000-me.jpg",
        "https://shop-uploads.s3.us-east-1.amazonaws.com/user-photos/1740823200000-me.jpg",
    )
}
