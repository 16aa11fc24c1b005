use crate::{
    config::AppConfig,
    services::{
        contact_service::ContactService, order_service::OrderService,
        presign_service::PresignService, signer::UploadSigner, store::RecordStore,
    },
};
use std::sync::Arc;

/// Shared state handed to every handler. Cheap to clone; nothing in it is
/// mutated after start-up.
#[derive(Clone)]
pub struct AppState {
    pub presign: PresignService,
    pub orders: OrderService,
    pub contacts: ContactService,
    pub store: Arc<dyn RecordStore>,
    pub bucket_configured: bool,
}

impl AppState {
    pub fn new(
        cfg: &AppConfig,
        store: Arc<dyn RecordStore>,
        signer: Arc<dyn UploadSigner>,
    ) -> Self {
        Self {
            presign: PresignService::new(signer, cfg),
            orders: OrderService::new(store.clone(), cfg),
            contacts: ContactService::new(store.clone()),
            store,
            bucket_configured: cfg.bucket_name.is_some(),
        }
    }
}
