pub mod contact_service;
pub mod dynamo_store;
pub mod ids;
pub mod order_service;
pub mod presign_service;
pub mod signer;
pub mod sqlite_store;
pub mod store;
pub mod validation;

use thiserror::Error;

/// Failure of a request-level operation.
///
/// Only `Validation` carries a message meant for the caller.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] validation::ValidationError),
    #[error(transparent)]
    Store(#[from] store::StoreError),
    #[error(transparent)]
    Signer(#[from] signer::SignerError),
    #[error("service misconfigured: {0}")]
    Misconfigured(&'static str),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
