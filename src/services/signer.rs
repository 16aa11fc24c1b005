//! Presigned upload URL issuance.

use async_trait::async_trait;
use aws_sdk_s3::{Client, presigning::PresigningConfig};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SignerError {
    #[error("invalid presigning configuration: {0}")]
    Config(String),
    #[error("failed to sign upload URL: {0}")]
    Signing(String),
}

/// Issues a URL that allows exactly one PUT of `key` with `content_type`.
#[async_trait]
pub trait UploadSigner: Send + Sync {
    async fn presign_put(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> Result<String, SignerError>;
}

/// SigV4 presigner backed by the S3 SDK client.
#[derive(Clone)]
pub struct S3Signer {
    client: Client,
}

impl S3Signer {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl UploadSigner for S3Signer {
    async fn presign_put(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> Result<String, SignerError> {
        let presigning =
            PresigningConfig::expires_in(expires_in).map_err(|e| SignerError::Config(e.to_string()))?;

        let request = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type(content_type)
            .presigned(presigning)
            .await
            .map_err(|e| SignerError::Signing(e.to_string()))?;

        Ok(request.uri().to_string())
    }
}
