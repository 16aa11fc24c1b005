//! Mints presigned photo uploads.

use crate::{
    config::AppConfig,
    models::photo::{PresignRequest, PresignedUpload},
    services::{
        ServiceError, ServiceResult,
        signer::UploadSigner,
        validation::{
            ValidationError, bucket_host, sanitize_file_name, validate_file_name,
            validate_file_type,
        },
    },
};
use chrono::{DateTime, Utc};
use std::{sync::Arc, time::Duration};
use tracing::info;

#[derive(Clone)]
pub struct PresignService {
    signer: Arc<dyn UploadSigner>,
    bucket: Option<String>,
    region: String,
    folder_prefix: String,
    ttl: Duration,
}

impl PresignService {
    pub fn new(signer: Arc<dyn UploadSigner>, cfg: &AppConfig) -> Self {
        Self {
            signer,
            bucket: cfg.bucket_name.clone(),
            region: cfg.region.clone(),
            folder_prefix: cfg.folder_prefix.clone(),
            ttl: cfg.presign_ttl,
        }
    }

    /// Validate the request, reserve a key and sign a PUT URL for it.
    ///
    /// Nothing is written to the bucket here; the object appears only when
    /// the client performs the upload.
    pub async fn presign(&self, request: PresignRequest) -> ServiceResult<PresignedUpload> {
        self.presign_at(request, Utc::now()).await
    }

    pub async fn presign_at(
        &self,
        request: PresignRequest,
        now: DateTime<Utc>,
    ) -> ServiceResult<PresignedUpload> {
        let (Some(file_name), Some(file_type)) = (request.file_name, request.file_type) else {
            return Err(ValidationError::Missing("Missing fileName or fileType".into()).into());
        };
        validate_file_name(&file_name)?;
        validate_file_type(&file_type)?;

        let bucket = self
            .bucket
            .as_deref()
            .ok_or(ServiceError::Misconfigured("S3 bucket name is not configured"))?;

        let key = object_key(&self.folder_prefix, now, &file_name);
        let url = self
            .signer
            .presign_put(bucket, &key, &file_type, self.ttl)
            .await?;
        let file_url = public_url(bucket, &self.region, &key);

        info!(key = %key, content_type = %file_type, "issued presigned upload");
        Ok(PresignedUpload { url, key, file_url })
    }
}

/// `<prefix><millis>-<sanitized name>`
pub fn object_key(folder_prefix: &str, now: DateTime<Utc>, file_name: &str) -> String {
    format!(
        "{}{}-{}",
        folder_prefix,
        now.timestamp_millis(),
        sanitize_file_name(file_name)
    )
}

pub fn public_url(bucket: &str, region: &str, key: &str) -> String {
    format!("https://{}/{}", bucket_host(bucket, region), key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::Args, services::signer::SignerError};
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSigner {
        calls: Mutex<Vec<(String, String, String, Duration)>>,
        fail: bool,
    }

    #[async_trait]
    impl UploadSigner for RecordingSigner {
        async fn presign_put(
            &self,
            bucket: &str,
            key: &str,
            content_type: &str,
            expires_in: Duration,
        ) -> Result<String, SignerError> {
            self.calls.lock().expect("poisoned mutex").push((
                bucket.into(),
                key.into(),
                content_type.into(),
                expires_in,
            ));
            if self.fail {
                return Err(SignerError::Signing("no credentials".into()));
            }
            Ok(format!("https://{}.s3.amazonaws.com/{}?X-Amz-Signature=abc", bucket, key))
        }
    }

    fn config(bucket: Option<&str>) -> AppConfig {
        let args = Args {
            bucket: bucket.map(str::to_string),
            ..Args::default()
        };
        AppConfig::from_sources(args, |_| None).unwrap().0
    }

    fn request(name: &str, kind: &str) -> PresignRequest {
        PresignRequest {
            file_name: Some(name.into()),
            file_type: Some(kind.into()),
        }
    }

    #[tokio::test]
    async fn issues_key_url_and_public_url() {
        let signer = Arc::new(RecordingSigner::default());
        let service = PresignService::new(signer.clone(), &config(Some("shop-uploads")));
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap();

        let upload = service
            .presign_at(request("me.jpg", "image/jpeg"), now)
            .await
            .unwrap();

        assert_eq!(upload.key, "user-photos/1740823200000-me.jpg");
        assert_eq!(
            upload.file_url,
            "https://shop-uploads.s3.us-east-1.amazonaws.com/user-photos/1740823200000-me.jpg"
        );
        let calls = signer.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "shop-uploads");
        assert_eq!(calls[0].1, upload.key);
        assert_eq!(calls[0].2, "image/jpeg");
        assert_eq!(calls[0].3, Duration::from_secs(300));
    }

    #[test]
    fn public_urls_pass_the_order_url_check() {
        let url = public_url("shop-uploads", "eu-west-1", "user-photos/1-me.jpg");
        assert_eq!(
            url,
            "https://shop-uploads.s3.eu-west-1.amazonaws.com/user-photos/1-me.jpg"
        );
        assert!(
            crate::services::validation::validate_photo_url(&url, "shop-uploads", "eu-west-1")
                .is_ok()
        );
        assert!(
            crate::services::validation::validate_photo_url(&url, "shop-uploads", "us-east-1")
                .is_err()
        );
    }

    #[tokio::test]
    async fn file_names_are_sanitized_into_the_key() {
        let signer = Arc::new(RecordingSigner::default());
        let service = PresignService::new(signer, &config(Some("shop-uploads")));
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap();

        let upload = service
            .presign_at(request("my photo (1).png", "image/png"), now)
            .await
            .unwrap();
        assert_eq!(upload.key, "user-photos/1740823200000-my_photo__1_.png");
    }

    #[tokio::test]
    async fn traversal_is_rejected_before_signing() {
        let signer = Arc::new(RecordingSigner::default());
        let service = PresignService::new(signer.clone(), &config(Some("shop-uploads")));

        for name in ["../me.jpg", "..", "a/b.jpg", "a\\b.jpg"] {
            let err = service
                .presign(request(name, "image/jpeg"))
                .await
                .unwrap_err();
            assert!(matches!(err, ServiceError::Validation(_)), "{}", name);
        }
        assert!(signer.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_fields_and_bad_types_are_validation_errors() {
        let signer = Arc::new(RecordingSigner::default());
        let service = PresignService::new(signer.clone(), &config(Some("shop-uploads")));

        let err = service
            .presign(PresignRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Missing fileName or fileType");

        let err = service
            .presign(request("me.gif", "image/gif"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Validation(ValidationError::UnsupportedFileType(_))
        ));
        assert!(signer.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_bucket_and_signing_failures_are_server_errors() {
        let service = PresignService::new(Arc::new(RecordingSigner::default()), &config(None));
        let err = service
            .presign(request("me.jpg", "image/jpeg"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Misconfigured(_)));

        let failing = Arc::new(RecordingSigner {
            fail: true,
            ..RecordingSigner::default()
        });
        let service = PresignService::new(failing, &config(Some("shop-uploads")));
        let err = service
            .presign(request("me.jpg", "image/jpeg"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Signer(_)));
    }
}
