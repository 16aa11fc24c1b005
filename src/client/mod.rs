//! Client side of the photo upload & order workflow.
//!
//! `UploadCoordinator` validates a local photo, obtains a presigned URL,
//! uploads the bytes straight to object storage and submits the order.
//! Progress and failures are published on a `NotificationBus`.

pub mod api_client;
pub mod notifications;
pub mod upload;
