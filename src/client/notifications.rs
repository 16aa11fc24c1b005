//! Typed publish/subscribe for user-facing notifications.
//!
//! A `NotificationBus` is created by the application and passed to whatever
//! publishes or renders notifications. Subscriptions end when the receiver is
//! dropped; the channel closes once every bus handle is dropped.

use chrono::Utc;
use serde::Serialize;
use std::time::Duration;
use tokio::sync::broadcast;
use uuid::Uuid;

pub const DEFAULT_DURATION: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub id: String,
    pub message: String,
    pub kind: NotificationKind,
    /// How long a renderer should show it; `None` means until dismissed.
    pub duration: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct NotificationBus {
    sender: broadcast::Sender<Notification>,
}

impl NotificationBus {
    /// `capacity` bounds how far a slow subscriber may lag before it starts
    /// missing notifications.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Publish to every current subscriber and return the notification id.
    /// Publishing with no subscribers is not an error.
    pub fn publish(
        &self,
        message: impl Into<String>,
        kind: NotificationKind,
        duration: Option<Duration>,
    ) -> String {
        let mut suffix = Uuid::new_v4().simple().to_string();
        suffix.truncate(8);
        let id = format!("{}-{}", Utc::now().timestamp_millis(), suffix);
        let notification = Notification {
            id: id.clone(),
            message: message.into(),
            kind,
            duration,
        };
        if self.sender.send(notification).is_err() {
            tracing::trace!("notification dropped: no subscribers");
        }
        id
    }

    pub fn success(&self, message: impl Into<String>) -> String {
        self.publish(message, NotificationKind::Success, Some(DEFAULT_DURATION))
    }

    pub fn error(&self, message: impl Into<String>) -> String {
        self.publish(message, NotificationKind::Error, Some(DEFAULT_DURATION))
    }

    pub fn info(&self, message: impl Into<String>) -> String {
        self.publish(message, NotificationKind::Info, Some(DEFAULT_DURATION))
    }

    pub fn warning(&self, message: impl Into<String>) -> String {
        self.publish(message, NotificationKind::Warning, Some(DEFAULT_DURATION))
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new(64)
    }
}
