//! Record identifiers: a millisecond timestamp plus a random suffix.
//!
//! Collisions are unlikely but not impossible; stores refuse to overwrite an
//! existing id rather than relying on uniqueness here.

use chrono::{DateTime, Utc};
use uuid::Uuid;

const SUFFIX_LEN: usize = 9;

fn random_suffix() -> String {
    let mut hex = Uuid::new_v4().simple().to_string();
    hex.truncate(SUFFIX_LEN);
    hex
}

/// `ORDER-<millis>-<9 uppercase hex chars>`
pub fn order_id(now: DateTime<Utc>) -> String {
    format!(
        "ORDER-{}-{}",
        now.timestamp_millis(),
        random_suffix().to_uppercase()
    )
}

/// `msg_<millis>_<9 lowercase hex chars>`
pub fn message_id(now: DateTime<Utc>) -> String {
    format!("msg_{}_{}", now.timestamp_millis(), random_suffix())
}
