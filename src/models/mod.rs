//! Core data models for the figurine order service.
//!
//! Records map to SQLite rows via `sqlx::FromRow` and to the camelCase JSON
//! shape the storefront sends and the managed table stores.

pub mod contact;
pub mod order;
pub mod photo;
