//! Photo upload & order submission service for a figurine storefront.
//!
//! The server half (`routes`, `handlers`, `services`) validates requests and
//! writes single records to the configured `RecordStore`; the `client` half
//! drives the staged upload against that server.

pub mod client;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
