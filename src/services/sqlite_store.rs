//! SQLite-backed `RecordStore` for local development and tests.

use crate::{
    models::{contact::ContactMessage, order::Order},
    services::store::{RecordStore, StoreError, StoreResult},
};
use async_trait::async_trait;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::{path::Path, str::FromStr, sync::Arc};
use tracing::debug;

const INIT_MIGRATION: &str = include_str!("../../migrations/0001_init.sql");

const ORDER_COLUMNS: &str = "order_id, full_name, email, phone, street_address, city, state, \
     zip_code, photo_s3_key, photo_s3_url, created_at, updated_at, status";

#[derive(Clone)]
pub struct SqliteStore {
    pub db: Arc<SqlitePool>,
}

impl SqliteStore {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Open (creating if needed) the database at `database_url`.
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let db_path = database_url
            .trim_start_matches("sqlite://")
            .trim_start_matches("sqlite:")
            .trim_start_matches("file:");
        debug!("Interpreted SQLite path => {}", db_path);

        if !db_path.starts_with(":memory:") {
            if let Some(parent) = Path::new(db_path).parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent).map_err(|err| {
                        StoreError::Backend(format!("creating {}: {}", parent.display(), err))
                    })?;
                    tracing::info!("Created missing directory {:?}", parent);
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let mut pool_options = SqlitePoolOptions::new().max_connections(5);
        if db_path.starts_with(":memory:") {
            // An in-memory database lives and dies with its single connection.
            pool_options = pool_options
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }
        let pool = pool_options.connect_with(options).await?;

        Ok(Self::new(Arc::new(pool)))
    }

    /// Run the embedded schema migration statement by statement.
    pub async fn migrate(&self) -> StoreResult<()> {
        let statements = INIT_MIGRATION
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        tracing::info!("Running {} migration statements...", statements.len());

        for stmt in statements {
            debug!("Executing migration SQL: {}", stmt);
            sqlx::query(stmt).execute(&*self.db).await?;
        }

        Ok(())
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn put_order(&self, order: &Order) -> StoreResult<()> {
        let result = sqlx::query(&format!(
            "INSERT INTO orders ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            ORDER_COLUMNS
        ))
        .bind(&order.order_id)
        .bind(&order.full_name)
        .bind(&order.email)
        .bind(&order.phone)
        .bind(&order.street_address)
        .bind(&order.city)
        .bind(&order.state)
        .bind(&order.zip_code)
        .bind(&order.photo_s3_key)
        .bind(&order.photo_s3_url)
        .bind(order.created_at)
        .bind(order.updated_at)
        .bind(order.status)
        .execute(&*self.db)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => {
                Err(StoreError::AlreadyExists(order.order_id.clone()))
            }
            Err(err) => Err(StoreError::Sqlx(err)),
        }
    }

    async fn put_contact_message(&self, message: &ContactMessage) -> StoreResult<()> {
        let result = sqlx::query(
            "INSERT INTO contact_messages
                 (message_id, name, email, phone, message, created_at, status)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&message.message_id)
        .bind(&message.name)
        .bind(&message.email)
        .bind(&message.phone)
        .bind(&message.message)
        .bind(message.created_at)
        .bind(&message.status)
        .execute(&*self.db)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => {
                Err(StoreError::AlreadyExists(message.message_id.clone()))
            }
            Err(err) => Err(StoreError::Sqlx(err)),
        }
    }

    async fn get_order(&self, order_id: &str) -> StoreResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {} FROM orders WHERE order_id = ?",
            ORDER_COLUMNS
        ))
        .bind(order_id)
        .fetch_optional(&*self.db)
        .await?;
        Ok(order)
    }

    async fn orders_by_email(&self, email: &str) -> StoreResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {} FROM orders WHERE email = ? ORDER BY created_at DESC, order_id DESC",
            ORDER_COLUMNS
        ))
        .bind(email)
        .fetch_all(&*self.db)
        .await?;
        Ok(orders)
    }

    async fn ping(&self) -> StoreResult<()> {
        match sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&*self.db)
            .await?
        {
            1 => Ok(()),
            v => Err(StoreError::Backend(format!("unexpected result: {}", v))),
        }
    }
}

/// Return true if SQLx error indicates a unique constraint violation.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.message().to_ascii_lowercase().contains("unique")
    )
}
