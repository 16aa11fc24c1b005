use anyhow::Result;
use figurine_orders::{
    config::{AppConfig, RunMode, StoreBackend},
    routes::routes,
    services::{
        dynamo_store::DynamoStore, signer::S3Signer, sqlite_store::SqliteStore,
        store::RecordStore,
    },
    state::AppState,
};
use std::{io::ErrorKind, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // --- Parse config + run mode ---
    let (cfg, mode) = AppConfig::from_env_and_args()?;

    tracing::info!("Starting figurine-orders with config: {:?}", cfg);
    if cfg.bucket_name.is_none() {
        tracing::warn!("S3_BUCKET_NAME is not set; presign and create-order will fail");
    }

    // --- AWS clients (region from config, credentials from the default chain) ---
    let aws = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(cfg.region.clone()))
        .load()
        .await;

    // --- Record store ---
    let store: Arc<dyn RecordStore> = match cfg.store {
        StoreBackend::Sqlite => {
            tracing::debug!("Connecting using raw URL => {}", cfg.database_url);
            let sqlite = SqliteStore::connect(&cfg.database_url).await?;
            if mode == RunMode::Migrate {
                sqlite.migrate().await?;
                tracing::info!("Database migration complete.");
                return Ok(()); // exit after migration
            }
            Arc::new(sqlite)
        }
        StoreBackend::Dynamodb => {
            if mode == RunMode::Migrate {
                anyhow::bail!("--migrate only applies to the sqlite store");
            }
            Arc::new(DynamoStore::new(
                aws_sdk_dynamodb::Client::new(&aws),
                cfg.orders_table.clone(),
                cfg.contact_table.clone(),
            ))
        }
    };

    // --- Operator lookups ---
    match &mode {
        RunMode::LookupOrder(order_id) => {
            match store.get_order(order_id).await? {
                Some(order) => println!("{}", serde_json::to_string_pretty(&order)?),
                None => anyhow::bail!("order `{}` not found", order_id),
            }
            return Ok(());
        }
        RunMode::OrdersFor(email) => {
            let orders = store.orders_by_email(email).await?;
            println!("{}", serde_json::to_string_pretty(&orders)?);
            return Ok(());
        }
        RunMode::Serve | RunMode::Migrate => {}
    }

    // --- Build router ---
    let signer = Arc::new(S3Signer::new(aws_sdk_s3::Client::new(&aws)));
    let state = AppState::new(&cfg, store, signer);
    let app = routes::app(&cfg, state);

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
