//! Upload one photo through the storefront API and print its committed
//! reference. Optionally submits an order for it.

use anyhow::{Context, Result};
use clap::Parser;
use figurine_orders::{
    client::{
        api_client::ApiClient,
        notifications::{NotificationBus, NotificationKind},
        upload::{LocalPhoto, UploadCoordinator},
    },
    models::order::OrderDetails,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Upload a photo via a presigned URL")]
struct Args {
    /// Base URL of the storefront API (overrides FIGURINE_API_BASE_URL)
    #[arg(long, env = "FIGURINE_API_BASE_URL", default_value = "http://127.0.0.1:3000")]
    api_base: String,

    /// JSON file with orderDetails; when given, an order is submitted after upload
    #[arg(long)]
    order: Option<PathBuf>,

    /// Photo to upload (.jpg, .jpeg, .png, .heic, .heif)
    photo: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let details: Option<OrderDetails> = match &args.order {
        Some(path) => {
            let raw = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading {}", path.display()))?;
            Some(serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?)
        }
        None => None,
    };

    let bus = NotificationBus::default();
    let mut notifications = bus.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(n) = notifications.recv().await {
            match n.kind {
                NotificationKind::Error => tracing::error!("{}", n.message),
                NotificationKind::Warning => tracing::warn!("{}", n.message),
                NotificationKind::Success | NotificationKind::Info => {
                    tracing::info!("{}", n.message)
                }
            }
        }
    });

    let photo = LocalPhoto::from_path(&args.photo)
        .await
        .with_context(|| format!("reading {}", args.photo.display()))?;
    let api = ApiClient::new(reqwest::Client::new(), args.api_base);
    let coordinator = UploadCoordinator::new(api, bus);

    let outcome = async {
        let reference = coordinator.upload(&photo).await?;
        println!("{}", serde_json::to_string_pretty(&reference)?);
        if let Some(details) = &details {
            let order_id = coordinator.submit_order(details, &reference).await?;
            println!("{}", order_id);
        }
        anyhow::Ok(())
    }
    .await;

    // Dropping the last bus handle ends the printer task.
    drop(coordinator);
    let _ = printer.await;
    outcome
}
