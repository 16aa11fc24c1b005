use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use std::{env, time::Duration};

/// Which backend holds order and contact records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreBackend {
    /// Local SQLite file through sqlx.
    Sqlite,
    /// Managed DynamoDB tables.
    Dynamodb,
}

/// What the binary should do after configuration is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    Serve,
    Migrate,
    LookupOrder(String),
    OrdersFor(String),
}

/// Centralized application configuration.
/// Combines environment variables and CLI arguments. Built once in `main`
/// and handed by reference to the services that need it.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub region: String,
    /// Photo bucket. Presign and order creation fail with a server error
    /// while this is unset.
    pub bucket_name: Option<String>,
    /// Folder every photo key lives under; always ends with `/`.
    pub folder_prefix: String,
    pub orders_table: String,
    pub contact_table: String,
    /// Browser origins allowed by CORS; `*` allows any origin.
    pub allowed_origins: Vec<String>,
    pub store: StoreBackend,
    pub database_url: String,
    pub presign_ttl: Duration,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Figurine storefront order API")]
pub struct Args {
    /// Host to bind to (overrides FIGURINE_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides FIGURINE_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// AWS region (overrides AWS_REGION)
    #[arg(long)]
    pub region: Option<String>,

    /// Bucket that receives customer photos (overrides S3_BUCKET_NAME)
    #[arg(long)]
    pub bucket: Option<String>,

    /// Folder prefix for photo keys (overrides S3_FOLDER_PATH)
    #[arg(long)]
    pub folder_prefix: Option<String>,

    /// Orders table name (overrides DYNAMODB_TABLE_NAME)
    #[arg(long)]
    pub orders_table: Option<String>,

    /// Contact messages table name (overrides CONTACT_MESSAGES_TABLE)
    #[arg(long)]
    pub contact_table: Option<String>,

    /// Comma-separated CORS origins (overrides ALLOWED_ORIGINS)
    #[arg(long)]
    pub allowed_origins: Option<String>,

    /// Record store backend (overrides FIGURINE_STORE)
    #[arg(long, value_enum)]
    pub store: Option<StoreBackend>,

    /// SQLite database URL (overrides FIGURINE_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Lifetime of presigned upload URLs in seconds (overrides PRESIGN_TTL_SECS)
    #[arg(long)]
    pub presign_ttl_secs: Option<u64>,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,

    /// Print one order as JSON and exit
    #[arg(long, value_name = "ORDER_ID", conflicts_with_all = ["migrate", "orders_for"])]
    pub lookup_order: Option<String>,

    /// Print every order for an email address, newest first, and exit
    #[arg(long, value_name = "EMAIL", conflicts_with = "migrate")]
    pub orders_for: Option<String>,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and run mode.
    pub fn from_env_and_args() -> Result<(Self, RunMode)> {
        let args = Args::parse();
        Self::from_sources(args, |name| env::var(name).ok())
    }

    /// Merge parsed CLI args over values produced by `lookup`.
    ///
    /// Precedence is CLI, then environment, then built-in default.
    pub fn from_sources<F>(args: Args, lookup: F) -> Result<(Self, RunMode)>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_port = match lookup("FIGURINE_PORT") {
            Some(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing FIGURINE_PORT value `{}`", value))?,
            None => 3000,
        };
        let env_ttl = match lookup("PRESIGN_TTL_SECS") {
            Some(value) => value
                .parse::<u64>()
                .with_context(|| format!("parsing PRESIGN_TTL_SECS value `{}`", value))?,
            None => 300,
        };
        let env_store = match lookup("FIGURINE_STORE") {
            Some(value) => StoreBackend::from_str(&value, true)
                .map_err(|err| anyhow::anyhow!("parsing FIGURINE_STORE value `{}`: {}", value, err))?,
            None => StoreBackend::Sqlite,
        };

        let ttl_secs = args.presign_ttl_secs.unwrap_or(env_ttl);
        if ttl_secs == 0 || ttl_secs > 7 * 24 * 60 * 60 {
            bail!("presign TTL must be between 1 second and 7 days, got {}", ttl_secs);
        }

        let bucket_name = args
            .bucket
            .or_else(|| lookup("S3_BUCKET_NAME"))
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty());

        let folder_prefix = normalize_prefix(
            &args
                .folder_prefix
                .or_else(|| lookup("S3_FOLDER_PATH"))
                .unwrap_or_else(|| "user-photos/".into()),
        )?;

        let allowed_origins = parse_origins(
            &args
                .allowed_origins
                .or_else(|| lookup("ALLOWED_ORIGINS"))
                .unwrap_or_else(|| "*".into()),
        );

        let cfg = Self {
            host: args
                .host
                .or_else(|| lookup("FIGURINE_HOST"))
                .unwrap_or_else(|| "0.0.0.0".into()),
            port: args.port.unwrap_or(env_port),
            region: args
                .region
                .or_else(|| lookup("AWS_REGION"))
                .unwrap_or_else(|| "us-east-1".into()),
            bucket_name,
            folder_prefix,
            orders_table: args
                .orders_table
                .or_else(|| lookup("DYNAMODB_TABLE_NAME"))
                .unwrap_or_else(|| "ido-orders".into()),
            contact_table: args
                .contact_table
                .or_else(|| lookup("CONTACT_MESSAGES_TABLE"))
                .unwrap_or_else(|| "ido-contact-messages".into()),
            allowed_origins,
            store: args.store.unwrap_or(env_store),
            database_url: args
                .database_url
                .or_else(|| lookup("FIGURINE_DATABASE_URL"))
                .unwrap_or_else(|| "sqlite://./data/figurine.db".into()),
            presign_ttl: Duration::from_secs(ttl_secs),
        };

        let mode = if args.migrate {
            RunMode::Migrate
        } else if let Some(order_id) = args.lookup_order {
            RunMode::LookupOrder(order_id)
        } else if let Some(email) = args.orders_for {
            RunMode::OrdersFor(email)
        } else {
            RunMode::Serve
        };

        Ok((cfg, mode))
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Ensure the folder prefix is relative, traversal-free and ends with `/`.
fn normalize_prefix(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_start_matches('/');
    if trimmed.is_empty() {
        bail!("S3 folder prefix must not be empty");
    }
    if trimmed.contains("..") || trimmed.contains("//") || trimmed.contains('\\') {
        bail!("S3 folder prefix `{}` is not a plain folder path", raw);
    }
    if trimmed.ends_with('/') {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("{}/", trimmed))
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}
