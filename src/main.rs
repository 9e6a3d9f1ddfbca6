#![forbid(unsafe_code)]

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use llmrelay::config::{CatalogLoader, RelaySettings, DEFAULT_BASE_URL};
use llmrelay::server::{self, AppState};
use llmrelay::Relay;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const TRACING_TARGET: &str = "llmrelay::startup";

/// Chat relay in front of an OpenRouter-compatible API.
#[derive(Debug, Parser)]
#[command(name = "llmrelay", version, about)]
struct Cli {
    /// Address to listen on
    #[arg(long, env = "RELAY_HOST", default_value = "0.0.0.0")]
    host: IpAddr,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 10000)]
    port: u16,

    /// Upstream bearer credential
    #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Upstream API base URL
    #[arg(long, env = "OPENROUTER_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Model table override file
    #[arg(long = "models", env = "RELAY_MODELS_PATH")]
    models_path: Option<PathBuf>,

    /// Upstream request timeout in seconds
    #[arg(
        long,
        env = "RELAY_REQUEST_TIMEOUT",
        default_value_t = 300,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    request_timeout: u64,

    /// Maximum image upload size in megabytes
    #[arg(long, env = "RELAY_MAX_UPLOAD_MB", default_value_t = 10)]
    max_upload_mb: usize,
}

#[tokio::main]
async fn main() {
    // Load .env before clap reads the environment
    let _ = dotenvy::dotenv();

    init_tracing();

    if let Err(error) = run(Cli::parse()).await {
        tracing::error!(target: TRACING_TARGET, error = %error, "Application terminated with error");
        eprintln!("Error: {error:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let catalog = match &cli.models_path {
        Some(path) => CatalogLoader::from_path(path),
        None => CatalogLoader::new(),
    }
    .and_then(CatalogLoader::into_catalog)
    .context("failed to load model table")?;

    tracing::info!(
        target: TRACING_TARGET,
        models = catalog.len(),
        default_model = %catalog.default_entry().key,
        "Model table loaded"
    );

    let settings = RelaySettings::default()
        .with_api_key(cli.api_key)
        .with_base_url(cli.base_url)
        .with_request_timeout(Duration::from_secs(cli.request_timeout));

    if settings.has_api_key() {
        tracing::info!(target: TRACING_TARGET, base_url = %settings.base_url, "Upstream configured");
    } else {
        tracing::warn!(
            target: TRACING_TARGET,
            "OPENROUTER_API_KEY not found, chat requests will fail until it is set"
        );
    }

    let relay = Relay::new(catalog, settings).context("failed to create relay")?;
    let state = AppState::new(relay).with_max_upload_bytes(upload_limit_bytes(cli.max_upload_mb));
    let router = server::routes(state);

    let addr = SocketAddr::new(cli.host, cli.port);
    server::serve(router, addr)
        .await
        .with_context(|| format!("server on {} failed", addr))
}

fn upload_limit_bytes(megabytes: usize) -> usize {
    megabytes.saturating_mul(1024 * 1024)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("llmrelay=info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
