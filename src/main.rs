//! pulse: a database liveness probe service.
//!
//! This is the application entry point. It loads configuration from a TOML
//! file plus `DB_*` environment overrides, initializes tracing, sets up the
//! Axum router with the health route, and serves it until shutdown.

mod config;
mod db;
mod error;
mod http;
mod middleware;
mod routes;
mod secret;
mod state;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::{AppConfig, DEFAULT_CONFIG_PATH, DEFAULT_LOG_FILTER};
use routes::create_router;
use state::AppState;

/// pulse: a database liveness probe service
#[derive(Parser, Debug)]
#[command(name = "pulse", version, about)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Log level filter (e.g., "pulse=debug,tower_http=info")
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration (file is optional; DB_* env vars override it)
    let config = AppConfig::load(&args.config)?;

    // Initialize tracing with priority: CLI > env > default
    let log_filter = args
        .log_level
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

    let registry =
        tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::new(&log_filter));
    if config.logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Loaded configuration");
    tracing::info!(
        host = %config.database.host,
        port = config.database.port,
        database = %config.database.database,
        user = %config.database.user,
        password_file = %config.database.password_file.display(),
        timeout_seconds = config.database.connect_timeout_seconds,
        "Database probe target configured"
    );

    // Create application state and router
    let state = AppState::new(config.clone());
    let app = create_router(state);

    // Start server (blocks until shutdown)
    http::start_server(app, &config).await?;

    Ok(())
}
