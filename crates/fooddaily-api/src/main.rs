//! Food Daily Server Binary
//!
//! HTTP backend for the Food Daily food-ordering application.
//!
//! # Usage
//!
//! ```bash
//! # With config file
//! fooddaily --config config.yaml
//!
//! # With environment variables only
//! FOODDAILY_AUTH__TOKEN_SECRET=secret fooddaily
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tokio::signal;
use tracing::{error, info};

use fooddaily_api::config::ServerConfig;
use fooddaily_api::http::{create_router, AppState};
use fooddaily_api::observability::{init_logging, parse_log_level, LoggingConfig};
use fooddaily_auth::TokenService;
use fooddaily_storage::{DocumentStore, MemoryDocumentStore};

/// Food Daily - HTTP backend for a food-ordering application
#[derive(Parser, Debug)]
#[command(name = "fooddaily")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file (YAML)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = if let Some(config_path) = args.config {
        ServerConfig::load(&config_path)?
    } else {
        ServerConfig::from_env()?
    };

    init_logging(LoggingConfig {
        json_format: config.logging.json,
        default_level: parse_log_level(&config.logging.level),
    });

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting Food Daily server"
    );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    // validate() already requires the secret; this keeps the binary honest
    // if it is ever constructed another way.
    let secret = config
        .auth
        .token_secret
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("auth.token_secret is required"))?;
    let tokens = TokenService::new(secret);

    match config.storage.backend.as_str() {
        "memory" => {
            info!("Using in-memory storage backend");
            let store = MemoryDocumentStore::new_shared();
            run_server(store, tokens, addr).await
        }
        other => {
            error!("Unknown storage backend: {}", other);
            anyhow::bail!("Unknown storage backend: {}", other)
        }
    }
}

/// Run the HTTP server with graceful shutdown.
async fn run_server<S: DocumentStore>(
    store: Arc<S>,
    tokens: TokenService,
    addr: SocketAddr,
) -> anyhow::Result<()> {
    let state = AppState::new(store, tokens);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "HTTP server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
