//! TexRoom Server: collaborative LaTeX rooms over WebSocket.
//!
//! Main entry point that wires all crates together and starts the server.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use texroom_api::{AppState, build_app};
use texroom_auth::session::SessionCleanup;
use texroom_core::config::AppConfig;
use texroom_core::config::database::StoreBackend;
use texroom_core::error::AppError;
use texroom_database::{DatabasePool, Stores};
use texroom_service::conversion::build_converter;

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "texroom-server", version, about = "TexRoom collaborative LaTeX server")]
struct Cli {
    /// Directory holding `default.toml` and environment overlays.
    #[arg(long, default_value = "config")]
    config_dir: PathBuf,
    /// Environment overlay to load (`config/{env}.toml`).
    #[arg(long, env = "TEXROOM_ENV", default_value = "development")]
    env: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match AppConfig::load(&cli.config_dir, &cli.env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(
        config_dir = %cli.config_dir.display(),
        env = %cli.env,
        "Configuration loaded"
    );

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting TexRoom v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Record stores ────────────────────────────────────
    let (stores, db_pool) = match config.database.backend {
        StoreBackend::Postgres => {
            tracing::info!("Connecting to database...");
            let pool = DatabasePool::connect(&config.database).await?;
            (pool.stores(), Some(pool))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory stores; data is lost on restart");
            (Stores::memory(), None)
        }
    };

    // ── Step 2: Conversion service ───────────────────────────────
    let converter = build_converter(&config.conversion)?;

    // ── Step 3: Services, realtime engine, router ────────────────
    let cleanup_interval = config.session.cleanup_interval_minutes;
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let addr = format!("{}:{}", config.server.host, config.server.port);

    let state = AppState::new(config, &stores, converter);
    let realtime = Arc::clone(&state.realtime);

    // ── Step 4: Background session cleanup ───────────────────────
    let cleanup_handle = SessionCleanup::new((*state.session_manager).clone(), cleanup_interval)
        .spawn(realtime.shutdown_receiver());

    // ── Step 5: Build and start HTTP server ──────────────────────
    let app = build_app(state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("TexRoom server listening on {}", addr);

    let shutdown_engine = Arc::clone(&realtime);
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown...");
        if let Err(e) = shutdown_engine.shutdown().await {
            tracing::error!(error = %e, "Real-time engine shutdown failed");
        }
    });

    server
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    // ── Step 6: Wait for background tasks ────────────────────────
    let _ = tokio::time::timeout(grace, cleanup_handle).await;
    if let Some(pool) = db_pool {
        pool.close().await;
    }

    tracing::info!("TexRoom server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
