//! tagdesk-api - Complaint intake microservice
//!
//! Accepts customer complaints over HTTP, tags each with a category and a
//! sentiment, and stores them in SQLite.

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tagdesk_api::classifier::build_classifier;
use tagdesk_api::cli::Args;
use tagdesk_api::validation::ValidationRules;
use tagdesk_api::{build_router, AppState};
use tagdesk_common::config::{ServiceConfig, TomlConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config_path();
    let file_config = TomlConfig::load_optional(&config_path)?;
    let config_found = file_config.is_some();
    let config = ServiceConfig::resolve(file_config.unwrap_or_default(), args.overrides());
    config.validate()?;

    // RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting TagDesk complaint service (tagdesk-api) v{}", env!("CARGO_PKG_VERSION"));
    if config_found {
        info!("Configuration: {}", config_path.display());
    } else {
        warn!("Config file not found at {}, using defaults", config_path.display());
    }

    info!("Database: {}", config.database_path.display());
    let pool = tagdesk_common::db::init_database(&config.database_path)
        .await
        .context("Failed to initialize database")?;
    info!("Database connection established");

    let classifier = build_classifier(&config.inference).context("Failed to build classifier")?;

    let state = AppState::new(pool, classifier)
        .with_rules(ValidationRules::new(&config.validation))
        .with_urgent_threshold(config.urgent.threshold);
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("API docs: http://{}/docs", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
