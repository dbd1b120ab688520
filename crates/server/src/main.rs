//! Paulo Cell server binary.

use anyhow::{Context, Result};
use clap::Parser;
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use paulocell_core::config::AppConfig;
use paulocell_server::{AppState, create_router};
use paulocell_trash::Sweeper;
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Paulo Cell - repair-shop records backend
#[derive(Parser, Debug)]
#[command(name = "paulocelld")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(
        short,
        long,
        env = "PAULOCELL_CONFIG",
        default_value = "config/server.toml"
    )]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Paulo Cell v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration (file is optional, env vars can provide/override everything)
    let config_path = std::path::Path::new(&args.config);
    let mut figment = Figment::new();
    if config_path.exists() {
        tracing::info!(config_path = %args.config, "Loading configuration from file");
        figment = figment.merge(Toml::file(&args.config));
    } else {
        tracing::debug!("No config file found at {}", args.config);
    }

    let config: AppConfig = figment
        .merge(Env::prefixed("PAULOCELL_").split("__"))
        .extract()
        .context("failed to load configuration")?;
    config
        .trash
        .validate()
        .map_err(|e| anyhow::anyhow!(e))
        .context("invalid configuration")?;

    // Initialize the collection store and verify it before accepting requests
    let store = paulocell_store::from_config(&config.store)
        .await
        .context("failed to initialize collection store")?;
    store
        .health_check()
        .await
        .context("collection store health check failed")?;
    tracing::info!("Collection store initialized");

    let state = AppState::new(config.clone(), store);

    // Background retention sweeper; the first sweep runs at startup
    let sweeper = if config.trash.sweep_enabled {
        Some(Sweeper::spawn(
            state.trash.clone(),
            config.trash.sweep_interval(),
        ))
    } else {
        tracing::info!("Background trash sweeper disabled");
        None
    };

    let app = create_router(state);

    let addr: SocketAddr = config.server.bind.parse().context("invalid bind address")?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(sweeper) = sweeper {
        sweeper.shutdown().await;
    }
    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %error, "Failed to listen for shutdown signal");
    }
}
