//! r2v-web - Reels2Vec music discovery service
//!
//! Serves trending/search/library listings, mock indexing tasks, the
//! snippet selector and the create wizard over HTTP + SSE.

use anyhow::{Context, Result};
use clap::Parser;
use r2v_common::config::{load_or_default, resolve_config_path};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use r2v_web::{build_router, AppState};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "r2v-web", version, about = "Reels2Vec web service")]
struct Args {
    /// Path to TOML config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Interface to bind
    #[arg(long, env = "R2V_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "R2V_PORT")]
    port: Option<u16>,

    /// Log level filter (e.g. info, debug, r2v_web=trace)
    #[arg(long, env = "R2V_LOG_LEVEL")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Priority: CLI > ENV > TOML > default
    let config_path = resolve_config_path(args.config.as_deref());
    let (mut config, source) = load_or_default(config_path.as_deref());
    let ignored_overrides = config.apply_env_overrides();
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .init();

    info!(
        "Starting Reels2Vec web service (r2v-web) v{}",
        env!("CARGO_PKG_VERSION")
    );
    source.log();
    for message in &ignored_overrides {
        warn!("{}", message);
    }

    if config.youtube_api_key.is_none() {
        info!("No YouTube API key configured; catalog endpoints will return empty lists");
    }

    let state = AppState::new(config.clone()).context("Failed to build HTTP clients")?;
    state
        .uploads
        .ensure_dir()
        .await
        .with_context(|| format!("Failed to create upload directory {}", state.uploads.dir().display()))?;
    info!("Upload directory: {}", state.uploads.dir().display());

    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("r2v-web listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
