//! Session API server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ─────────────▶ request id → trace → timeout → metrics
//!                                                     │
//!                          ┌──────────────────────────┴───────────┐
//!                          ▼                                      ▼
//!                   public routes                        authenticated group
//!             /login /health /metrics              gate → /logout /whoami
//!                                                         /members /members_bulk
//!                                                         /room  <extensions>
//!                                                            │
//!                                                            ▼
//!                                   session / member / desktop / capture capabilities
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;

use session_api::config::{load_config, ApiConfig};
use session_api::lifecycle::{signals, Shutdown};
use session_api::memory::{HeadlessDesktop, MemoryMembers, MemorySessions, NoCapture};
use session_api::observability::{logging, metrics};
use session_api::{ApiServer, Manager};

#[derive(Parser)]
#[command(name = "session-api")]
#[command(about = "HTTP entry layer of the remote-session server", long_about = None)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ApiConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init(&config.observability.log_level)?;
    tracing::info!("session-api v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        tls = config.listener.tls.is_some(),
        cookie_enabled = config.session.cookie_enabled,
        members = config.members.len(),
        "Configuration loaded"
    );
    if config.members.is_empty() {
        tracing::warn!("No members configured; nobody will be able to log in");
    }

    let sessions = Arc::new(MemorySessions::new(config.session.clone()));
    let members = Arc::new(MemoryMembers::new(sessions.clone(), &config.members));
    let desktop = Arc::new(HeadlessDesktop::new(config.screen));

    let mut manager = Manager::new(sessions, members, desktop, Arc::new(NoCapture))
        .with_auth_timeout(Duration::from_millis(config.timeouts.auth_ms));
    if config.observability.metrics_enabled {
        manager = manager.with_metrics(metrics::install()?);
    }

    let server = ApiServer::new(config.clone(), &manager)?;

    let shutdown = Shutdown::new();
    let signal = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        shutdown.trigger();
    });

    if config.listener.tls.is_some() {
        server.run_tls(signal).await?;
    } else {
        let listener = TcpListener::bind(&config.listener.bind_address).await?;
        server.run(listener, signal).await?;
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
