//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Wrap the composed route tree with the cross-cutting layers
//!   (request ID, tracing, timeout, request metrics)
//! - Serve over plain TCP or TLS
//! - Drain in-flight requests on shutdown

use std::net::SocketAddr;
use std::time::Duration;

use axum::{middleware, Router};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::api::Manager;
use crate::config::ApiConfig;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::lifecycle::shutdown::ShutdownSignal;
use crate::net::tls::load_tls_config;
use crate::observability::metrics;
use crate::routing::RouteError;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("route configuration: {0}")]
    Route(#[from] RouteError),

    #[error("listener: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid bind address '{0}'")]
    BindAddress(String),
}

/// HTTP server for the session API.
pub struct ApiServer {
    router: Router,
    config: ApiConfig,
}

impl ApiServer {
    /// Compose the manager's routes. Closes the manager's extension registry.
    pub fn new(config: ApiConfig, manager: &Manager) -> Result<Self, ServerError> {
        let routes = manager.router()?;
        let router = Self::build_router(&config, routes);
        Ok(Self { router, config })
    }

    /// Wrap the route tree with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ApiConfig, routes: Router) -> Router {
        routes
            .route_layer(middleware::from_fn(metrics::track_requests))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// The fully layered router, e.g. for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Run the server on `listener` until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router.into_make_service_with_connect_info::<SocketAddr>())
            .with_graceful_shutdown(shutdown.recv())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Run the server with TLS on the configured bind address.
    pub async fn run_tls(self, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let Some(tls) = self.config.listener.tls.clone() else {
            let listener = TcpListener::bind(&self.config.listener.bind_address).await?;
            return self.run(listener, shutdown).await;
        };

        let addr: SocketAddr = self
            .config
            .listener
            .bind_address
            .parse()
            .map_err(|_| ServerError::BindAddress(self.config.listener.bind_address.clone()))?;
        let rustls = load_tls_config(tls.cert_path.as_ref(), tls.key_path.as_ref()).await?;

        let handle = axum_server::Handle::new();
        let grace = Duration::from_secs(self.config.timeouts.shutdown_secs);
        let watcher = handle.clone();
        tokio::spawn(async move {
            shutdown.recv().await;
            watcher.graceful_shutdown(Some(grace));
        });

        tracing::info!(address = %addr, "HTTPS server starting");
        axum_server::bind_rustls(addr, rustls)
            .handle(handle)
            .serve(self.router.into_make_service_with_connect_info::<SocketAddr>())
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }
}
