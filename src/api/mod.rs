//! API composition root.
//!
//! # Route Tree
//! ```text
//! POST /login                      (public)
//! ┌ group: authentication gate ──────────────────────────┐
//! │ POST /logout                                          │
//! │ GET  /whoami                                          │
//! │ /members/*        (admins only)                       │
//! │ /members_bulk/*   (admins only)                       │
//! │ /room/*                                               │
//! │ <registered extensions>                               │
//! └───────────────────────────────────────────────────────┘
//! GET  /health                     (public, "true")
//! GET  /metrics                    (public, Prometheus)
//! ```
//!
//! # Design Decisions
//! - Health and metrics stay outside the gate so they answer even when the
//!   session store is degraded
//! - The extension registry belongs to one [`Manager`], not the process
//! - Registration closes once the tree has been assembled

pub mod gate;
pub mod members;
pub mod registry;
pub mod room;
pub mod session;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::Request,
    response::IntoResponse,
};
use metrics_exporter_prometheus::PrometheusHandle;

use crate::http::HttpError;
use crate::observability::metrics;
use crate::routing::{handler, middleware, Middleware, RouteError, RouteTree, Router};
use crate::types::{CaptureManager, DesktopManager, MemberManager, SessionManager};

use self::members::MembersHandler;
use self::room::RoomHandler;

pub use self::registry::{RegistryError, RouteRegistry};

/// Default upper bound for a session store lookup.
pub const DEFAULT_AUTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Owns the consumed capabilities and the extension registry.
pub struct Manager {
    sessions: Arc<dyn SessionManager>,
    members: Arc<dyn MemberManager>,
    desktop: Arc<dyn DesktopManager>,
    capture: Arc<dyn CaptureManager>,
    registry: RouteRegistry,
    metrics: PrometheusHandle,
    auth_timeout: Duration,
}

impl Manager {
    pub fn new(
        sessions: Arc<dyn SessionManager>,
        members: Arc<dyn MemberManager>,
        desktop: Arc<dyn DesktopManager>,
        capture: Arc<dyn CaptureManager>,
    ) -> Self {
        Self {
            sessions,
            members,
            desktop,
            capture,
            registry: RouteRegistry::new(),
            metrics: metrics::detached(),
            auth_timeout: DEFAULT_AUTH_TIMEOUT,
        }
    }

    /// Serve `GET /metrics` from `handle`.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = handle;
        self
    }

    pub fn with_auth_timeout(mut self, timeout: Duration) -> Self {
        self.auth_timeout = timeout;
        self
    }

    /// Register an extension tree mounted at `path` inside the authenticated
    /// group. A later registration for the same path replaces the earlier
    /// one. Only valid before [`Manager::route`] runs.
    pub fn add_router<F>(&mut self, path: impl Into<String>, builder: F) -> Result<(), RegistryError>
    where
        F: Fn(&mut dyn Router) + Send + Sync + 'static,
    {
        self.registry.add(path, Arc::new(builder))
    }

    /// Authenticate a request, returning it with the session attached.
    pub async fn authenticate(&self, req: Request<Body>) -> Result<Request<Body>, HttpError> {
        gate::authenticate(self.sessions.as_ref(), self.auth_timeout, req).await
    }

    /// The authentication gate as reusable middleware.
    pub fn gate(&self) -> Middleware {
        let sessions = self.sessions.clone();
        let timeout = self.auth_timeout;
        middleware(move |req| {
            let sessions = sessions.clone();
            async move { gate::authenticate(sessions.as_ref(), timeout, req).await }
        })
    }

    /// Populate `r` with the full route tree.
    pub fn route(&self, r: &mut dyn Router) {
        let extensions = self.registry.seal();

        r.post("/login", session::login(self.sessions.clone(), self.members.clone()));

        r.group(&|r| {
            r.with(self.gate());

            r.post("/logout", session::logout(self.sessions.clone(), self.members.clone()));
            r.get("/whoami", session::whoami());

            let members = MembersHandler::new(self.members.clone());
            r.route("/members", &|r| members.route(r));
            r.route("/members_bulk", &|r| members.route_bulk(r));

            let room = RoomHandler::new(self.sessions.clone(), self.desktop.clone(), self.capture.clone());
            r.route("/room", &|r| room.route(r));

            for (path, builder) in extensions {
                tracing::debug!(path = %path, "Mounting extension router");
                r.route(path, builder.as_ref());
            }
        });

        r.get("/health", handler(|_req| async { Ok("true".into_response()) }));
        r.get("/metrics", metrics::exposition(self.metrics.clone()));
    }

    /// Build the route tree and convert it to an axum router.
    pub fn router(&self) -> Result<axum::Router, RouteError> {
        let tree = RouteTree::build(|r| self.route(r))?;
        tracing::info!(routes = tree.routes().len(), extensions = self.registry.len(), "API routes composed");
        Ok(tree.into_axum())
    }

    pub fn registry(&self) -> &RouteRegistry {
        &self.registry
    }
}

/// Render a successful JSON body.
pub(crate) fn json<T: serde::Serialize>(value: T) -> Result<axum::response::Response, HttpError> {
    Ok(axum::Json(value).into_response())
}
