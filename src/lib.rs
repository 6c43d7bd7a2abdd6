//! HTTP entry layer of a remote-session server.
//!
//! Composes the public and authenticated route groups, gates the latter on
//! a session capability, and lets extensions mount their own route trees
//! before the server starts.

// Core subsystems
pub mod api;
pub mod auth;
pub mod http;
pub mod routing;
pub mod types;

// Capability implementations
pub mod memory;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod net;
pub mod observability;

pub use api::Manager;
pub use config::ApiConfig;
pub use http::{ApiServer, HttpError};
pub use lifecycle::Shutdown;
pub use routing::{RouteTree, Router};
