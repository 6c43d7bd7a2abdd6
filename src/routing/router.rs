//! Router capability consumed by route builders.
//!
//! # Responsibilities
//! - Register handlers for the standard verbs
//! - Attach middleware to the current scope
//! - Open nested scopes (`group` keeps the prefix, `route` extends it)
//!
//! # Design Decisions
//! - Object safe: builders receive `&mut dyn Router`, never a concrete type
//! - Handlers and middleware are type-erased async closures
//! - Handlers fail with [`HttpError`]; the adapter renders it

use std::future::Future;
use std::sync::Arc;

use axum::{body::Body, http::Request, response::Response};
use futures_util::future::{BoxFuture, FutureExt};

use crate::http::HttpError;

/// Result of a request handler.
pub type HandlerResult = Result<Response, HttpError>;

/// Type-erased request handler.
pub type Handler = Arc<dyn Fn(Request<Body>) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// Type-erased middleware. On success it yields the (possibly enriched)
/// request passed on to the next link; on failure the chain stops.
pub type Middleware =
    Arc<dyn Fn(Request<Body>) -> BoxFuture<'static, Result<Request<Body>, HttpError>> + Send + Sync>;

/// Builder function that populates a scope.
pub type RouteBuilder = Arc<dyn Fn(&mut dyn Router) + Send + Sync>;

/// Box an async closure into a [`Handler`].
pub fn handler<F, Fut>(f: F) -> Handler
where
    F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(move |req| f(req).boxed())
}

/// Box an async closure into a [`Middleware`].
pub fn middleware<F, Fut>(f: F) -> Middleware
where
    F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Request<Body>, HttpError>> + Send + 'static,
{
    Arc::new(move |req| f(req).boxed())
}

/// Polymorphic route registration surface.
pub trait Router {
    fn get(&mut self, pattern: &str, handler: Handler);
    fn post(&mut self, pattern: &str, handler: Handler);
    fn put(&mut self, pattern: &str, handler: Handler);
    fn delete(&mut self, pattern: &str, handler: Handler);

    /// Attach middleware to this scope. Must precede any route in the scope.
    fn with(&mut self, middleware: Middleware);

    /// Open a scope sharing this scope's prefix.
    fn group(&mut self, build: &dyn Fn(&mut dyn Router));

    /// Open a scope mounted at `prefix` below this scope's prefix.
    fn route(&mut self, prefix: &str, build: &dyn Fn(&mut dyn Router));
}
