//! Route tree construction and the axum adapter.
//!
//! # Responsibilities
//! - Collect (method, pattern, handler) bindings from nested scopes
//! - Snapshot each scope's middleware chain onto its routes
//! - Reject duplicate bindings, clashing parameter names and late
//!   middleware at build time
//! - Convert the frozen tree into an `axum::Router`
//!
//! # Design Decisions
//! - Built once at startup, immutable afterwards
//! - Configuration errors are collected and the first one is returned
//! - Middleware runs in attachment order, outermost scope first

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request},
    response::{IntoResponse, Response},
    routing::{on, MethodFilter, MethodRouter},
};
use futures_util::future::{BoxFuture, FutureExt};

use super::router::{Handler, Middleware, Router};

/// Programming-time route configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("handler already registered for {method} {pattern}")]
    DuplicateRoute { method: Method, pattern: String },

    #[error("middleware attached after routes in scope '{scope}'")]
    MiddlewareAfterRoutes { scope: String },

    #[error("invalid pattern '{pattern}': must start with '/'")]
    InvalidPattern { pattern: String },

    #[error("pattern '{pattern}' names a parameter differently than '{existing}'")]
    ConflictingParameter { pattern: String, existing: String },
}

/// A single resolved binding.
pub struct RouteEntry {
    method: Method,
    pattern: String,
    handler: Handler,
    middleware: Vec<Middleware>,
}

impl RouteEntry {
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Full pattern, prefixes included.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Number of middleware links guarding this route.
    pub fn middleware_len(&self) -> usize {
        self.middleware.len()
    }
}

impl std::fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteEntry")
            .field("method", &self.method)
            .field("pattern", &self.pattern)
            .field("middleware", &self.middleware.len())
            .finish()
    }
}

#[derive(Default)]
struct TreeState {
    routes: Vec<RouteEntry>,
    seen: HashSet<(Method, String)>,
    errors: Vec<RouteError>,
}

/// Immutable set of bindings produced by a builder.
#[derive(Debug)]
pub struct RouteTree {
    routes: Vec<RouteEntry>,
}

impl RouteTree {
    /// Run `build` against a fresh root scope and freeze the result.
    pub fn build(build: impl FnOnce(&mut dyn Router)) -> Result<Self, RouteError> {
        let mut state = TreeState::default();
        {
            let mut root = Scope {
                state: &mut state,
                prefix: String::new(),
                middleware: Vec::new(),
                sealed: false,
            };
            build(&mut root);
        }

        if let Some(err) = state.errors.into_iter().next() {
            return Err(err);
        }

        tracing::debug!(routes = state.routes.len(), "Route tree built");
        Ok(Self {
            routes: state.routes,
        })
    }

    pub fn routes(&self) -> &[RouteEntry] {
        &self.routes
    }

    /// Look up a binding by method and full pattern.
    pub fn find(&self, method: &Method, pattern: &str) -> Option<&RouteEntry> {
        self.routes
            .iter()
            .find(|r| r.method == *method && r.pattern == pattern)
    }

    /// Convert into an axum router. Unknown paths and methods fall through
    /// to axum's 404/405 handling.
    pub fn into_axum(self) -> axum::Router {
        let mut by_pattern: BTreeMap<String, MethodRouter> = BTreeMap::new();

        for entry in self.routes {
            let filter = method_filter(&entry.method);
            let endpoint = dispatch(entry.handler, entry.middleware.into());
            let method_router = match by_pattern.remove(&entry.pattern) {
                Some(existing) => existing.on(filter, endpoint),
                None => on(filter, endpoint),
            };
            by_pattern.insert(entry.pattern, method_router);
        }

        by_pattern
            .into_iter()
            .fold(axum::Router::new(), |router, (pattern, method_router)| {
                router.route(&pattern, method_router)
            })
    }
}

fn method_filter(method: &Method) -> MethodFilter {
    if *method == Method::POST {
        MethodFilter::POST
    } else if *method == Method::PUT {
        MethodFilter::PUT
    } else if *method == Method::DELETE {
        MethodFilter::DELETE
    } else {
        MethodFilter::GET
    }
}

/// Run the middleware chain, then the handler. The first failing link
/// short-circuits and its error becomes the response.
fn dispatch(
    handler: Handler,
    chain: Arc<[Middleware]>,
) -> impl Fn(Request<Body>) -> BoxFuture<'static, Response> + Clone + Send + Sync + 'static {
    move |req| {
        let handler = handler.clone();
        let chain = chain.clone();
        async move {
            let mut req = req;
            for link in chain.iter() {
                req = match link(req).await {
                    Ok(req) => req,
                    Err(err) => return err.into_response(),
                };
            }
            handler(req).await.unwrap_or_else(IntoResponse::into_response)
        }
        .boxed()
    }
}

/// Join a scope prefix with a pattern. `"/"` refers to the scope itself.
fn join(prefix: &str, pattern: &str) -> String {
    let pattern = pattern.trim_end_matches('/');
    match (prefix.is_empty(), pattern.is_empty()) {
        (true, true) => "/".to_string(),
        (false, true) => prefix.to_string(),
        _ => format!("{}{}", prefix, pattern),
    }
}

/// Two patterns conflict when, after a shared run of identical segments,
/// both continue with a parameter under different names. axum cannot hold
/// both.
fn params_conflict(a: &str, b: &str) -> bool {
    for (x, y) in a.split('/').zip(b.split('/')) {
        if x == y {
            continue;
        }
        return is_param(x) && is_param(y);
    }
    false
}

fn is_param(segment: &str) -> bool {
    segment.starts_with('{') && segment.ends_with('}')
}

struct Scope<'a> {
    state: &'a mut TreeState,
    prefix: String,
    middleware: Vec<Middleware>,
    /// Set once anything is registered; later middleware is rejected.
    sealed: bool,
}

impl Scope<'_> {
    fn add(&mut self, method: Method, pattern: &str, handler: Handler) {
        self.sealed = true;

        if !pattern.starts_with('/') {
            self.state.errors.push(RouteError::InvalidPattern {
                pattern: pattern.to_string(),
            });
            return;
        }

        let full = join(&self.prefix, pattern);
        if !self.state.seen.insert((method.clone(), full.clone())) {
            self.state.errors.push(RouteError::DuplicateRoute {
                method,
                pattern: full,
            });
            return;
        }

        if let Some(existing) = self
            .state
            .routes
            .iter()
            .find(|r| params_conflict(&r.pattern, &full))
        {
            self.state.errors.push(RouteError::ConflictingParameter {
                pattern: full,
                existing: existing.pattern.clone(),
            });
            return;
        }

        tracing::trace!(method = %method, pattern = %full, middleware = self.middleware.len(), "Route registered");
        self.state.routes.push(RouteEntry {
            method,
            pattern: full,
            handler,
            middleware: self.middleware.clone(),
        });
    }

    fn child(&mut self, prefix: String) -> Scope<'_> {
        Scope {
            state: &mut *self.state,
            prefix,
            middleware: self.middleware.clone(),
            sealed: false,
        }
    }
}

impl Router for Scope<'_> {
    fn get(&mut self, pattern: &str, handler: Handler) {
        self.add(Method::GET, pattern, handler);
    }

    fn post(&mut self, pattern: &str, handler: Handler) {
        self.add(Method::POST, pattern, handler);
    }

    fn put(&mut self, pattern: &str, handler: Handler) {
        self.add(Method::PUT, pattern, handler);
    }

    fn delete(&mut self, pattern: &str, handler: Handler) {
        self.add(Method::DELETE, pattern, handler);
    }

    fn with(&mut self, middleware: Middleware) {
        if self.sealed {
            let scope = if self.prefix.is_empty() { "/" } else { &self.prefix };
            self.state.errors.push(RouteError::MiddlewareAfterRoutes {
                scope: scope.to_string(),
            });
            return;
        }
        self.middleware.push(middleware);
    }

    fn group(&mut self, build: &dyn Fn(&mut dyn Router)) {
        self.sealed = true;
        let prefix = self.prefix.clone();
        build(&mut self.child(prefix));
    }

    fn route(&mut self, prefix: &str, build: &dyn Fn(&mut dyn Router)) {
        self.sealed = true;
        if !prefix.starts_with('/') {
            self.state.errors.push(RouteError::InvalidPattern {
                pattern: prefix.to_string(),
            });
            return;
        }
        let joined = join(&self.prefix, prefix);
        let joined = if joined == "/" { String::new() } else { joined };
        build(&mut self.child(joined));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpError;
    use crate::routing::{handler, middleware};
    use axum::http::{HeaderValue, StatusCode};
    use std::sync::Mutex;
    use tower::ServiceExt;

    fn ok(body: &'static str) -> Handler {
        handler(move |_req| async move { Ok(body.into_response()) })
    }

    /// Appends `tag` to the `x-trail` header so tests can observe order.
    fn tag(tag: &'static str) -> Middleware {
        middleware(move |mut req: Request<Body>| async move {
            let trail = req
                .headers()
                .get("x-trail")
                .and_then(|v| v.to_str().ok())
                .map(|v| format!("{}{}", v, tag))
                .unwrap_or_else(|| tag.to_string());
            req.headers_mut()
                .insert("x-trail", HeaderValue::from_str(&trail).unwrap());
            Ok(req)
        })
    }

    fn echo_trail() -> Handler {
        handler(|req: Request<Body>| async move {
            let trail = req
                .headers()
                .get("x-trail")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
                .to_string();
            Ok(trail.into_response())
        })
    }

    async fn call(router: axum::Router, method: Method, uri: &str) -> (StatusCode, String) {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let res = router.oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), 1 << 16).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[test]
    fn test_join() {
        assert_eq!(join("", "/"), "/");
        assert_eq!(join("", "/login"), "/login");
        assert_eq!(join("/members", "/"), "/members");
        assert_eq!(join("/members", "/{id}"), "/members/{id}");
        assert_eq!(join("/room", "/screen/shot.jpg"), "/room/screen/shot.jpg");
    }

    #[test]
    fn test_route_prefixes_and_group_shares_prefix() {
        let tree = RouteTree::build(|r| {
            r.route("/room", &|r| {
                r.get("/screen", ok("screen"));
                r.group(&|r| {
                    r.with(tag("a"));
                    r.post("/screen", ok("set"));
                });
            });
        })
        .unwrap();

        let get = tree.find(&Method::GET, "/room/screen").unwrap();
        assert_eq!(get.middleware_len(), 0);
        let post = tree.find(&Method::POST, "/room/screen").unwrap();
        assert_eq!(post.middleware_len(), 1);
    }

    #[test]
    fn test_duplicate_route_rejected() {
        let err = RouteTree::build(|r| {
            r.get("/health", ok("a"));
            r.group(&|r| {
                r.get("/health", ok("b"));
            });
        })
        .unwrap_err();

        assert_eq!(
            err,
            RouteError::DuplicateRoute {
                method: Method::GET,
                pattern: "/health".into()
            }
        );
    }

    #[test]
    fn test_conflicting_parameter_names_rejected() {
        let err = RouteTree::build(|r| {
            r.route("/members", &|r| {
                r.get("/{member_id}", ok("read"));
                r.post("/{member_id}/password", ok("password"));
            });
            r.route("/members/{id}", &|r| r.get("/x", ok("x")));
        })
        .unwrap_err();

        assert_eq!(
            err,
            RouteError::ConflictingParameter {
                pattern: "/members/{id}/x".into(),
                existing: "/members/{member_id}".into()
            }
        );
    }

    #[test]
    fn test_parameter_beside_static_segment_allowed() {
        let tree = RouteTree::build(|r| {
            r.get("/members/{member_id}", ok("read"));
            r.get("/members/{member_id}/password", ok("password"));
            r.get("/members/count", ok("count"));
        })
        .unwrap();
        assert_eq!(tree.routes().len(), 3);
        let _router = tree.into_axum();
    }

    #[test]
    fn test_same_pattern_different_methods_allowed() {
        let tree = RouteTree::build(|r| {
            r.get("/screen", ok("a"));
            r.post("/screen", ok("b"));
            r.put("/screen", ok("c"));
            r.delete("/screen", ok("d"));
        })
        .unwrap();
        assert_eq!(tree.routes().len(), 4);
    }

    #[test]
    fn test_middleware_after_routes_rejected() {
        let err = RouteTree::build(|r| {
            r.route("/members", &|r| {
                r.get("/", ok("list"));
                r.with(tag("late"));
            });
        })
        .unwrap_err();

        assert_eq!(
            err,
            RouteError::MiddlewareAfterRoutes {
                scope: "/members".into()
            }
        );
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let err = RouteTree::build(|r| r.get("health", ok("x"))).unwrap_err();
        assert!(matches!(err, RouteError::InvalidPattern { .. }));
    }

    #[tokio::test]
    async fn test_sibling_groups_are_isolated() {
        let router = RouteTree::build(|r| {
            r.group(&|r| {
                r.with(tag("A"));
                r.get("/left", echo_trail());
            });
            r.group(&|r| {
                r.with(tag("B"));
                r.get("/right", echo_trail());
            });
            r.get("/plain", echo_trail());
        })
        .unwrap()
        .into_axum();

        assert_eq!(call(router.clone(), Method::GET, "/left").await.1, "A");
        assert_eq!(call(router.clone(), Method::GET, "/right").await.1, "B");
        assert_eq!(call(router, Method::GET, "/plain").await.1, "");
    }

    #[tokio::test]
    async fn test_middleware_runs_in_attachment_order() {
        let router = RouteTree::build(|r| {
            r.group(&|r| {
                r.with(tag("1"));
                r.with(tag("2"));
                r.route("/nested", &|r| {
                    r.with(tag("3"));
                    r.get("/", echo_trail());
                });
            });
        })
        .unwrap()
        .into_axum();

        assert_eq!(call(router, Method::GET, "/nested").await.1, "123");
    }

    #[tokio::test]
    async fn test_failing_middleware_short_circuits() {
        let hits = Arc::new(Mutex::new(0u32));
        let counted = hits.clone();

        let router = RouteTree::build(move |r| {
            r.with(middleware(|_req| async { Err(HttpError::forbidden("denied")) }));
            let counted = counted.clone();
            r.get(
                "/secret",
                handler(move |_req| {
                    let counted = counted.clone();
                    async move {
                        *counted.lock().unwrap() += 1;
                        Ok("secret".into_response())
                    }
                }),
            );
        })
        .unwrap()
        .into_axum();

        let (status, body) = call(router, Method::GET, "/secret").await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, r#"{"message":"denied"}"#);
        assert_eq!(*hits.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_handler_error_rendered() {
        let router = RouteTree::build(|r| {
            r.get(
                "/missing",
                handler(|_req| async { Err(HttpError::not_found("member not found")) }),
            );
        })
        .unwrap()
        .into_axum();

        let (status, body) = call(router.clone(), Method::GET, "/missing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, r#"{"message":"member not found"}"#);

        let (status, _) = call(router.clone(), Method::POST, "/missing").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        let (status, _) = call(router, Method::GET, "/nowhere").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
