//! Metrics collection and exposition.
//!
//! # Metrics
//! - `api_requests_total` (counter): requests by method, route, status
//! - `api_request_duration_seconds` (histogram): latency by method, route
//! - `api_auth_failures_total` (counter): gate rejections by kind
//!
//! The recorder is installed once per process by the binary. Tests and
//! embedders that do not install it get a detached handle whose exposition
//! is empty.

use std::time::Instant;

use axum::{
    body::Body,
    extract::MatchedPath,
    http::{header::CONTENT_TYPE, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

use crate::routing::{handler, Handler};

/// Content type of the Prometheus text format.
pub const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Install the global Prometheus recorder.
pub fn install() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Handle to a recorder that is not installed globally.
pub fn detached() -> PrometheusHandle {
    PrometheusBuilder::new().build_recorder().handle()
}

/// `GET /metrics` handler rendering the recorder's exposition.
pub fn exposition(handle: PrometheusHandle) -> Handler {
    handler(move |_req| {
        let body = handle.render();
        async move { Ok(([(CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)], body).into_response()) }
    })
}

/// Record a completed request.
pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    ::metrics::counter!(
        "api_requests_total",
        "method" => method.to_string(),
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!(
        "api_request_duration_seconds",
        "method" => method.to_string(),
        "route" => route.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record a request rejected by the authentication gate.
pub fn record_auth_failure(kind: &'static str) {
    ::metrics::counter!("api_auth_failures_total", "kind" => kind).increment(1);
}

/// Middleware recording request count and latency per matched route.
pub async fn track_requests(req: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());

    let response = next.run(req).await;
    record_request(&method, &route, response.status().as_u16(), start);
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_exposition_content_type() {
        let handle = detached();
        let response = exposition(handle)(Request::new(Body::empty())).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            EXPOSITION_CONTENT_TYPE
        );
    }
}
