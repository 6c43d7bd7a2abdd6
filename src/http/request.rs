//! Request parsing helpers and request ID propagation.
//!
//! # Responsibilities
//! - Tag every request with an `x-request-id` (UUID v4) as early as possible
//! - Decode JSON bodies, query strings and path parameters for handlers
//!
//! # Design Decisions
//! - Parse failures become `400 Bad Request` with the rejection text
//! - Bodies are read with a fixed upper bound

use axum::{
    body::Body,
    extract::{Path, Query},
    http::{HeaderName, Request, Uri},
    RequestExt,
};
use serde::de::DeserializeOwned;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

use super::HttpError;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Upper bound for JSON request bodies.
pub const MAX_JSON_BODY: usize = 1024 * 1024;

/// Layer assigning a UUID request ID when the client did not send one.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::new(HeaderName::from_static(X_REQUEST_ID), MakeRequestUuid)
}

/// Layer copying the request ID onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(HeaderName::from_static(X_REQUEST_ID))
}

/// Decode the request body as JSON.
pub async fn json_body<T: DeserializeOwned>(req: Request<Body>) -> Result<T, HttpError> {
    let bytes = axum::body::to_bytes(req.into_body(), MAX_JSON_BODY)
        .await
        .map_err(|e| HttpError::bad_request("unable to read request body").with_internal_err(e))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| HttpError::bad_request("invalid request body").with_internal_err(e))
}

/// Decode the query string.
pub fn query<T: DeserializeOwned>(req: &Request<Body>) -> Result<T, HttpError> {
    query_from_uri(req.uri())
}

/// Decode the query string of `uri`, percent-decoding values.
pub fn query_from_uri<T: DeserializeOwned>(uri: &Uri) -> Result<T, HttpError> {
    Query::<T>::try_from_uri(uri)
        .map(|Query(q)| q)
        .map_err(|rejection| HttpError::bad_request(rejection.body_text()))
}

/// Single path parameter of the matched route.
pub async fn path_param(req: &mut Request<Body>) -> Result<String, HttpError> {
    req.extract_parts::<Path<String>>()
        .await
        .map(|Path(value)| value)
        .map_err(|rejection| HttpError::bad_request(rejection.body_text()))
}
