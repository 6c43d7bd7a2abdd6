//! Classified HTTP errors.
//!
//! Every handler and middleware in the route tree fails with an [`HttpError`].
//! It carries a public classification (status + message) that is rendered to
//! the client and an optional internal cause that is only logged.

use std::error::Error as StdError;
use std::fmt;

use axum::{
    http::{header::HeaderName, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Boxed internal cause attached to an [`HttpError`].
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// An error value tagged with a user-facing category.
#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    message: String,
    internal: Option<BoxError>,
    headers: HeaderMap,
}

impl HttpError {
    /// Create an error with an explicit status and public message.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            internal: None,
            headers: HeaderMap::new(),
        }
    }

    fn canonical(status: StatusCode) -> Self {
        Self::new(status, status.canonical_reason().unwrap_or("error"))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Authentication failed. The public message is always the generic one.
    pub fn unauthorized() -> Self {
        Self::canonical(StatusCode::UNAUTHORIZED)
    }

    /// Policy rejection with a human-readable reason.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn internal() -> Self {
        Self::canonical(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }

    /// Attach a diagnostic cause that is logged but never sent to the client.
    pub fn with_internal_err<E>(mut self, err: E) -> Self
    where
        E: Into<BoxError>,
    {
        self.internal = Some(err.into());
        self
    }

    /// Attach a header to the rendered response.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Merge headers collected by a side effect (e.g. a cookie clear).
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn internal_err(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.internal.as_deref()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status.as_u16(), self.message)?;
        if let Some(internal) = &self.internal {
            write!(f, ": {}", internal)?;
        }
        Ok(())
    }
}

impl StdError for HttpError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.internal
            .as_deref()
            .map(|e| e as &(dyn StdError + 'static))
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        match (&self.internal, self.status.is_server_error()) {
            (Some(cause), true) => {
                tracing::error!(status = %self.status, message = %self.message, error = %cause, "request failed")
            }
            (Some(cause), false) => {
                tracing::warn!(status = %self.status, message = %self.message, error = %cause, "request rejected")
            }
            (None, true) => tracing::error!(status = %self.status, message = %self.message, "request failed"),
            (None, false) => tracing::debug!(status = %self.status, message = %self.message, "request rejected"),
        }

        let mut response = (self.status, Json(json!({ "message": self.message }))).into_response();
        response.headers_mut().extend(self.headers);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::SET_COOKIE;

    #[test]
    fn test_internal_detail_not_rendered() {
        let err = HttpError::unauthorized().with_internal_err("token store offline");
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.message(), "Unauthorized");
        assert!(err.internal_err().is_some());

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_body_carries_public_message_only() {
        let response = HttpError::forbidden("nope")
            .with_internal_err("secret detail")
            .into_response();
        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert_eq!(body, r#"{"message":"nope"}"#);
        assert!(!body.contains("secret"));
    }

    #[test]
    fn test_headers_attached() {
        let response = HttpError::unauthorized()
            .with_header(SET_COOKIE, HeaderValue::from_static("id=; Max-Age=0"))
            .into_response();
        assert_eq!(response.headers().get(SET_COOKIE).unwrap(), "id=; Max-Age=0");
    }
}
