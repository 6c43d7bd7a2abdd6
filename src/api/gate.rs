//! Authentication gate.
//!
//! Turns a raw request into an authenticated one or a classified failure.
//! Runs once per request entering the authenticated group, before the
//! matched handler.

use std::time::Duration;

use axum::{
    body::Body,
    http::{HeaderMap, Request},
};

use crate::auth;
use crate::http::HttpError;
use crate::observability::metrics;
use crate::types::{SessionError, SessionManager};

/// Public message for sessions whose login is disabled.
pub const LOGIN_DISABLED_MESSAGE: &str = "login is disabled for this session";

/// Authenticate `req` against `sessions`.
///
/// On failure the session cookie is cleared (when cookies are enabled) by
/// collecting the store's `Set-Cookie` onto the returned error. A store that
/// does not answer within `timeout` is treated like any other failure.
pub async fn authenticate(
    sessions: &dyn SessionManager,
    timeout: Duration,
    req: Request<Body>,
) -> Result<Request<Body>, HttpError> {
    let (parts, body) = req.into_parts();

    let result = match tokio::time::timeout(timeout, sessions.authenticate(&parts)).await {
        Ok(result) => result,
        Err(_) => Err(SessionError::Timeout),
    };

    let err = match result {
        Ok(session) => {
            tracing::trace!(session_id = %session.id(), path = %parts.uri.path(), "Request authenticated");
            return Ok(auth::set_session(Request::from_parts(parts, body), session));
        }
        Err(err) => err,
    };

    let mut headers = HeaderMap::new();
    if sessions.cookie_enabled() {
        sessions.cookie_clear_token(&mut headers, &parts);
    }

    let rejection = if matches!(err, SessionError::LoginDisabled) {
        metrics::record_auth_failure("login_disabled");
        HttpError::forbidden(LOGIN_DISABLED_MESSAGE)
    } else {
        metrics::record_auth_failure("unauthorized");
        HttpError::unauthorized().with_internal_err(err)
    };

    Err(rejection.with_headers(headers))
}
