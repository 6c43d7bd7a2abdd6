//! Authenticated request context.
//!
//! The gate stores the resolved session in the request extensions. Handlers
//! and scoped guards read it back from there. The context lives exactly as
//! long as the request.

use axum::{body::Body, http::Request};

use crate::http::HttpError;
use crate::routing::{middleware, Middleware};
use crate::types::SessionHandle;

/// Session attached to a request that passed the gate.
#[derive(Clone, Debug)]
pub struct SessionContext(pub SessionHandle);

/// Attach `session` to the request.
pub fn set_session(mut req: Request<Body>, session: SessionHandle) -> Request<Body> {
    req.extensions_mut().insert(SessionContext(session));
    req
}

pub fn get_session(req: &Request<Body>) -> Option<SessionHandle> {
    req.extensions()
        .get::<SessionContext>()
        .map(|ctx| ctx.0.clone())
}

/// Session of an authenticated request, or Unauthorized if the gate did not run.
pub fn require_session(req: &Request<Body>) -> Result<SessionHandle, HttpError> {
    get_session(req).ok_or_else(|| {
        HttpError::unauthorized().with_internal_err("no session attached to request")
    })
}

/// Guard rejecting sessions without admin rights.
pub fn admins_only() -> Middleware {
    middleware(|req: Request<Body>| async move {
        let session = require_session(&req)?;
        if !session.profile().is_admin {
            return Err(HttpError::forbidden("session is not admin"));
        }
        Ok(req)
    })
}

/// Guard rejecting sessions without clipboard access.
pub fn clipboard_access() -> Middleware {
    middleware(|req: Request<Body>| async move {
        let session = require_session(&req)?;
        if !session.profile().can_access_clipboard {
            return Err(HttpError::forbidden("cannot access clipboard"));
        }
        Ok(req)
    })
}
