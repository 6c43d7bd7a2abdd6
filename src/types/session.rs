//! Session capability.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{request::Parts, HeaderMap};
use serde::{Deserialize, Serialize};

use super::member::MemberProfile;

/// Live state of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub is_connected: bool,
    pub is_watching: bool,
}

/// Opaque authenticated session.
pub trait Session: Send + Sync + fmt::Debug {
    fn id(&self) -> &str;
    fn profile(&self) -> MemberProfile;
    fn state(&self) -> SessionState;
}

/// Shared handle to a session, attached to authenticated requests.
pub type SessionHandle = Arc<dyn Session>;

/// Errors reported by the session store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("session not found")]
    NotFound,

    #[error("missing session token")]
    MissingToken,

    #[error("invalid session token")]
    InvalidToken,

    /// The member exists but may not log in with this session.
    #[error("login is disabled for this session")]
    LoginDisabled,

    #[error("session is already connected")]
    AlreadyConnected,

    #[error("session store timed out")]
    Timeout,

    #[error("session store error: {0}")]
    Other(String),
}

/// Room-wide settings owned by the session store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomSettings {
    pub private_mode: bool,
    pub locked_controls: bool,
    pub implicit_hosting: bool,
    pub inactive_cursors: bool,
    pub merciful_reconnect: bool,
}

/// Verifies request identity and manages the session cookie.
#[async_trait]
pub trait SessionManager: Send + Sync {
    /// Resolve the session the request belongs to.
    async fn authenticate(&self, req: &Parts) -> Result<SessionHandle, SessionError>;

    fn cookie_enabled(&self) -> bool;

    /// Write a `Set-Cookie` carrying `token` into the response headers.
    fn cookie_set_token(&self, headers: &mut HeaderMap, token: &str);

    /// Write a `Set-Cookie` expiring the session cookie into the response headers.
    fn cookie_clear_token(&self, headers: &mut HeaderMap, req: &Parts);

    fn list(&self) -> Vec<SessionHandle>;

    fn settings(&self) -> RoomSettings;

    fn update_settings(&self, settings: RoomSettings);
}
