//! Login, logout and whoami.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{HeaderMap, Request, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use super::gate::LOGIN_DISABLED_MESSAGE;
use super::json;
use crate::auth;
use crate::http::{request::json_body, HttpError};
use crate::routing::{handler, Handler};
use crate::types::{MemberError, MemberManager, MemberProfile, SessionError, SessionManager, SessionState};

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Session data returned by login and whoami.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionData {
    pub id: String,
    /// Only present when the token is not delivered as a cookie.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub profile: MemberProfile,
    pub state: SessionState,
}

fn login_error(err: MemberError) -> HttpError {
    match err {
        MemberError::NotFound | MemberError::InvalidPassword => {
            HttpError::new(StatusCode::UNAUTHORIZED, "wrong username or password")
        }
        MemberError::Session(SessionError::LoginDisabled) => HttpError::forbidden(LOGIN_DISABLED_MESSAGE),
        MemberError::Session(SessionError::AlreadyConnected) => {
            HttpError::conflict("session is already connected")
        }
        other => HttpError::internal().with_internal_err(other),
    }
}

/// `POST /login`
pub fn login(sessions: Arc<dyn SessionManager>, members: Arc<dyn MemberManager>) -> Handler {
    handler(move |req: Request<Body>| {
        let sessions = sessions.clone();
        let members = members.clone();
        async move {
            let data: LoginRequest = json_body(req).await?;
            let (session, token) = members
                .login(&data.username, &data.password)
                .await
                .map_err(login_error)?;

            tracing::info!(session_id = %session.id(), "Session logged in");

            let mut headers = HeaderMap::new();
            let token = if sessions.cookie_enabled() {
                sessions.cookie_set_token(&mut headers, &token);
                None
            } else {
                Some(token)
            };

            let body = SessionData {
                id: session.id().to_string(),
                token,
                profile: session.profile(),
                state: session.state(),
            };
            Ok((headers, Json(body)).into_response())
        }
    })
}

/// `POST /logout`
pub fn logout(sessions: Arc<dyn SessionManager>, members: Arc<dyn MemberManager>) -> Handler {
    handler(move |req: Request<Body>| {
        let sessions = sessions.clone();
        let members = members.clone();
        async move {
            let session = auth::require_session(&req)?;
            members
                .logout(session.id())
                .await
                .map_err(|e| HttpError::internal().with_internal_err(e))?;

            tracing::info!(session_id = %session.id(), "Session logged out");

            let mut headers = HeaderMap::new();
            if sessions.cookie_enabled() {
                let (parts, _body) = req.into_parts();
                sessions.cookie_clear_token(&mut headers, &parts);
            }
            Ok((headers, Json(true)).into_response())
        }
    })
}

/// `GET /whoami`
pub fn whoami() -> Handler {
    handler(|req: Request<Body>| async move {
        let session = auth::require_session(&req)?;
        json(SessionData {
            id: session.id().to_string(),
            token: None,
            profile: session.profile(),
            state: session.state(),
        })
    })
}
