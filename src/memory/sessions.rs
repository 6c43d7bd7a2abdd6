//! In-memory session store.
//!
//! # Token lookup order
//! 1. Session cookie (when cookies are enabled)
//! 2. `Authorization: Bearer <token>`
//! 3. `?token=<token>` query parameter

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use axum::http::{
    header::{AUTHORIZATION, SET_COOKIE},
    request::Parts,
    HeaderMap, HeaderValue,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use dashmap::DashMap;
use serde::Deserialize;
use time::Duration;
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::http::request::query_from_uri;
use crate::types::{
    MemberProfile, RoomSettings, Session, SessionError, SessionHandle, SessionManager, SessionState,
};

#[derive(Debug)]
pub struct MemorySession {
    id: String,
    profile: RwLock<MemberProfile>,
    state: RwLock<SessionState>,
}

impl MemorySession {
    fn new(id: &str, profile: MemberProfile) -> Self {
        Self {
            id: id.to_string(),
            profile: RwLock::new(profile),
            state: RwLock::new(SessionState::default()),
        }
    }

    pub fn set_profile(&self, profile: MemberProfile) {
        *self.profile.write().expect("session profile lock poisoned") = profile;
    }

    pub fn set_state(&self, state: SessionState) {
        *self.state.write().expect("session state lock poisoned") = state;
    }
}

impl Session for MemorySession {
    fn id(&self) -> &str {
        &self.id
    }

    fn profile(&self) -> MemberProfile {
        self.profile.read().expect("session profile lock poisoned").clone()
    }

    fn state(&self) -> SessionState {
        *self.state.read().expect("session state lock poisoned")
    }
}

#[derive(Debug, Default, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

pub struct MemorySessions {
    config: SessionConfig,
    /// Session id → session.
    sessions: DashMap<String, Arc<MemorySession>>,
    /// Token → session id.
    tokens: DashMap<String, String>,
    settings: RwLock<RoomSettings>,
}

impl MemorySessions {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            sessions: DashMap::new(),
            tokens: DashMap::new(),
            settings: RwLock::new(RoomSettings::default()),
        }
    }

    /// Open a session for member `id`, replacing any previous token.
    pub fn create(&self, id: &str, profile: MemberProfile) -> (Arc<MemorySession>, String) {
        self.tokens.retain(|_, owner| owner != id);

        let session = self
            .sessions
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(MemorySession::new(id, profile.clone())))
            .clone();
        session.set_profile(profile);

        let token = Uuid::new_v4().simple().to_string();
        self.tokens.insert(token.clone(), id.to_string());
        tracing::debug!(session_id = %id, "Session created");
        (session, token)
    }

    /// Drop the session and all of its tokens.
    pub fn delete(&self, id: &str) -> Result<(), SessionError> {
        self.tokens.retain(|_, owner| owner != id);
        self.sessions
            .remove(id)
            .map(|_| ())
            .ok_or(SessionError::NotFound)
    }

    pub fn get(&self, id: &str) -> Option<Arc<MemorySession>> {
        self.sessions.get(id).map(|s| s.value().clone())
    }

    fn token_from(&self, req: &Parts) -> Option<String> {
        if self.config.cookie_enabled {
            let jar = CookieJar::from_headers(&req.headers);
            if let Some(cookie) = jar.get(&self.config.cookie_name) {
                return Some(cookie.value_trimmed().to_string());
            }
        }

        let bearer = req
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(|v| v.trim().to_string());
        if bearer.is_some() {
            return bearer;
        }

        query_from_uri::<TokenQuery>(&req.uri).ok().and_then(|q| q.token)
    }

    fn cookie(&self, value: String) -> Cookie<'static> {
        Cookie::build((self.config.cookie_name.clone(), value))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(self.config.cookie_secure)
            .build()
    }
}

fn set_cookie(headers: &mut HeaderMap, cookie: Cookie<'_>) {
    match HeaderValue::from_str(&cookie.to_string()) {
        Ok(value) => {
            headers.append(SET_COOKIE, value);
        }
        Err(err) => tracing::warn!(error = %err, "Session cookie is not a valid header value"),
    }
}

#[async_trait]
impl SessionManager for MemorySessions {
    async fn authenticate(&self, req: &Parts) -> Result<SessionHandle, SessionError> {
        let token = self
            .token_from(req)
            .filter(|t| !t.is_empty())
            .ok_or(SessionError::MissingToken)?;

        let id = self
            .tokens
            .get(&token)
            .map(|id| id.value().clone())
            .ok_or(SessionError::InvalidToken)?;

        let session = self.get(&id).ok_or(SessionError::NotFound)?;
        if !session.profile().can_login {
            return Err(SessionError::LoginDisabled);
        }
        Ok(session)
    }

    fn cookie_enabled(&self) -> bool {
        self.config.cookie_enabled
    }

    fn cookie_set_token(&self, headers: &mut HeaderMap, token: &str) {
        let mut cookie = self.cookie(token.to_string());
        cookie.set_max_age(Duration::seconds(
            i64::try_from(self.config.cookie_expiration_secs).unwrap_or(i64::MAX),
        ));
        set_cookie(headers, cookie);
    }

    fn cookie_clear_token(&self, headers: &mut HeaderMap, _req: &Parts) {
        let mut cookie = self.cookie(String::new());
        cookie.make_removal();
        set_cookie(headers, cookie);
    }

    fn list(&self) -> Vec<SessionHandle> {
        self.sessions
            .iter()
            .map(|s| s.value().clone() as SessionHandle)
            .collect()
    }

    fn settings(&self) -> RoomSettings {
        self.settings.read().expect("room settings lock poisoned").clone()
    }

    fn update_settings(&self, settings: RoomSettings) {
        *self.settings.write().expect("room settings lock poisoned") = settings;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header::COOKIE, Request};

    fn parts(build: impl FnOnce(axum::http::request::Builder) -> axum::http::request::Builder) -> Parts {
        build(Request::builder().uri("/whoami"))
            .body(())
            .unwrap()
            .into_parts()
            .0
    }

    fn profile(can_login: bool) -> MemberProfile {
        MemberProfile {
            name: "alice".into(),
            can_login,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_authenticate_by_cookie_and_bearer() {
        let store = MemorySessions::new(SessionConfig::default());
        let (_, token) = store.create("alice", profile(true));

        let cookie = format!("other=1; {}={}", store.config.cookie_name, token);
        let req = parts(|b| b.header(COOKIE, cookie));
        assert_eq!(store.authenticate(&req).await.unwrap().id(), "alice");

        let req = parts(|b| b.header(AUTHORIZATION, format!("Bearer {}", token)));
        assert_eq!(store.authenticate(&req).await.unwrap().id(), "alice");
    }

    #[tokio::test]
    async fn test_authenticate_errors() {
        let store = MemorySessions::new(SessionConfig::default());

        let err = store.authenticate(&parts(|b| b)).await.unwrap_err();
        assert_eq!(err, SessionError::MissingToken);

        let req = parts(|b| b.header(AUTHORIZATION, "Bearer nope"));
        assert_eq!(store.authenticate(&req).await.unwrap_err(), SessionError::InvalidToken);

        let (_, token) = store.create("bob", profile(false));
        let req = parts(|b| b.uri(format!("/whoami?token={}", token)));
        assert_eq!(store.authenticate(&req).await.unwrap_err(), SessionError::LoginDisabled);
    }

    #[tokio::test]
    async fn test_create_rotates_token() {
        let store = MemorySessions::new(SessionConfig::default());
        let (_, first) = store.create("alice", profile(true));
        let (_, second) = store.create("alice", profile(true));
        assert_ne!(first, second);

        let req = parts(|b| b.header(AUTHORIZATION, format!("Bearer {}", first)));
        assert_eq!(store.authenticate(&req).await.unwrap_err(), SessionError::InvalidToken);
    }

    #[test]
    fn test_cookie_clear() {
        let store = MemorySessions::new(SessionConfig::default());
        let mut headers = HeaderMap::new();
        store.cookie_clear_token(&mut headers, &parts(|b| b));
        let value = headers.get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(value.starts_with(&format!("{}=;", store.config.cookie_name)));
        assert!(value.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn test_authenticate_quoted_cookie() {
        let store = MemorySessions::new(SessionConfig::default());
        let (_, token) = store.create("alice", profile(true));

        let req = parts(|b| b.header(COOKIE, format!("session_id=\"{}\"; theme=dark", token)));
        assert_eq!(store.authenticate(&req).await.unwrap().id(), "alice");
    }

    #[tokio::test]
    async fn test_query_token_is_decoded() {
        let store = MemorySessions::new(SessionConfig::default());
        let (_, token) = store.create("alice", profile(true));

        // Percent-encode the first character of the token.
        let encoded = format!("%{:02X}{}", token.as_bytes()[0], &token[1..]);
        let req = parts(|b| b.uri(format!("/whoami?token={}", encoded)));
        assert_eq!(store.authenticate(&req).await.unwrap().id(), "alice");
    }

    #[test]
    fn test_cookie_set() {
        let store = MemorySessions::new(SessionConfig {
            cookie_secure: true,
            ..Default::default()
        });
        let mut headers = HeaderMap::new();
        store.cookie_set_token(&mut headers, "abc");

        let cookie = Cookie::parse(headers.get(SET_COOKIE).unwrap().to_str().unwrap().to_string()).unwrap();
        assert_eq!(cookie.name(), "session_id");
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.max_age(), Some(Duration::seconds(86400)));
    }
}
