//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{
    header::{AUTHORIZATION, SET_COOKIE},
    request::Parts,
    HeaderMap, HeaderValue, Method, Request, StatusCode,
};
use tower::ServiceExt;

use session_api::config::SessionConfig;
use session_api::memory::{HeadlessDesktop, MemoryMembers, MemorySessions, NoCapture};
use session_api::types::{
    Member, MemberError, MemberManager, MemberProfile, RoomSettings, Session, SessionError, SessionHandle,
    SessionManager, SessionState,
};
use session_api::Manager;

pub const CLEAR_COOKIE: &str = "session_id=; Max-Age=0";

#[derive(Debug)]
pub struct FakeSession {
    pub id: String,
    pub profile: MemberProfile,
}

impl Session for FakeSession {
    fn id(&self) -> &str {
        &self.id
    }

    fn profile(&self) -> MemberProfile {
        self.profile.clone()
    }

    fn state(&self) -> SessionState {
        SessionState::default()
    }
}

pub fn admin_profile() -> MemberProfile {
    MemberProfile {
        name: "Admin".into(),
        is_admin: true,
        can_login: true,
        can_access_clipboard: true,
        ..Default::default()
    }
}

pub fn user_profile() -> MemberProfile {
    MemberProfile {
        name: "User".into(),
        can_login: true,
        ..Default::default()
    }
}

/// Session store answering by bearer token:
/// `admin`, `user` succeed; `disabled` is login-disabled; `slow` never
/// answers in time; anything else is invalid.
pub struct ScriptedSessions {
    pub cookies: bool,
    pub authenticate_calls: AtomicUsize,
    pub cookie_clears: AtomicUsize,
}

impl ScriptedSessions {
    pub fn new(cookies: bool) -> Self {
        Self {
            cookies,
            authenticate_calls: AtomicUsize::new(0),
            cookie_clears: AtomicUsize::new(0),
        }
    }

    pub fn clears(&self) -> usize {
        self.cookie_clears.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionManager for ScriptedSessions {
    async fn authenticate(&self, req: &Parts) -> Result<SessionHandle, SessionError> {
        self.authenticate_calls.fetch_add(1, Ordering::SeqCst);
        let token = req
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or(SessionError::MissingToken)?;

        match token {
            "admin" => Ok(Arc::new(FakeSession {
                id: "admin".into(),
                profile: admin_profile(),
            })),
            "user" => Ok(Arc::new(FakeSession {
                id: "user".into(),
                profile: user_profile(),
            })),
            "disabled" => Err(SessionError::LoginDisabled),
            "slow" => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Err(SessionError::Other("woke up too late".into()))
            }
            _ => Err(SessionError::InvalidToken),
        }
    }

    fn cookie_enabled(&self) -> bool {
        self.cookies
    }

    fn cookie_set_token(&self, headers: &mut HeaderMap, token: &str) {
        let value = format!("session_id={}; Path=/", token);
        headers.append(SET_COOKIE, HeaderValue::from_str(&value).unwrap());
    }

    fn cookie_clear_token(&self, headers: &mut HeaderMap, _req: &Parts) {
        self.cookie_clears.fetch_add(1, Ordering::SeqCst);
        headers.append(SET_COOKIE, HeaderValue::from_static(CLEAR_COOKIE));
    }

    fn list(&self) -> Vec<SessionHandle> {
        Vec::new()
    }

    fn settings(&self) -> RoomSettings {
        RoomSettings::default()
    }

    fn update_settings(&self, _settings: RoomSettings) {}
}

/// Member store that only counts how often it is reached.
#[derive(Default)]
pub struct CountingMembers {
    pub calls: AtomicUsize,
}

impl CountingMembers {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl MemberManager for CountingMembers {
    async fn login(&self, _username: &str, _password: &str) -> Result<(SessionHandle, String), MemberError> {
        self.hit();
        Err(MemberError::InvalidPassword)
    }

    async fn logout(&self, _session_id: &str) -> Result<(), MemberError> {
        self.hit();
        Ok(())
    }

    async fn select_all(&self, _limit: usize, _offset: usize) -> Result<Vec<Member>, MemberError> {
        self.hit();
        Ok(Vec::new())
    }

    async fn select(&self, _id: &str) -> Result<MemberProfile, MemberError> {
        self.hit();
        Err(MemberError::NotFound)
    }

    async fn insert(&self, username: &str, _password: &str, _profile: MemberProfile) -> Result<String, MemberError> {
        self.hit();
        Ok(username.to_string())
    }

    async fn update_profile(&self, _id: &str, _profile: MemberProfile) -> Result<(), MemberError> {
        self.hit();
        Ok(())
    }

    async fn update_password(&self, _id: &str, _password: &str) -> Result<(), MemberError> {
        self.hit();
        Ok(())
    }

    async fn delete(&self, _id: &str) -> Result<(), MemberError> {
        self.hit();
        Ok(())
    }
}

/// Manager over scripted sessions and counting members.
pub struct Scripted {
    pub manager: Manager,
    pub sessions: Arc<ScriptedSessions>,
    pub members: Arc<CountingMembers>,
}

pub fn scripted(cookies: bool) -> Scripted {
    let sessions = Arc::new(ScriptedSessions::new(cookies));
    let members = Arc::new(CountingMembers::default());
    let manager = Manager::new(
        sessions.clone(),
        members.clone(),
        Arc::new(HeadlessDesktop::default()),
        Arc::new(NoCapture),
    )
    .with_auth_timeout(Duration::from_millis(100));

    Scripted {
        manager,
        sessions,
        members,
    }
}

/// Manager over the in-memory stores with an `admin` and a `user` member.
pub fn in_memory(cookies: bool) -> Manager {
    let config = SessionConfig {
        cookie_enabled: cookies,
        ..Default::default()
    };
    let sessions = Arc::new(MemorySessions::new(config));
    let seed = vec![
        session_api::config::MemberConfig {
            username: "admin".into(),
            password: "admin".into(),
            profile: admin_profile(),
        },
        session_api::config::MemberConfig {
            username: "user".into(),
            password: "user".into(),
            profile: user_profile(),
        },
    ];
    let members = Arc::new(MemoryMembers::new(sessions.clone(), &seed));
    Manager::new(
        sessions,
        members,
        Arc::new(HeadlessDesktop::default()),
        Arc::new(NoCapture),
    )
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("response body is not JSON")
    }

    pub fn set_cookies(&self) -> Vec<String> {
        self.headers
            .get_all(SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    }
}

/// Send one request through `router`.
pub async fn send(
    router: &axum::Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = router
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), 1 << 20).await.unwrap();

    TestResponse {
        status,
        headers,
        body: String::from_utf8(bytes.to_vec()).unwrap(),
    }
}

pub async fn get(router: &axum::Router, uri: &str, token: Option<&str>) -> TestResponse {
    send(router, Method::GET, uri, token, None).await
}

pub async fn post(
    router: &axum::Router,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> TestResponse {
    send(router, Method::POST, uri, token, Some(body)).await
}
