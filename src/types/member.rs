//! Member capability.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::session::{SessionError, SessionHandle};

/// Permissions and display data of a member.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemberProfile {
    pub name: String,
    pub is_admin: bool,
    pub can_login: bool,
    pub can_connect: bool,
    pub can_watch: bool,
    pub can_host: bool,
    pub can_access_clipboard: bool,
}

/// A stored member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub profile: MemberProfile,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MemberError {
    #[error("member not found")]
    NotFound,

    #[error("member already exists")]
    AlreadyExists,

    #[error("invalid password")]
    InvalidPassword,

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("member store error: {0}")]
    Other(String),
}

/// Member storage and login.
#[async_trait]
pub trait MemberManager: Send + Sync {
    /// Verify credentials and open a session. Returns the session and its token.
    async fn login(&self, username: &str, password: &str) -> Result<(SessionHandle, String), MemberError>;

    async fn logout(&self, session_id: &str) -> Result<(), MemberError>;

    async fn select_all(&self, limit: usize, offset: usize) -> Result<Vec<Member>, MemberError>;

    async fn select(&self, id: &str) -> Result<MemberProfile, MemberError>;

    /// Create a member and return its id.
    async fn insert(&self, username: &str, password: &str, profile: MemberProfile) -> Result<String, MemberError>;

    async fn update_profile(&self, id: &str, profile: MemberProfile) -> Result<(), MemberError>;

    async fn update_password(&self, id: &str, password: &str) -> Result<(), MemberError>;

    async fn delete(&self, id: &str) -> Result<(), MemberError>;
}
