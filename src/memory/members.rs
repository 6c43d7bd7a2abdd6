//! In-memory member store seeded from configuration.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use super::sessions::MemorySessions;
use crate::config::MemberConfig;
use crate::types::{Member, MemberError, MemberManager, MemberProfile, SessionError, SessionHandle};

#[derive(Debug, Clone)]
struct StoredMember {
    password: String,
    profile: MemberProfile,
}

/// Members keyed by username. The username doubles as member and session id.
pub struct MemoryMembers {
    sessions: Arc<MemorySessions>,
    members: RwLock<BTreeMap<String, StoredMember>>,
}

impl MemoryMembers {
    pub fn new(sessions: Arc<MemorySessions>, seed: &[MemberConfig]) -> Self {
        let members = seed
            .iter()
            .map(|m| {
                (
                    m.username.clone(),
                    StoredMember {
                        password: m.password.clone(),
                        profile: m.profile.clone(),
                    },
                )
            })
            .collect();

        Self {
            sessions,
            members: RwLock::new(members),
        }
    }

    fn lookup(&self, id: &str) -> Result<StoredMember, MemberError> {
        self.members
            .read()
            .expect("member store lock poisoned")
            .get(id)
            .cloned()
            .ok_or(MemberError::NotFound)
    }
}

#[async_trait]
impl MemberManager for MemoryMembers {
    async fn login(&self, username: &str, password: &str) -> Result<(SessionHandle, String), MemberError> {
        let member = self.lookup(username)?;
        if member.password != password {
            return Err(MemberError::InvalidPassword);
        }
        if !member.profile.can_login {
            return Err(SessionError::LoginDisabled.into());
        }

        let (session, token) = self.sessions.create(username, member.profile);
        let session: SessionHandle = session;
        Ok((session, token))
    }

    async fn logout(&self, session_id: &str) -> Result<(), MemberError> {
        self.sessions.delete(session_id).map_err(MemberError::from)
    }

    async fn select_all(&self, limit: usize, offset: usize) -> Result<Vec<Member>, MemberError> {
        let members = self.members.read().expect("member store lock poisoned");
        let limit = if limit == 0 { usize::MAX } else { limit };
        Ok(members
            .iter()
            .skip(offset)
            .take(limit)
            .map(|(id, m)| Member {
                id: id.clone(),
                profile: m.profile.clone(),
            })
            .collect())
    }

    async fn select(&self, id: &str) -> Result<MemberProfile, MemberError> {
        self.lookup(id).map(|m| m.profile)
    }

    async fn insert(&self, username: &str, password: &str, profile: MemberProfile) -> Result<String, MemberError> {
        let mut members = self.members.write().expect("member store lock poisoned");
        if members.contains_key(username) {
            return Err(MemberError::AlreadyExists);
        }
        members.insert(
            username.to_string(),
            StoredMember {
                password: password.to_string(),
                profile,
            },
        );
        Ok(username.to_string())
    }

    async fn update_profile(&self, id: &str, profile: MemberProfile) -> Result<(), MemberError> {
        {
            let mut members = self.members.write().expect("member store lock poisoned");
            let member = members.get_mut(id).ok_or(MemberError::NotFound)?;
            member.profile = profile.clone();
        }
        if let Some(session) = self.sessions.get(id) {
            session.set_profile(profile);
        }
        Ok(())
    }

    async fn update_password(&self, id: &str, password: &str) -> Result<(), MemberError> {
        let mut members = self.members.write().expect("member store lock poisoned");
        let member = members.get_mut(id).ok_or(MemberError::NotFound)?;
        member.password = password.to_string();
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), MemberError> {
        self.members
            .write()
            .expect("member store lock poisoned")
            .remove(id)
            .ok_or(MemberError::NotFound)?;
        // A member without a live session is fine.
        let _ = self.sessions.delete(id);
        Ok(())
    }
}
