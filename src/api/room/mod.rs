//! Room sub-tree: settings, sessions, screen and clipboard.

pub mod clipboard;
pub mod screen;
pub mod settings;

use std::sync::Arc;

use axum::{body::Body, http::Request};

use super::json;
use super::session::SessionData;
use crate::auth;
use crate::routing::{handler, Handler, Router};
use crate::types::{CaptureManager, DesktopManager, SessionManager};

pub struct RoomHandler {
    sessions: Arc<dyn SessionManager>,
    desktop: Arc<dyn DesktopManager>,
    capture: Arc<dyn CaptureManager>,
}

impl RoomHandler {
    pub fn new(
        sessions: Arc<dyn SessionManager>,
        desktop: Arc<dyn DesktopManager>,
        capture: Arc<dyn CaptureManager>,
    ) -> Self {
        Self {
            sessions,
            desktop,
            capture,
        }
    }

    /// Routes mounted at `/room`.
    pub fn route(&self, r: &mut dyn Router) {
        r.route("/settings", &|r| {
            r.get("/", settings::read(self.sessions.clone()));
            r.group(&|r| {
                r.with(auth::admins_only());
                r.post("/", settings::update(self.sessions.clone()));
            });
        });

        r.group(&|r| {
            r.with(auth::admins_only());
            r.get("/sessions", self.sessions_list());
        });

        r.route("/screen", &|r| {
            r.get("/", screen::read(self.desktop.clone()));
            r.group(&|r| {
                r.with(auth::admins_only());
                r.post("/", screen::update(self.desktop.clone()));
                r.get("/shot.jpg", screen::shot(self.capture.clone()));
            });
        });

        r.route("/clipboard", &|r| {
            r.with(auth::clipboard_access());
            r.get("/", clipboard::read(self.desktop.clone()));
            r.post("/", clipboard::write(self.desktop.clone()));
        });
    }

    fn sessions_list(&self) -> Handler {
        let sessions = self.sessions.clone();
        handler(move |_req: Request<Body>| {
            let list: Vec<SessionData> = sessions
                .list()
                .into_iter()
                .map(|s| SessionData {
                    id: s.id().to_string(),
                    token: None,
                    profile: s.profile(),
                    state: s.state(),
                })
                .collect();
            async move { json(list) }
        })
    }
}
