//! Room settings.

use std::sync::Arc;

use axum::{body::Body, http::Request};

use crate::api::json;
use crate::auth;
use crate::http::request::json_body;
use crate::routing::{handler, Handler};
use crate::types::{RoomSettings, SessionManager};

/// `GET /room/settings`
pub fn read(sessions: Arc<dyn SessionManager>) -> Handler {
    handler(move |_req: Request<Body>| {
        let settings = sessions.settings();
        async move { json(settings) }
    })
}

/// `POST /room/settings`
pub fn update(sessions: Arc<dyn SessionManager>) -> Handler {
    handler(move |req: Request<Body>| {
        let sessions = sessions.clone();
        async move {
            let session = auth::require_session(&req)?;
            let settings: RoomSettings = json_body(req).await?;
            sessions.update_settings(settings);
            tracing::info!(session_id = %session.id(), "Room settings updated");
            json(true)
        }
    })
}
