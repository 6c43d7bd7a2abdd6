//! Clipboard text.

use std::sync::Arc;

use axum::{body::Body, http::Request};
use serde::{Deserialize, Serialize};

use crate::api::json;
use crate::http::{request::json_body, HttpError};
use crate::routing::{handler, Handler};
use crate::types::{DesktopError, DesktopManager};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipboardText {
    pub text: String,
}

fn clipboard_error(err: DesktopError) -> HttpError {
    match err {
        DesktopError::ClipboardUnavailable => HttpError::unavailable(err.to_string()),
        other => HttpError::internal().with_internal_err(other),
    }
}

/// `GET /room/clipboard`
pub fn read(desktop: Arc<dyn DesktopManager>) -> Handler {
    handler(move |_req: Request<Body>| {
        let text = desktop.clipboard_text();
        async move {
            let text = text.map_err(clipboard_error)?;
            json(ClipboardText { text })
        }
    })
}

/// `POST /room/clipboard`
pub fn write(desktop: Arc<dyn DesktopManager>) -> Handler {
    handler(move |req: Request<Body>| {
        let desktop = desktop.clone();
        async move {
            let data: ClipboardText = json_body(req).await?;
            desktop.set_clipboard_text(&data.text).map_err(clipboard_error)?;
            json(true)
        }
    })
}
