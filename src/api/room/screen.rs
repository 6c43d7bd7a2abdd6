//! Screen size and screenshots.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{
        header::{CACHE_CONTROL, CONTENT_TYPE},
        Request, StatusCode,
    },
    response::IntoResponse,
};
use serde::Deserialize;

use crate::api::json;
use crate::http::{
    request::{json_body, query},
    HttpError,
};
use crate::routing::{handler, Handler};
use crate::types::{CaptureError, CaptureManager, DesktopError, DesktopManager, ScreenSize};

/// JPEG quality used when the client does not ask for one.
pub const DEFAULT_SHOT_QUALITY: u8 = 90;

#[derive(Debug, Default, Deserialize)]
pub struct ShotQuery {
    pub quality: Option<u8>,
}

/// `GET /room/screen`
pub fn read(desktop: Arc<dyn DesktopManager>) -> Handler {
    handler(move |_req: Request<Body>| {
        let size = desktop.screen_size();
        async move { json(size) }
    })
}

/// `POST /room/screen`
pub fn update(desktop: Arc<dyn DesktopManager>) -> Handler {
    handler(move |req: Request<Body>| {
        let desktop = desktop.clone();
        async move {
            let requested: ScreenSize = json_body(req).await?;
            let applied = desktop.set_screen_size(requested).map_err(|e| match e {
                DesktopError::UnsupportedSize { .. } => {
                    HttpError::new(StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
                }
                other => HttpError::internal().with_internal_err(other),
            })?;
            tracing::info!(width = applied.width, height = applied.height, rate = applied.rate, "Screen size changed");
            json(applied)
        }
    })
}

/// `GET /room/screen/shot.jpg`
pub fn shot(capture: Arc<dyn CaptureManager>) -> Handler {
    handler(move |req: Request<Body>| {
        let capture = capture.clone();
        async move {
            let params: ShotQuery = query(&req)?;
            let quality = params.quality.unwrap_or(DEFAULT_SHOT_QUALITY);
            if quality > 100 {
                return Err(HttpError::bad_request(CaptureError::InvalidQuality(quality).to_string()));
            }

            let image = capture.screenshot(quality).await.map_err(|e| match e {
                CaptureError::Unavailable => HttpError::unavailable(e.to_string()),
                CaptureError::InvalidQuality(_) => HttpError::bad_request(e.to_string()),
                other => HttpError::internal().with_internal_err(other),
            })?;

            Ok((
                [(CONTENT_TYPE, "image/jpeg"), (CACHE_CONTROL, "no-store")],
                image,
            )
                .into_response())
        }
    })
}
