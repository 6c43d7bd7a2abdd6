//! Bulk member operations.

use std::sync::Arc;

use axum::{body::Body, http::Request};
use serde::Deserialize;

use super::member_error;
use crate::api::json;
use crate::http::{request::json_body, HttpError};
use crate::routing::{handler, Handler};
use crate::types::{MemberManager, MemberProfile};

#[derive(Debug, Deserialize)]
pub struct BulkUpdateRequest {
    pub ids: Vec<String>,
    pub profile: MemberProfile,
}

#[derive(Debug, Deserialize)]
pub struct BulkDeleteRequest {
    pub ids: Vec<String>,
}

/// `POST /members_bulk/update`. Stops at the first failing member.
pub fn update(members: Arc<dyn MemberManager>) -> Handler {
    handler(move |req: Request<Body>| {
        let members = members.clone();
        async move {
            let data: BulkUpdateRequest = json_body(req).await?;
            for id in &data.ids {
                members
                    .update_profile(id, data.profile.clone())
                    .await
                    .map_err(|e| with_member(member_error(e), id))?;
            }
            tracing::info!(count = data.ids.len(), "Member profiles updated");
            json(true)
        }
    })
}

/// `POST /members_bulk/delete`. Stops at the first failing member.
pub fn delete(members: Arc<dyn MemberManager>) -> Handler {
    handler(move |req: Request<Body>| {
        let members = members.clone();
        async move {
            let data: BulkDeleteRequest = json_body(req).await?;
            for id in &data.ids {
                members
                    .delete(id)
                    .await
                    .map_err(|e| with_member(member_error(e), id))?;
            }
            tracing::info!(count = data.ids.len(), "Members deleted");
            json(true)
        }
    })
}

fn with_member(err: HttpError, id: &str) -> HttpError {
    let message = format!("{}: {}", id, err.message());
    let status = err.status();
    HttpError::new(status, message).with_internal_err(err)
}
