//! Member management sub-tree.
//!
//! Thin dispatch onto [`MemberManager`]. Every route requires an admin
//! session.

pub mod bulk;

use std::sync::Arc;

use axum::{body::Body, http::Request};
use serde::Deserialize;

use super::json;
use crate::auth;
use crate::http::{
    request::{json_body, path_param, query},
    HttpError,
};
use crate::routing::{handler, Handler, Router};
use crate::types::{MemberError, MemberManager, MemberProfile};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListQuery {
    /// Zero means no limit.
    pub limit: usize,
    pub offset: usize,
}

#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub profile: MemberProfile,
}

#[derive(Debug, Deserialize)]
pub struct PasswordRequest {
    pub password: String,
}

pub(crate) fn member_error(err: MemberError) -> HttpError {
    match err {
        MemberError::NotFound => HttpError::not_found("member not found"),
        MemberError::AlreadyExists => HttpError::conflict("member already exists"),
        other => HttpError::internal().with_internal_err(other),
    }
}

pub struct MembersHandler {
    members: Arc<dyn MemberManager>,
}

impl MembersHandler {
    pub fn new(members: Arc<dyn MemberManager>) -> Self {
        Self { members }
    }

    /// Routes mounted at `/members`.
    pub fn route(&self, r: &mut dyn Router) {
        r.with(auth::admins_only());

        r.get("/", self.list());
        r.post("/", self.create());

        r.get("/{member_id}", self.read());
        r.post("/{member_id}", self.update_profile());
        r.delete("/{member_id}", self.delete());
        r.post("/{member_id}/password", self.update_password());
    }

    /// Routes mounted at `/members_bulk`.
    pub fn route_bulk(&self, r: &mut dyn Router) {
        r.with(auth::admins_only());

        r.post("/update", bulk::update(self.members.clone()));
        r.post("/delete", bulk::delete(self.members.clone()));
    }

    fn list(&self) -> Handler {
        let members = self.members.clone();
        handler(move |req: Request<Body>| {
            let members = members.clone();
            async move {
                let paging: ListQuery = query(&req)?;
                let list = members
                    .select_all(paging.limit, paging.offset)
                    .await
                    .map_err(member_error)?;
                json(list)
            }
        })
    }

    fn create(&self) -> Handler {
        let members = self.members.clone();
        handler(move |req: Request<Body>| {
            let members = members.clone();
            async move {
                let data: CreateRequest = json_body(req).await?;
                if data.username.is_empty() {
                    return Err(HttpError::bad_request("username must not be empty"));
                }
                if data.password.is_empty() {
                    return Err(HttpError::bad_request("password must not be empty"));
                }

                let id = members
                    .insert(&data.username, &data.password, data.profile.clone())
                    .await
                    .map_err(member_error)?;
                tracing::info!(member_id = %id, "Member created");

                json(crate::types::Member {
                    id,
                    profile: data.profile,
                })
            }
        })
    }

    fn read(&self) -> Handler {
        let members = self.members.clone();
        handler(move |mut req: Request<Body>| {
            let members = members.clone();
            async move {
                let id = path_param(&mut req).await?;
                let profile = members.select(&id).await.map_err(member_error)?;
                json(profile)
            }
        })
    }

    fn update_profile(&self) -> Handler {
        let members = self.members.clone();
        handler(move |mut req: Request<Body>| {
            let members = members.clone();
            async move {
                let id = path_param(&mut req).await?;
                let profile: MemberProfile = json_body(req).await?;
                members
                    .update_profile(&id, profile)
                    .await
                    .map_err(member_error)?;
                tracing::info!(member_id = %id, "Member profile updated");
                json(true)
            }
        })
    }

    fn update_password(&self) -> Handler {
        let members = self.members.clone();
        handler(move |mut req: Request<Body>| {
            let members = members.clone();
            async move {
                let id = path_param(&mut req).await?;
                let data: PasswordRequest = json_body(req).await?;
                if data.password.is_empty() {
                    return Err(HttpError::bad_request("password must not be empty"));
                }
                members
                    .update_password(&id, &data.password)
                    .await
                    .map_err(member_error)?;
                json(true)
            }
        })
    }

    fn delete(&self) -> Handler {
        let members = self.members.clone();
        handler(move |mut req: Request<Body>| {
            let members = members.clone();
            async move {
                let id = path_param(&mut req).await?;
                members.delete(&id).await.map_err(member_error)?;
                tracing::info!(member_id = %id, "Member deleted");
                json(true)
            }
        })
    }
}
