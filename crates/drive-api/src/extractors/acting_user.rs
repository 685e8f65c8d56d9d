//! `ActingUser` extractor: reads the authenticated principal supplied by the
//! upstream authentication layer and builds a [`RequestContext`].

use std::str::FromStr;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use drive_core::error::AppError;
use drive_service::RequestContext;

use crate::error::ApiError;

/// Header carrying the acting user's id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Header carrying the acting user's tenant id.
pub const TENANT_ID_HEADER: &str = "x-tenant-id";

/// Request context of the acting user, available in handlers.
#[derive(Debug, Clone, Copy)]
pub struct ActingUser(pub RequestContext);

impl std::ops::Deref for ActingUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for ActingUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = header_id(parts, USER_ID_HEADER)?;
        let tenant_id = header_id(parts, TENANT_ID_HEADER)?;
        Ok(Self(RequestContext::new(user_id, tenant_id)))
    }
}

fn header_id<T: FromStr>(parts: &Parts, name: &str) -> Result<T, ApiError> {
    let value = parts
        .headers
        .get(name)
        .ok_or_else(|| AppError::invalid_input(format!("Missing {name} header")))?;

    value
        .to_str()
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .ok_or_else(|| AppError::invalid_input(format!("Invalid {name} header")).into())
}
