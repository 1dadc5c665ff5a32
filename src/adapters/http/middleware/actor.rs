//! Actor extractors for axum.
//!
//! Identity is asserted by the upstream gateway through headers:
//!
//! ```text
//! X-User-Id: <uuid>
//! X-User-Role: admin        (optional)
//! ```
//!
//! - `RequireActor` - rejects with 401 when `X-User-Id` is missing or malformed
//! - `OptionalActor` - `None` when no identity was asserted

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::error::ErrorResponse;
use crate::domain::foundation::{Actor, UserId};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Extractor that requires an asserted identity.
#[derive(Debug, Clone)]
pub struct RequireActor(pub Actor);

/// Extractor for routes that also serve anonymous callers.
#[derive(Debug, Clone)]
pub struct OptionalActor(pub Option<Actor>);

#[async_trait]
impl<S> FromRequestParts<S> for RequireActor
where
    S: Send + Sync,
{
    type Rejection = ActorRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        actor_from_headers(&parts.headers)?
            .map(RequireActor)
            .ok_or(ActorRejection::Missing)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for OptionalActor
where
    S: Send + Sync,
{
    type Rejection = ActorRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        actor_from_headers(&parts.headers).map(OptionalActor)
    }
}

/// Reads the actor from request headers.
///
/// A present but unparseable user id is an error even for optional routes.
pub fn actor_from_headers(headers: &HeaderMap) -> Result<Option<Actor>, ActorRejection> {
    let Some(raw) = headers.get(USER_ID_HEADER) else {
        return Ok(None);
    };

    let user_id: UserId = raw
        .to_str()
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .ok_or(ActorRejection::Malformed)?;

    let is_admin = headers
        .get(USER_ROLE_HEADER)
        .and_then(|h| h.to_str().ok())
        .is_some_and(|role| role.trim().eq_ignore_ascii_case("admin"));

    Ok(Some(if is_admin {
        Actor::admin(user_id)
    } else {
        Actor::user(user_id)
    }))
}

/// Rejection for actor extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorRejection {
    Missing,
    Malformed,
}

impl IntoResponse for ActorRejection {
    fn into_response(self) -> Response {
        let message = match self {
            ActorRejection::Missing => "Missing X-User-Id header",
            ActorRejection::Malformed => "X-User-Id header is not a valid user id",
        };
        (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::new("UNAUTHORIZED", message)),
        )
            .into_response()
    }
}
