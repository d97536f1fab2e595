//! # Requester Identity
//!
//! Session handling lives in the fronting application, which forwards the
//! authenticated user id in `X-User-Id`. Ownership checks compare against it.

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::request::Parts,
};

use crate::error::{ApiError, forbidden};

pub const USER_ID_HEADER: &str = "x-user-id";

/// Identity of the user making the request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requester(pub String);

fn requester_from(parts: &Parts) -> Option<Requester> {
    parts
        .headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|user_id| Requester(user_id.to_string()))
}

impl<S> FromRequestParts<S> for Requester
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        requester_from(parts).ok_or_else(|| forbidden("Missing requester identity"))
    }
}

/// `Option<Requester>` for routes where identity only matters for some inputs.
impl<S> OptionalFromRequestParts<S> for Requester
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(requester_from(parts))
    }
}
