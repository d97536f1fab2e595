//! # API Handlers
//!
//! HTTP endpoint handlers for the matchmaker API.

use axum::{extract::rejection::JsonRejection, response::Json};
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::models::ServiceInfo;

pub mod analytics;
pub mod applications;
pub mod eligibility;
pub mod health;
pub mod recommendations;

/// Root handler that returns basic service information
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service information", body = ServiceInfo)
    ),
    tag = "root"
)]
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo::default())
}

/// Unwrap a JSON body, turning extractor rejections into problem+json errors.
pub(crate) fn json_body<T: DeserializeOwned>(
    payload: Result<Json<T>, JsonRejection>,
) -> Result<T, ApiError> {
    payload.map(|Json(body)| body).map_err(ApiError::from)
}
