//! # Eligibility Handlers
//!
//! Criteria storage and verification runs for a hackathon posting.

use axum::{
    body::Bytes,
    extract::{Path, State, rejection::JsonRejection},
    response::Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use super::json_body;
use crate::auth::Requester;
use crate::eligibility::{Criteria, DueResult, EligibilityResult};
use crate::error::{ApiError, validation_error};
use crate::server::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CriteriaBody {
    pub criteria: Option<Criteria>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    #[serde(default)]
    pub auto_accept: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VerifyResponse {
    pub results: Vec<EligibilityResult>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyDueResponse {
    pub processed_count: usize,
    pub results: Vec<DueResult>,
}

/// Read eligibility criteria for a posting
#[utoipa::path(
    get,
    path = "/hackathons/{id}/eligibility",
    params(("id" = String, Path, description = "Posting id")),
    responses(
        (status = 200, description = "Stored criteria, or null", body = CriteriaBody),
        (status = 404, description = "Posting not found", body = ApiError)
    ),
    tag = "eligibility"
)]
pub async fn get_criteria(
    State(state): State<AppState>,
    Path(posting_id): Path<String>,
) -> Result<Json<CriteriaBody>, ApiError> {
    let criteria = state.eligibility.get_criteria(&posting_id).await?;
    Ok(Json(CriteriaBody { criteria }))
}

/// Create or replace eligibility criteria for a posting
#[utoipa::path(
    post,
    path = "/hackathons/{id}/eligibility",
    params(("id" = String, Path, description = "Posting id")),
    request_body = CriteriaBody,
    responses(
        (status = 200, description = "Criteria saved", body = CriteriaBody),
        (status = 400, description = "Criteria missing", body = ApiError),
        (status = 404, description = "Posting not found", body = ApiError)
    ),
    tag = "eligibility"
)]
pub async fn save_criteria(
    State(state): State<AppState>,
    Path(posting_id): Path<String>,
    payload: Result<Json<CriteriaBody>, JsonRejection>,
) -> Result<Json<CriteriaBody>, ApiError> {
    let criteria = json_body(payload)?
        .criteria
        .ok_or_else(|| validation_error("criteria is required", json!({ "field": "criteria" })))?;
    let saved = state.eligibility.save_criteria(&posting_id, &criteria).await?;
    Ok(Json(CriteriaBody {
        criteria: Some(saved),
    }))
}

/// Evaluate every application of a posting, optionally accepting eligible ones
#[utoipa::path(
    post,
    path = "/hackathons/{id}/verify",
    params(
        ("id" = String, Path, description = "Posting id"),
        ("X-User-Id" = Option<String>, Header, description = "Must be the posting owner when autoAccept is true")
    ),
    request_body(content = VerifyRequest, description = "Optional; an empty or unreadable body means autoAccept=false"),
    responses(
        (status = 200, description = "Per-application results", body = VerifyResponse),
        (status = 403, description = "autoAccept requested by someone other than the posting owner", body = ApiError),
        (status = 404, description = "Posting not found", body = ApiError)
    ),
    tag = "eligibility"
)]
pub async fn verify(
    State(state): State<AppState>,
    Path(posting_id): Path<String>,
    requester: Option<Requester>,
    body: Bytes,
) -> Result<Json<VerifyResponse>, ApiError> {
    let request: VerifyRequest = serde_json::from_slice(&body).unwrap_or_default();
    let results = state
        .eligibility
        .verify(
            &posting_id,
            request.auto_accept,
            requester.as_ref().map(|r| r.0.as_str()),
        )
        .await?;
    Ok(Json(VerifyResponse { results }))
}

/// Evaluate applications of every posting whose registration has closed
#[utoipa::path(
    post,
    path = "/hackathons/verify-due",
    responses(
        (status = 200, description = "Sweep results", body = VerifyDueResponse),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "eligibility"
)]
pub async fn verify_due(State(state): State<AppState>) -> Result<Json<VerifyDueResponse>, ApiError> {
    let (processed_count, results) = state.eligibility.verify_due().await?;
    Ok(Json(VerifyDueResponse {
        processed_count,
        results,
    }))
}
