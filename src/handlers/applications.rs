//! # Application Decision Handler

use axum::{
    extract::{Path, State, rejection::JsonRejection},
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::json_body;
use crate::auth::Requester;
use crate::eligibility::PostingSlots;
use crate::error::ApiError;
use crate::models::{ApplicationStatus, application};
use crate::server::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct DecisionRequest {
    /// `ACCEPTED` or `REJECTED`
    #[schema(example = "ACCEPTED")]
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationDto {
    pub id: String,
    pub candidate_id: String,
    pub posting_id: String,
    pub status: ApplicationStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl From<application::Model> for ApplicationDto {
    fn from(model: application::Model) -> Self {
        Self {
            id: model.id,
            candidate_id: model.candidate_id,
            posting_id: model.posting_id,
            status: model.status,
            created_at: model.created_at.to_rfc3339(),
            updated_at: model.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DecisionResponse {
    pub application: ApplicationDto,
    /// Slot count after an acceptance
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<PostingSlots>,
}

/// Accept or reject an application
#[utoipa::path(
    patch,
    path = "/applications/{id}",
    params(
        ("id" = String, Path, description = "Application id"),
        ("X-User-Id" = String, Header, description = "Requesting organizer")
    ),
    request_body = DecisionRequest,
    responses(
        (status = 200, description = "Decision recorded", body = DecisionResponse),
        (status = 400, description = "Invalid status, already decided, or no open slots", body = ApiError),
        (status = 403, description = "Requester does not own the posting", body = ApiError),
        (status = 404, description = "Application not found", body = ApiError)
    ),
    tag = "applications"
)]
pub async fn decide_application(
    State(state): State<AppState>,
    Path(application_id): Path<String>,
    Requester(requester): Requester,
    payload: Result<Json<DecisionRequest>, JsonRejection>,
) -> Result<Json<DecisionResponse>, ApiError> {
    let request = json_body(payload)?;
    let outcome = state
        .eligibility
        .decide(&application_id, &requester, request.status.trim())
        .await?;

    Ok(Json(DecisionResponse {
        application: outcome.application.into(),
        post: outcome.posting,
    }))
}
