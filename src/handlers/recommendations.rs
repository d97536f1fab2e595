//! # Recommendation Handlers

use std::collections::HashSet;

use axum::{
    extract::{Query, State, rejection::{JsonRejection, QueryRejection}},
    response::Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use super::json_body;
use crate::error::{ApiError, bad_request, validation_error};
use crate::recommendations::RecommendationSet;
use crate::scoring::{ApplicantDescriptor, TeamRequirement};
use crate::server::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RecommendationRequest {
    pub team: Option<TeamRequirement>,
    #[serde(default)]
    pub applicants: Vec<ApplicantDescriptor>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct RecommendationQuery {
    /// Posting the scores were stored under
    pub team_id: Option<String>,
}

/// `found: false` alone when stored scores do not cover every application.
#[derive(Debug, Serialize, ToSchema)]
pub struct CachedRecommendations {
    pub found: bool,
    #[serde(flatten)]
    pub set: Option<RecommendationSet>,
}

/// Drop repeated applicant ids, keeping the first occurrence.
fn dedupe_applicants(applicants: Vec<ApplicantDescriptor>) -> Result<Vec<ApplicantDescriptor>, ApiError> {
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(applicants.len());
    for (index, mut applicant) in applicants.into_iter().enumerate() {
        applicant.id = applicant.id.trim().to_string();
        if applicant.id.is_empty() {
            return Err(validation_error(
                "Every applicant needs an id",
                json!({ "field": format!("applicants[{index}].id") }),
            ));
        }
        if seen.insert(applicant.id.clone()) {
            unique.push(applicant);
        }
    }
    Ok(unique)
}

/// Score applicants against a team
#[utoipa::path(
    post,
    path = "/recommendations",
    request_body = RecommendationRequest,
    responses(
        (status = 200, description = "Ranked recommendations", body = RecommendationSet),
        (status = 400, description = "Missing team or applicants", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "recommendations"
)]
pub async fn score_recommendations(
    State(state): State<AppState>,
    payload: Result<Json<RecommendationRequest>, JsonRejection>,
) -> Result<Json<RecommendationSet>, ApiError> {
    let request = json_body(payload)?;
    let team = request
        .team
        .ok_or_else(|| validation_error("team is required", json!({ "field": "team" })))?;
    if request.applicants.is_empty() {
        return Err(validation_error(
            "applicants must not be empty",
            json!({ "field": "applicants" }),
        ));
    }
    let applicants = dedupe_applicants(request.applicants)?;

    let set = state.recommendations.score_all(&team, applicants).await;
    Ok(Json(set))
}

/// Read stored recommendations for a team
#[utoipa::path(
    get,
    path = "/recommendations",
    params(RecommendationQuery),
    responses(
        (status = 200, description = "Cached top recommendations, or found=false", body = CachedRecommendations),
        (status = 400, description = "Missing teamId", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "recommendations"
)]
pub async fn cached_recommendations(
    State(state): State<AppState>,
    query: Result<Query<RecommendationQuery>, QueryRejection>,
) -> Result<Json<CachedRecommendations>, ApiError> {
    let Query(query) = query?;
    let team_id = query
        .team_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| bad_request("teamId is required"))?;

    let set = state.recommendations.get(team_id).await?;
    Ok(Json(CachedRecommendations {
        found: set.is_some(),
        set,
    }))
}
