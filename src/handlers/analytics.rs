//! Posting analytics handler

use axum::{
    extract::{Path, State},
    response::Json,
};

use crate::eligibility::PostingAnalytics;
use crate::error::ApiError;
use crate::server::AppState;

/// Application counts and skill distribution for a posting
#[utoipa::path(
    get,
    path = "/hackathons/{id}/analytics",
    params(("id" = String, Path, description = "Posting id")),
    responses(
        (status = 200, description = "Posting analytics", body = PostingAnalytics),
        (status = 404, description = "Posting not found", body = ApiError)
    ),
    tag = "eligibility"
)]
pub async fn posting_analytics(
    State(state): State<AppState>,
    Path(posting_id): Path<String>,
) -> Result<Json<PostingAnalytics>, ApiError> {
    Ok(Json(state.eligibility.analytics(&posting_id).await?))
}
