//! # Recommendation Repository
//!
//! SeaORM implementation of [`RecommendationStore`]. Upserts rely on the
//! unique `(team_id, applicant_id)` index.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::{Application, Recommendation, application, recommendation};
use crate::recommendations::{RecommendationStore, StoredScore};
use crate::scoring::{ApplicantScore, Provenance};

/// Repository for recommendation database operations
#[derive(Debug, Clone)]
pub struct RecommendationRepository {
    db: Arc<DatabaseConnection>,
}

impl RecommendationRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    fn to_stored(model: recommendation::Model) -> StoredScore {
        let matched_skills = model
            .details
            .get("matchedSkills")
            .map(crate::models::string_list)
            .unwrap_or_default();
        let rated_skills: BTreeMap<String, f64> = model
            .rated_skills
            .as_object()
            .map(|map| {
                map.iter()
                    .filter_map(|(skill, rating)| rating.as_f64().map(|r| (skill.clone(), r)))
                    .collect()
            })
            .unwrap_or_default();

        StoredScore {
            applicant_id: model.applicant_id,
            score: model.score,
            matched_skills,
            rated_skills,
            provenance: Provenance::parse(&model.provenance),
        }
    }
}

#[async_trait]
impl RecommendationStore for RecommendationRepository {
    async fn count_scores(&self, team_id: &str) -> Result<u64, RepositoryError> {
        Recommendation::find()
            .filter(recommendation::Column::TeamId.eq(team_id))
            .count(self.db.as_ref())
            .await
            .map_err(RepositoryError::database_error)
    }

    async fn count_applications(&self, team_id: &str) -> Result<u64, RepositoryError> {
        Application::find()
            .filter(application::Column::PostingId.eq(team_id))
            .count(self.db.as_ref())
            .await
            .map_err(RepositoryError::database_error)
    }

    async fn list_scores(
        &self,
        team_id: &str,
        applicant_ids: Option<&[String]>,
        limit: Option<u64>,
    ) -> Result<Vec<StoredScore>, RepositoryError> {
        let mut query = Recommendation::find().filter(recommendation::Column::TeamId.eq(team_id));
        if let Some(ids) = applicant_ids {
            query = query.filter(recommendation::Column::ApplicantId.is_in(ids.iter().cloned()));
        }

        let rows = query
            .order_by_desc(recommendation::Column::Score)
            .order_by_asc(recommendation::Column::ApplicantId)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(rows.into_iter().map(Self::to_stored).collect())
    }

    async fn upsert(&self, team_id: &str, score: &ApplicantScore) -> Result<(), RepositoryError> {
        let now = Utc::now().fixed_offset();
        let rated_skills: Map<String, Value> = score
            .rated_skills
            .iter()
            .map(|(skill, rating)| (skill.clone(), Value::from(*rating)))
            .collect();

        let row = recommendation::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            team_id: Set(team_id.to_string()),
            applicant_id: Set(score.applicant_id.clone()),
            score: Set(score.score),
            details: Set(Value::Object(score.details.clone())),
            rated_skills: Set(Value::Object(rated_skills)),
            provenance: Set(score.provenance.as_str().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Recommendation::insert(row)
            .on_conflict(
                OnConflict::columns([
                    recommendation::Column::TeamId,
                    recommendation::Column::ApplicantId,
                ])
                .update_columns([
                    recommendation::Column::Score,
                    recommendation::Column::Details,
                    recommendation::Column::RatedSkills,
                    recommendation::Column::Provenance,
                    recommendation::Column::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await
            .map_err(RepositoryError::database_error)?;

        tracing::debug!(team_id, applicant_id = %score.applicant_id, "Upserted recommendation");
        Ok(())
    }
}
