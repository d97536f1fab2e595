//! Persistence seam for score records

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::RepositoryError;
use crate::scoring::{ApplicantScore, Provenance};

/// A score as read back from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredScore {
    pub applicant_id: String,
    pub score: f64,
    pub matched_skills: Vec<String>,
    pub rated_skills: BTreeMap<String, f64>,
    /// `None` when the stored provenance tag is not recognised
    pub provenance: Option<Provenance>,
}

impl From<&ApplicantScore> for StoredScore {
    fn from(score: &ApplicantScore) -> Self {
        Self {
            applicant_id: score.applicant_id.clone(),
            score: score.score,
            matched_skills: score.matched_skills(),
            rated_skills: score.rated_skills.clone(),
            provenance: Some(score.provenance),
        }
    }
}

#[async_trait]
pub trait RecommendationStore: Send + Sync {
    /// Number of score records stored for the team.
    async fn count_scores(&self, team_id: &str) -> Result<u64, RepositoryError>;

    /// Number of applications against the team's posting.
    async fn count_applications(&self, team_id: &str) -> Result<u64, RepositoryError>;

    /// Stored scores for the team ordered by score descending, then applicant
    /// id. `applicant_ids` restricts the rows returned.
    async fn list_scores(
        &self,
        team_id: &str,
        applicant_ids: Option<&[String]>,
        limit: Option<u64>,
    ) -> Result<Vec<StoredScore>, RepositoryError>;

    /// Create or overwrite the record for `(team_id, score.applicant_id)`.
    async fn upsert(&self, team_id: &str, score: &ApplicantScore) -> Result<(), RepositoryError>;
}
