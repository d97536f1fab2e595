//! Recommendation service
//!
//! `score_all` never fails: cache lookups and persistence are best-effort,
//! and local scoring backs up the external providers.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use metrics::counter;
use serde::Serialize;
use tracing::{debug, info, warn};
use utoipa::ToSchema;

use super::store::{RecommendationStore, StoredScore};
use crate::enrichment::ProfileEnricher;
use crate::error::RepositoryError;
use crate::scoring::{
    ApplicantDescriptor, ApplicantScore, Provenance, ScoringOrchestrator, TeamRequirement, local,
};

/// Maximum rows returned by the cached read path.
pub const CACHED_TOP_N: u64 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationView {
    pub applicant_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_skills: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rated_skills: Option<BTreeMap<String, f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub provenance: Option<Provenance>,
}

impl RecommendationView {
    fn scored(score: &StoredScore) -> Self {
        Self {
            applicant_id: score.applicant_id.clone(),
            score: Some(score.score),
            matched_skills: Some(score.matched_skills.clone()),
            rated_skills: Some(score.rated_skills.clone()),
            provenance: score.provenance,
        }
    }

    fn id_only(applicant_id: &str) -> Self {
        Self {
            applicant_id: applicant_id.to_string(),
            score: None,
            matched_skills: None,
            rated_skills: None,
            provenance: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationSet {
    pub recommendations: Vec<RecommendationView>,
    pub top3: Vec<String>,
    pub show_scores: bool,
    pub from_cache: bool,
}

impl RecommendationSet {
    /// Build the outward-facing set for `requested` applicants.
    ///
    /// Scored applicants come first, by score descending with ties in request
    /// order, followed by unscored ones. Numbers are only revealed when every
    /// requested applicant has a score.
    fn for_request(requested: &[String], scores: &[StoredScore], from_cache: bool) -> Self {
        let position: HashMap<&str, usize> = requested
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect();
        let mut scored: Vec<&StoredScore> = scores
            .iter()
            .filter(|s| position.contains_key(s.applicant_id.as_str()))
            .collect();
        scored.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| position[a.applicant_id.as_str()].cmp(&position[b.applicant_id.as_str()]))
        });

        let scored_ids: HashSet<&str> = scored.iter().map(|s| s.applicant_id.as_str()).collect();
        let show_scores = !requested.is_empty() && scored_ids.len() == requested.len();

        let mut order: Vec<&str> = scored.iter().map(|s| s.applicant_id.as_str()).collect();
        order.extend(
            requested
                .iter()
                .map(String::as_str)
                .filter(|id| !scored_ids.contains(id)),
        );

        let recommendations = if show_scores {
            scored.into_iter().map(RecommendationView::scored).collect()
        } else {
            order.iter().map(|id| RecommendationView::id_only(id)).collect()
        };

        Self {
            top3: order.iter().take(3).map(|id| id.to_string()).collect(),
            recommendations,
            show_scores,
            from_cache,
        }
    }

    fn cached(scores: &[StoredScore]) -> Self {
        Self {
            recommendations: scores.iter().map(RecommendationView::scored).collect(),
            top3: scores.iter().take(3).map(|s| s.applicant_id.clone()).collect(),
            show_scores: true,
            from_cache: true,
        }
    }
}

pub struct RecommendationService {
    store: Arc<dyn RecommendationStore>,
    enricher: ProfileEnricher,
    orchestrator: Arc<ScoringOrchestrator>,
}

impl RecommendationService {
    pub fn new(
        store: Arc<dyn RecommendationStore>,
        enricher: ProfileEnricher,
        orchestrator: Arc<ScoringOrchestrator>,
    ) -> Self {
        Self {
            store,
            enricher,
            orchestrator,
        }
    }

    /// True when every application against the team has a stored score.
    async fn has_full_coverage(&self, team_id: &str) -> Result<bool, RepositoryError> {
        let applications = self.store.count_applications(team_id).await?;
        if applications == 0 {
            return Ok(false);
        }
        let scores = self.store.count_scores(team_id).await?;
        debug!(team_id, applications, scores, "Checked recommendation coverage");
        Ok(scores == applications)
    }

    /// Top cached scores for the team, or `None` when coverage is incomplete.
    pub async fn get(&self, team_id: &str) -> Result<Option<RecommendationSet>, RepositoryError> {
        if !self.has_full_coverage(team_id).await? {
            return Ok(None);
        }
        let scores = self
            .store
            .list_scores(team_id, None, Some(CACHED_TOP_N))
            .await?;
        counter!("matchmaker_recommendation_cache_total", "path" => "get", "result" => "hit")
            .increment(1);
        Ok(Some(RecommendationSet::cached(&scores)))
    }

    pub async fn upsert(&self, team_id: &str, score: &ApplicantScore) -> Result<(), RepositoryError> {
        self.store.upsert(team_id, score).await
    }

    async fn cached_for(&self, team_id: &str, requested: &[String]) -> Option<Vec<StoredScore>> {
        let lookup = async {
            if !self.has_full_coverage(team_id).await? {
                return Ok(None);
            }
            let stored = self.store.list_scores(team_id, Some(requested), None).await?;
            let complete = {
                let covered: HashSet<&str> = stored.iter().map(|s| s.applicant_id.as_str()).collect();
                requested.iter().all(|id| covered.contains(id.as_str()))
            };
            Ok::<_, RepositoryError>(complete.then_some(stored))
        };

        match lookup.await {
            Ok(hit) => hit,
            Err(err) => {
                warn!(team_id, error = %err, "Recommendation cache lookup failed, recomputing");
                None
            }
        }
    }

    /// Score the roster against the team, serving stored results when they
    /// fully cover the team.
    pub async fn score_all(
        &self,
        team: &TeamRequirement,
        applicants: Vec<ApplicantDescriptor>,
    ) -> RecommendationSet {
        let requested: Vec<String> = applicants.iter().map(|a| a.id.clone()).collect();
        let team_id = team.id.as_deref().filter(|id| !id.trim().is_empty());

        if let Some(team_id) = team_id {
            if let Some(stored) = self.cached_for(team_id, &requested).await {
                counter!("matchmaker_recommendation_cache_total", "path" => "score", "result" => "hit")
                    .increment(1);
                info!(team_id, applicants = requested.len(), "Serving recommendations from cache");
                return RecommendationSet::for_request(&requested, &stored, true);
            }
        }
        counter!("matchmaker_recommendation_cache_total", "path" => "score", "result" => "miss")
            .increment(1);

        let enriched = self.enricher.enrich_all(applicants).await;
        let scores = match self.orchestrator.score(team, &enriched).await {
            Some(scores) => scores,
            None => {
                counter!("matchmaker_local_fallback_total").increment(1);
                info!(team_id = team_id.unwrap_or("-"), "Falling back to local scoring");
                local::score_all(team, &enriched)
            }
        };

        if let Some(team_id) = team_id {
            for score in &scores {
                if let Err(err) = self.store.upsert(team_id, score).await {
                    warn!(
                        team_id,
                        applicant_id = %score.applicant_id,
                        error = %err,
                        "Failed to persist recommendation"
                    );
                }
            }
        }

        let stored: Vec<StoredScore> = scores.iter().map(StoredScore::from).collect();
        RecommendationSet::for_request(&requested, &stored, false)
    }
}
