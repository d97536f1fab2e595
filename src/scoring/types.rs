//! Shared scoring types
//!
//! Request-side descriptors for teams and applicants, the enriched applicant
//! profile and the strict per-applicant score record every scorer produces.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// Team requirement as supplied by the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamRequirement {
    /// Posting identifier; also the cache key for stored scores
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, alias = "skills")]
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub team_name: Option<String>,
    #[serde(default)]
    pub hackathon_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub experience: Option<String>,
}

/// Applicant reference as supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantDescriptor {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub resume_url: Option<String>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
    #[serde(default)]
    pub github_url: Option<String>,
}

/// Applicant after best-effort enrichment. Absent fields mean the fetch was
/// skipped or failed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnrichedApplicant {
    pub applicant: ApplicantDescriptor,
    pub resume_text: Option<String>,
    pub github_profile_text: Option<String>,
    pub github_repo_names: Option<Vec<String>>,
}

impl EnrichedApplicant {
    /// Wrap a descriptor with no enrichment applied.
    pub fn bare(applicant: ApplicantDescriptor) -> Self {
        Self {
            applicant,
            ..Self::default()
        }
    }

    pub fn id(&self) -> &str {
        &self.applicant.id
    }
}

/// Which scorer produced a score record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Gemini,
    OpenAi,
    Local,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::Gemini => "gemini",
            Provenance::OpenAi => "openai",
            Provenance::Local => "local",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "gemini" => Some(Provenance::Gemini),
            "openai" => Some(Provenance::OpenAi),
            "local" => Some(Provenance::Local),
            _ => None,
        }
    }
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One applicant's score, independent of the scorer that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicantScore {
    pub applicant_id: String,
    /// 0-100
    pub score: f64,
    /// Free-form breakdown; `matchedSkills` is the only key read back
    pub details: Map<String, Value>,
    pub rated_skills: BTreeMap<String, f64>,
    pub provenance: Provenance,
}

impl ApplicantScore {
    pub fn matched_skills(&self) -> Vec<String> {
        self.details
            .get("matchedSkills")
            .map(crate::models::string_list)
            .unwrap_or_default()
    }
}

/// Sort by score descending. Stable, so equal scores keep input order.
pub fn sort_by_score_desc(scores: &mut [ApplicantScore]) {
    scores.sort_by(|a, b| b.score.total_cmp(&a.score));
}
