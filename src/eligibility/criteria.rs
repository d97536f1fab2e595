//! Eligibility criteria schema
//!
//! `minOverlap` defaults to the number of required skills, or 1 when none are
//! declared. The overlap rule itself is skipped when no skills are required.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::scoring::local::normalize_skills;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Criteria {
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub allowed_email_domains: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_overlap: Option<u32>,
}

impl Criteria {
    /// Required skills, lower-cased and de-duplicated.
    pub fn normalized_required(&self) -> Vec<String> {
        normalize_skills(&self.required_skills)
    }

    /// Allowed domains, lower-cased with any leading `@` removed.
    pub fn normalized_domains(&self) -> Vec<String> {
        self.allowed_email_domains
            .iter()
            .map(|d| d.trim().trim_start_matches('@').to_lowercase())
            .filter(|d| !d.is_empty())
            .collect()
    }

    pub fn effective_min_overlap(&self) -> usize {
        match self.min_overlap {
            Some(min) => min as usize,
            None => self.normalized_required().len().max(1),
        }
    }
}

/// Count of required skills present in `declared`, case-insensitively.
pub fn skill_overlap(required: &[String], declared: &[String]) -> usize {
    let declared = normalize_skills(declared);
    required.iter().filter(|skill| declared.contains(skill)).count()
}
