//! Local deterministic scorer
//!
//! Pure fallback used when no external provider produced a result. The same
//! inputs always yield the same score.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use super::types::{
    ApplicantScore, EnrichedApplicant, Provenance, TeamRequirement, sort_by_score_desc,
};

const SKILL_WEIGHT: f64 = 0.8;
const RESUME_TEXT_BONUS: f64 = 0.12;
const RESUME_LINK_BONUS: f64 = 0.06;
const GITHUB_BONUS: f64 = 0.05;

// Presence-only weights, used when the team declares no required skills.
const PRESENCE_RESUME: f64 = 5.0;
const PRESENCE_LINKEDIN: f64 = 2.0;
const PRESENCE_GITHUB: f64 = 2.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalScoreDetails {
    pub skill_match_count: usize,
    pub matched_skills: Vec<String>,
    pub resume_matches: Vec<String>,
    pub github_matches: Vec<String>,
    pub has_resume_text: bool,
    pub has_resume_url: bool,
    pub has_github: bool,
    pub has_linkedin: bool,
    pub presence_only: bool,
}

impl LocalScoreDetails {
    fn into_map(self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

/// Score every applicant locally, sorted by score descending.
pub fn score_all(team: &TeamRequirement, applicants: &[EnrichedApplicant]) -> Vec<ApplicantScore> {
    let required = normalize_skills(&team.required_skills);
    let mut results: Vec<ApplicantScore> = applicants
        .iter()
        .map(|applicant| {
            let (score, details) = score_applicant(&required, applicant);
            ApplicantScore {
                applicant_id: applicant.id().to_string(),
                score,
                details: details.into_map(),
                rated_skills: BTreeMap::new(),
                provenance: Provenance::Local,
            }
        })
        .collect();
    sort_by_score_desc(&mut results);
    results
}

/// Score a single applicant against already-normalized required skills.
pub fn score_applicant(required: &[String], applicant: &EnrichedApplicant) -> (f64, LocalScoreDetails) {
    let has_resume_text = applicant
        .resume_text
        .as_deref()
        .is_some_and(|text| !text.trim().is_empty());
    let has_resume_url = is_present(applicant.applicant.resume_url.as_deref());
    let has_linkedin = is_present(applicant.applicant.linkedin_url.as_deref());
    let has_github = applicant
        .github_repo_names
        .as_ref()
        .is_some_and(|names| !names.is_empty())
        || is_present(applicant.applicant.github_url.as_deref());

    if required.is_empty() {
        let points = presence(has_resume_text || has_resume_url) * PRESENCE_RESUME
            + presence(has_linkedin) * PRESENCE_LINKEDIN
            + presence(has_github) * PRESENCE_GITHUB;
        let max = PRESENCE_RESUME + PRESENCE_LINKEDIN + PRESENCE_GITHUB;
        let details = LocalScoreDetails {
            has_resume_text,
            has_resume_url,
            has_github,
            has_linkedin,
            presence_only: true,
            ..LocalScoreDetails::default()
        };
        return ((100.0 * points / max).round(), details);
    }

    let resume_matches = matches_in_text(required, applicant.resume_text.as_deref());
    let github_text = format!(
        "{} {}",
        applicant.github_profile_text.as_deref().unwrap_or_default(),
        applicant
            .github_repo_names
            .as_ref()
            .map(|names| names.join(" "))
            .unwrap_or_default()
    );
    let github_matches = matches_in_text(required, Some(&github_text));
    let declared = normalize_skills(&applicant.applicant.skills);
    let declared_matches: Vec<String> = required
        .iter()
        .filter(|skill| declared.contains(skill))
        .cloned()
        .collect();

    let mut matched_skills: Vec<String> = Vec::new();
    for skill in resume_matches
        .iter()
        .chain(github_matches.iter())
        .chain(declared_matches.iter())
    {
        if !matched_skills.contains(skill) {
            matched_skills.push(skill.clone());
        }
    }

    let skill_score = matched_skills.len() as f64 / required.len() as f64;
    let resume_bonus = if has_resume_text {
        RESUME_TEXT_BONUS
    } else if has_resume_url {
        RESUME_LINK_BONUS
    } else {
        0.0
    };
    let github_bonus = if has_github { GITHUB_BONUS } else { 0.0 };
    let raw = SKILL_WEIGHT * skill_score + resume_bonus + github_bonus;

    let details = LocalScoreDetails {
        skill_match_count: matched_skills.len(),
        matched_skills,
        resume_matches,
        github_matches,
        has_resume_text,
        has_resume_url,
        has_github,
        has_linkedin,
        presence_only: false,
    };
    ((raw.clamp(0.0, 1.0) * 100.0).round(), details)
}

/// Lower-case, trim and de-duplicate, dropping blanks.
pub fn normalize_skills(skills: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(skills.len());
    for skill in skills {
        let normalized = skill.trim().to_lowercase();
        if !normalized.is_empty() && !out.contains(&normalized) {
            out.push(normalized);
        }
    }
    out
}

fn matches_in_text(required: &[String], text: Option<&str>) -> Vec<String> {
    let Some(text) = text else {
        return Vec::new();
    };
    let haystack = text.to_lowercase();
    required
        .iter()
        .filter(|skill| haystack.contains(skill.as_str()))
        .cloned()
        .collect()
}

fn is_present(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

fn presence(flag: bool) -> f64 {
    if flag { 1.0 } else { 0.0 }
}
