//! External scoring providers
//!
//! Each provider turns the batch prompt into raw reply text. Decoding the
//! reply into [`ApplicantScore`] records is shared and happens here, so a
//! provider never hands loosely-typed JSON further into the system.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use super::json_repair::{into_entries, parse_model_json};
use super::types::{ApplicantScore, Provenance, sort_by_score_desc};

pub mod gemini;
pub mod openai;

pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;

/// Errors raised while calling a provider. Always recovered by the orchestrator.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider returned status {status}")]
    Http { status: u16, body: Option<String> },
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("provider reply contained no text")]
    EmptyReply,
}

/// Result of a single provider attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderOutcome {
    Success(Vec<ApplicantScore>),
    /// Provider has no credentials configured
    Unavailable,
    Failed(String),
}

impl ProviderOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            ProviderOutcome::Success(_) => "success",
            ProviderOutcome::Unavailable => "unavailable",
            ProviderOutcome::Failed(_) => "failed",
        }
    }
}

#[async_trait]
pub trait ScoringProvider: Send + Sync {
    /// Provenance recorded on every score this provider produces
    fn provenance(&self) -> Provenance;

    fn is_configured(&self) -> bool;

    /// Send the prompt and return the raw reply text.
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError>;
}

/// Decode a raw reply into scores for the given batch.
///
/// Entries are dropped when their identifier cannot be resolved to an
/// applicant in the batch or repeats an earlier entry.
pub fn decode_reply(text: &str, batch_ids: &[String], provenance: Provenance) -> ProviderOutcome {
    let Some(parsed) = parse_model_json(text) else {
        return ProviderOutcome::Failed("reply was not parseable JSON".to_string());
    };
    let Some(entries) = into_entries(parsed) else {
        return ProviderOutcome::Failed("reply was neither an array nor an object".to_string());
    };

    let known: HashSet<&str> = batch_ids.iter().map(String::as_str).collect();
    let mut seen: HashSet<String> = HashSet::new();
    let mut scores: Vec<ApplicantScore> = Vec::with_capacity(entries.len());
    for entry in entries {
        let Some(score) = decode_entry(&entry, provenance) else {
            continue;
        };
        if !known.contains(score.applicant_id.as_str()) {
            tracing::debug!(applicant_id = %score.applicant_id, provider = %provenance, "Dropping score for unknown applicant");
            continue;
        }
        if seen.insert(score.applicant_id.clone()) {
            scores.push(score);
        }
    }

    if scores.is_empty() {
        return ProviderOutcome::Failed("reply contained no usable applicant entries".to_string());
    }
    sort_by_score_desc(&mut scores);
    ProviderOutcome::Success(scores)
}

fn decode_entry(entry: &Value, provenance: Provenance) -> Option<ApplicantScore> {
    let object = entry.as_object()?;
    let applicant_id = resolve_applicant_id(object)?;

    let score = object
        .get("score")
        .and_then(coerce_number)
        .unwrap_or(0.0)
        .clamp(0.0, 100.0);

    let mut details = object
        .get("details")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    for key in ["matchedSkills", "rationale"] {
        if let Some(value) = object.get(key)
            && !details.contains_key(key)
        {
            details.insert(key.to_string(), value.clone());
        }
    }

    let rated_skills = object
        .get("ratedSkills")
        .or_else(|| object.get("rated_skills"))
        .and_then(Value::as_object)
        .map(|ratings| {
            ratings
                .iter()
                .filter_map(|(skill, rating)| coerce_number(rating).map(|r| (skill.clone(), r)))
                .collect::<BTreeMap<_, _>>()
        })
        .unwrap_or_default();

    Some(ApplicantScore {
        applicant_id,
        score,
        details,
        rated_skills,
        provenance,
    })
}

fn resolve_applicant_id(object: &Map<String, Value>) -> Option<String> {
    let candidates = [
        object.get("applicantId"),
        object.get("id"),
        object
            .get("applicant")
            .and_then(Value::as_object)
            .and_then(|applicant| applicant.get("id")),
    ];
    candidates.into_iter().flatten().find_map(|value| match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

/// Keep at most `limit` characters of an upstream body for logs.
pub(crate) fn body_snippet(body: String, limit: usize) -> Option<String> {
    if body.is_empty() {
        return None;
    }
    if body.chars().count() > limit {
        let truncated: String = body.chars().take(limit).collect();
        Some(format!("{truncated}..."))
    } else {
        Some(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn resolves_identifier_aliases() {
        let reply = json!([
            {"applicantId": "a", "score": 10},
            {"id": "b", "score": 20},
            {"applicant": {"id": "c"}, "score": 30},
            {"score": 99}
        ])
        .to_string();

        let ProviderOutcome::Success(scores) =
            decode_reply(&reply, &ids(&["a", "b", "c"]), Provenance::Gemini)
        else {
            panic!("expected success");
        };
        let got: Vec<_> = scores.iter().map(|s| s.applicant_id.as_str()).collect();
        assert_eq!(got, vec!["c", "b", "a"]);
    }

    #[test]
    fn coerces_and_clamps_scores() {
        let reply = json!([
            {"applicantId": "a", "score": "87.5"},
            {"applicantId": "b", "score": 140},
            {"applicantId": "c", "score": "n/a"}
        ])
        .to_string();

        let ProviderOutcome::Success(scores) =
            decode_reply(&reply, &ids(&["a", "b", "c"]), Provenance::OpenAi)
        else {
            panic!("expected success");
        };
        assert_eq!(scores[0].score, 100.0);
        assert_eq!(scores[1].score, 87.5);
        assert_eq!(scores[2].score, 0.0);
        assert!(scores.iter().all(|s| s.provenance == Provenance::OpenAi));
    }

    #[test]
    fn reads_snake_case_ratings_and_top_level_matches() {
        let reply = json!({
            "applicantId": "a",
            "score": 70,
            "matchedSkills": ["rust"],
            "rated_skills": {"rust": 8, "go": "6", "vibes": "high"}
        })
        .to_string();

        let ProviderOutcome::Success(scores) = decode_reply(&reply, &ids(&["a"]), Provenance::Gemini)
        else {
            panic!("expected success");
        };
        assert_eq!(scores[0].matched_skills(), vec!["rust"]);
        assert_eq!(scores[0].rated_skills.get("go"), Some(&6.0));
        assert!(!scores[0].rated_skills.contains_key("vibes"));
    }

    #[test]
    fn unknown_and_duplicate_ids_are_dropped() {
        let reply = json!([
            {"applicantId": "a", "score": 10},
            {"applicantId": "a", "score": 90},
            {"applicantId": "ghost", "score": 50}
        ])
        .to_string();

        let ProviderOutcome::Success(scores) = decode_reply(&reply, &ids(&["a"]), Provenance::Gemini)
        else {
            panic!("expected success");
        };
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].score, 10.0);
    }

    #[test]
    fn unusable_replies_fail() {
        assert!(matches!(
            decode_reply("sorry, no", &ids(&["a"]), Provenance::Gemini),
            ProviderOutcome::Failed(_)
        ));
        assert!(matches!(
            decode_reply("[{\"score\": 5}]", &ids(&["a"]), Provenance::Gemini),
            ProviderOutcome::Failed(_)
        ));
        assert!(matches!(
            decode_reply("42", &ids(&["a"]), Provenance::Gemini),
            ProviderOutcome::Failed(_)
        ));
    }
}
