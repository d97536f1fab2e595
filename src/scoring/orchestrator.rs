//! External scoring orchestrator
//!
//! Tries providers strictly in priority order and stops at the first
//! success. Providers are never retried and never run concurrently.

use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use tracing::{debug, info, warn};

use super::prompt::build_prompt;
use super::providers::{
    GeminiProvider, OpenAiProvider, ProviderOutcome, ScoringProvider, decode_reply,
};
use super::types::{ApplicantScore, EnrichedApplicant, TeamRequirement};
use crate::config::ScoringConfig;

pub struct ScoringOrchestrator {
    providers: Vec<Arc<dyn ScoringProvider>>,
    preview_chars: usize,
}

impl ScoringOrchestrator {
    /// Providers are attempted in the order given.
    pub fn new(providers: Vec<Arc<dyn ScoringProvider>>, preview_chars: usize) -> Self {
        Self {
            providers,
            preview_chars,
        }
    }

    /// Gemini first, then OpenAI.
    pub fn from_config(client: reqwest::Client, config: &ScoringConfig) -> Self {
        Self::new(
            vec![
                Arc::new(GeminiProvider::new(client.clone(), config)),
                Arc::new(OpenAiProvider::new(client, config)),
            ],
            config.preview_chars,
        )
    }

    pub fn has_configured_provider(&self) -> bool {
        self.providers.iter().any(|p| p.is_configured())
    }

    /// Score the batch externally. `None` means no provider produced a usable
    /// result and the caller must fall back to local scoring.
    pub async fn score(
        &self,
        team: &TeamRequirement,
        applicants: &[EnrichedApplicant],
    ) -> Option<Vec<ApplicantScore>> {
        if applicants.is_empty() || !self.has_configured_provider() {
            return None;
        }

        let prompt = build_prompt(team, applicants, self.preview_chars);
        let batch_ids: Vec<String> = applicants.iter().map(|a| a.id().to_string()).collect();

        for provider in &self.providers {
            let outcome = attempt(provider.as_ref(), &prompt, &batch_ids).await;
            let name = provider.provenance().as_str();
            counter!(
                "matchmaker_provider_attempts_total",
                "provider" => name,
                "outcome" => outcome.label()
            )
            .increment(1);

            match outcome {
                ProviderOutcome::Success(scores) => {
                    info!(
                        provider = name,
                        team_id = team.id.as_deref().unwrap_or_default(),
                        scored = scores.len(),
                        "External scoring succeeded"
                    );
                    return Some(scores);
                }
                ProviderOutcome::Unavailable => {
                    debug!(provider = name, "Scoring provider not configured, skipping");
                }
                ProviderOutcome::Failed(reason) => {
                    warn!(provider = name, %reason, "Scoring provider failed, trying next");
                }
            }
        }

        None
    }
}

/// Run one provider and fold every failure into a [`ProviderOutcome`].
pub async fn attempt(
    provider: &dyn ScoringProvider,
    prompt: &str,
    batch_ids: &[String],
) -> ProviderOutcome {
    if !provider.is_configured() {
        return ProviderOutcome::Unavailable;
    }

    let started = Instant::now();
    let result = provider.generate(prompt).await;
    histogram!(
        "matchmaker_provider_latency_ms",
        "provider" => provider.provenance().as_str()
    )
    .record(started.elapsed().as_secs_f64() * 1_000.0);

    match result {
        Ok(text) => decode_reply(&text, batch_ids, provider.provenance()),
        Err(err) => ProviderOutcome::Failed(err.to_string()),
    }
}
