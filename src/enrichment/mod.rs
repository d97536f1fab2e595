//! # Profile Enrichment
//!
//! Best-effort conversion of applicant references into scoring-ready text.
//! Every fetch carries its own timeout. Failures leave the corresponding
//! field absent and never fail the batch.

use futures::future::join_all;
use tracing::{debug, warn};
use url::Url;

use crate::config::EnrichmentConfig;
use crate::scoring::types::{ApplicantDescriptor, EnrichedApplicant};

pub mod github;
pub mod resume;

use github::{GitHubClient, GitHubSummary, extract_username};

#[derive(Debug, Clone)]
pub struct ProfileEnricher {
    client: reqwest::Client,
    config: EnrichmentConfig,
    resume_base: Option<Url>,
}

impl ProfileEnricher {
    pub fn new(client: reqwest::Client, config: EnrichmentConfig) -> Self {
        // An invalid base is rejected by config validation before we get here.
        let resume_base = config.parsed_resume_base_url().ok().flatten();
        Self {
            client,
            config,
            resume_base,
        }
    }

    /// Enrich every applicant concurrently, preserving input order.
    pub async fn enrich_all(&self, applicants: Vec<ApplicantDescriptor>) -> Vec<EnrichedApplicant> {
        join_all(applicants.into_iter().map(|a| self.enrich(a))).await
    }

    pub async fn enrich(&self, applicant: ApplicantDescriptor) -> EnrichedApplicant {
        let (resume_text, github) = tokio::join!(
            self.resume_text(&applicant),
            self.github_summary(&applicant)
        );
        let (github_profile_text, github_repo_names) = match github {
            Some(summary) => (Some(summary.profile_text), Some(summary.repo_names)),
            None => (None, None),
        };

        EnrichedApplicant {
            applicant,
            resume_text,
            github_profile_text,
            github_repo_names,
        }
    }

    async fn resume_text(&self, applicant: &ApplicantDescriptor) -> Option<String> {
        let raw = applicant.resume_url.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }
        let url = match resume::resolve_resume_url(raw, self.resume_base.as_ref()) {
            Ok(url) => url,
            Err(err) => {
                debug!(applicant_id = %applicant.id, error = %err, "Skipping resume link");
                return None;
            }
        };
        match resume::fetch_resume_text(&self.client, url, self.config.resume_timeout()).await {
            Ok(text) => text,
            Err(resume::ResumeFetchError::UnsupportedContentType(content_type)) => {
                debug!(applicant_id = %applicant.id, %content_type, "Resume is neither text nor PDF, skipping extraction");
                None
            }
            Err(err) => {
                warn!(applicant_id = %applicant.id, error = %err, "Resume enrichment failed");
                None
            }
        }
    }

    async fn github_summary(&self, applicant: &ApplicantDescriptor) -> Option<GitHubSummary> {
        let username = extract_username(applicant.github_url.as_deref()?)?;
        let github = GitHubClient {
            client: &self.client,
            api_base: &self.config.github_api_base,
            token: self.config.github_token.as_deref(),
            timeout: self.config.timeout(),
        };
        match github
            .fetch_summary(&username, self.config.github_repo_limit)
            .await
        {
            Ok(summary) => Some(summary),
            Err(err) => {
                warn!(applicant_id = %applicant.id, %username, error = %err, "GitHub enrichment failed");
                None
            }
        }
    }
}
