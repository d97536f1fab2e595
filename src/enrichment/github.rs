//! GitHub profile enrichment
//!
//! Resolves a username from a profile URL and pulls the public profile and
//! repository list. Both calls must succeed or neither field is filled.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GitHubFetchError {
    #[error("GitHub returned status {status} for {path}")]
    Status { status: u16, path: String },
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Public profile fields kept for scoring.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GitHubProfile {
    pub login: Option<String>,
    pub bio: Option<String>,
    pub name: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitHubRepo {
    name: String,
}

/// Compact GitHub summary attached to an enriched applicant.
#[derive(Debug, Clone, PartialEq)]
pub struct GitHubSummary {
    pub profile_text: String,
    pub repo_names: Vec<String>,
}

static USERNAME_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();

/// Extract the username segment from a GitHub URL.
pub fn extract_username(url: &str) -> Option<String> {
    USERNAME_PATTERN
        .get_or_init(|| Regex::new(r"(?i)github\.com/@?([^/?#\s]+)").ok())
        .as_ref()?
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|name| !name.is_empty())
}

pub struct GitHubClient<'a> {
    pub client: &'a reqwest::Client,
    pub api_base: &'a str,
    pub token: Option<&'a str>,
    pub timeout: std::time::Duration,
}

impl GitHubClient<'_> {
    pub async fn fetch_summary(
        &self,
        username: &str,
        repo_limit: usize,
    ) -> Result<GitHubSummary, GitHubFetchError> {
        let profile_path = format!("/users/{username}");
        let repos_path = format!("/users/{username}/repos?per_page=100");

        let (profile, repos) = tokio::try_join!(
            self.get_json::<GitHubProfile>(&profile_path),
            self.get_json::<Vec<GitHubRepo>>(&repos_path),
        )?;

        let profile_text = serde_json::to_string(&profile).unwrap_or_default();
        let repo_names = repos
            .into_iter()
            .map(|repo| repo.name)
            .take(repo_limit)
            .collect();

        Ok(GitHubSummary {
            profile_text,
            repo_names,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, GitHubFetchError> {
        let mut request = self
            .client
            .get(format!("{}{}", self.api_base.trim_end_matches('/'), path))
            .header("User-Agent", concat!("matchmaker/", env!("CARGO_PKG_VERSION")))
            .header("Accept", "application/vnd.github+json")
            .timeout(self.timeout);
        if let Some(token) = self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(GitHubFetchError::Status {
                status: response.status().as_u16(),
                path: path.to_string(),
            });
        }
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_username_from_common_shapes() {
        for (url, expected) in [
            ("https://github.com/octocat", Some("octocat")),
            ("https://www.github.com/octocat/", Some("octocat")),
            ("github.com/@octocat?tab=repositories", Some("octocat")),
            ("https://GitHub.com/Octo-Cat#readme", Some("Octo-Cat")),
            ("https://gitlab.com/octocat", None),
            ("https://github.com/", None),
        ] {
            assert_eq!(extract_username(url).as_deref(), expected, "{url}");
        }
    }
}
