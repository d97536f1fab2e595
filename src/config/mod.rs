//! Configuration loading for the matchmaker service.
//!
//! Loads layered `.env` files and environment variables prefixed with
//! `MATCHMAKER_`, producing a typed [`AppConfig`].

use std::{
    collections::BTreeMap,
    env,
    net::SocketAddr,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

const ENV_PREFIX: &str = "MATCHMAKER_";
const REDACTED: &str = "[REDACTED]";

/// Application configuration derived from `MATCHMAKER_*` environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct AppConfig {
    #[serde(default = "default_profile")]
    pub profile: String,
    #[serde(default = "default_api_bind_addr")]
    pub api_bind_addr: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_format")]
    pub log_format: String,
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,
    #[serde(default = "default_db_acquire_timeout_ms")]
    pub db_acquire_timeout_ms: u64,
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
}

/// Outbound fetch settings for resume and GitHub enrichment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct EnrichmentConfig {
    /// Per-request timeout for GitHub calls (default: 8000)
    ///
    /// Environment variable: `MATCHMAKER_ENRICHMENT_TIMEOUT_MS`
    #[serde(default = "default_enrichment_timeout_ms")]
    pub timeout_ms: u64,

    /// Per-request timeout for resume downloads (default: 10000)
    ///
    /// Environment variable: `MATCHMAKER_RESUME_TIMEOUT_MS`
    #[serde(default = "default_resume_timeout_ms")]
    pub resume_timeout_ms: u64,

    /// Environment variable: `MATCHMAKER_GITHUB_API_BASE`
    #[serde(default = "default_github_api_base")]
    pub github_api_base: String,

    /// Optional token; unauthenticated calls are rate limited harder by GitHub
    ///
    /// Environment variable: `MATCHMAKER_GITHUB_TOKEN`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_token: Option<String>,

    /// Maximum repository names kept per profile (default: 50)
    ///
    /// Environment variable: `MATCHMAKER_GITHUB_REPO_LIMIT`
    #[serde(default = "default_github_repo_limit")]
    pub github_repo_limit: usize,

    /// Origin that relative resume links (`/uploads/cv.pdf`) are joined onto.
    /// Relative links are skipped when unset.
    ///
    /// Environment variable: `MATCHMAKER_RESUME_BASE_URL`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_base_url: Option<String>,
}

/// External scoring provider settings.
///
/// A provider without an API key is treated as unconfigured and skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ScoringConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gemini_api_key: Option<String>,
    #[serde(default = "default_gemini_api_base")]
    pub gemini_api_base: String,
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai_api_key: Option<String>,
    #[serde(default = "default_openai_api_base")]
    pub openai_api_base: String,
    #[serde(default = "default_openai_model")]
    pub openai_model: String,
    /// Per-call provider timeout (default: 20000)
    #[serde(default = "default_provider_timeout_ms")]
    pub provider_timeout_ms: u64,
    /// Resume/GitHub preview length embedded in the prompt (default: 800)
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            profile: default_profile(),
            api_bind_addr: default_api_bind_addr(),
            log_level: default_log_level(),
            log_format: default_log_format(),
            database_url: default_database_url(),
            db_max_connections: default_db_max_connections(),
            db_acquire_timeout_ms: default_db_acquire_timeout_ms(),
            enrichment: EnrichmentConfig::default(),
            scoring: ScoringConfig::default(),
        }
    }
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_enrichment_timeout_ms(),
            resume_timeout_ms: default_resume_timeout_ms(),
            github_api_base: default_github_api_base(),
            github_token: None,
            github_repo_limit: default_github_repo_limit(),
            resume_base_url: None,
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            gemini_api_base: default_gemini_api_base(),
            gemini_model: default_gemini_model(),
            openai_api_key: None,
            openai_api_base: default_openai_api_base(),
            openai_model: default_openai_model(),
            provider_timeout_ms: default_provider_timeout_ms(),
            preview_chars: default_preview_chars(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

impl EnrichmentConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn resume_timeout(&self) -> Duration {
        Duration::from_millis(self.resume_timeout_ms)
    }

    /// Validate enrichment bounds
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms == 0 || self.timeout_ms > 60_000 {
            return Err(ConfigError::InvalidTimeout {
                field: "ENRICHMENT_TIMEOUT_MS",
                value: self.timeout_ms,
            });
        }
        if self.resume_timeout_ms == 0 || self.resume_timeout_ms > 60_000 {
            return Err(ConfigError::InvalidTimeout {
                field: "RESUME_TIMEOUT_MS",
                value: self.resume_timeout_ms,
            });
        }
        if self.github_repo_limit == 0 || self.github_repo_limit > 100 {
            return Err(ConfigError::InvalidGithubRepoLimit {
                value: self.github_repo_limit,
            });
        }
        url::Url::parse(&self.github_api_base).map_err(|_| ConfigError::InvalidUrl {
            field: "GITHUB_API_BASE",
            value: self.github_api_base.clone(),
        })?;
        self.parsed_resume_base_url()?;
        Ok(())
    }

    pub fn parsed_resume_base_url(&self) -> Result<Option<url::Url>, ConfigError> {
        self.resume_base_url
            .as_deref()
            .map(|raw| {
                url::Url::parse(raw).map_err(|_| ConfigError::InvalidUrl {
                    field: "RESUME_BASE_URL",
                    value: raw.to_string(),
                })
            })
            .transpose()
    }
}

impl ScoringConfig {
    pub fn provider_timeout(&self) -> Duration {
        Duration::from_millis(self.provider_timeout_ms)
    }

    /// Validate scoring bounds; missing provider keys are allowed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.provider_timeout_ms == 0 || self.provider_timeout_ms > 120_000 {
            return Err(ConfigError::InvalidTimeout {
                field: "PROVIDER_TIMEOUT_MS",
                value: self.provider_timeout_ms,
            });
        }
        if self.preview_chars == 0 {
            return Err(ConfigError::InvalidPreviewChars {
                value: self.preview_chars,
            });
        }
        if self.max_output_tokens == 0 {
            return Err(ConfigError::InvalidMaxOutputTokens {
                value: self.max_output_tokens,
            });
        }
        for (field, value) in [
            ("GEMINI_API_BASE", &self.gemini_api_base),
            ("OPENAI_API_BASE", &self.openai_api_base),
        ] {
            url::Url::parse(value).map_err(|_| ConfigError::InvalidUrl {
                field,
                value: value.clone(),
            })?;
        }
        Ok(())
    }
}

impl AppConfig {
    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        self.api_bind_addr.parse()
    }

    /// Pretty JSON with API keys, tokens and the database password masked.
    pub fn redacted_json(&self) -> serde_json::Result<String> {
        let mut config = self.clone();
        if config.enrichment.github_token.is_some() {
            config.enrichment.github_token = Some(REDACTED.to_string());
        }
        if config.scoring.gemini_api_key.is_some() {
            config.scoring.gemini_api_key = Some(REDACTED.to_string());
        }
        if config.scoring.openai_api_key.is_some() {
            config.scoring.openai_api_key = Some(REDACTED.to_string());
        }
        if let Ok(mut url) = url::Url::parse(&config.database_url) {
            if url.password().is_some() && url.set_password(Some(REDACTED)).is_ok() {
                config.database_url = url.to_string();
            }
        }
        serde_json::to_string_pretty(&config)
    }

    /// Validates the configuration, returning an error on out-of-range settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !matches!(self.log_format.as_str(), "json" | "pretty") {
            return Err(ConfigError::InvalidLogFormat {
                value: self.log_format.clone(),
            });
        }
        if self.db_max_connections == 0 {
            return Err(ConfigError::InvalidDbMaxConnections {
                value: self.db_max_connections,
            });
        }

        self.enrichment.validate()?;
        self.scoring.validate()?;

        Ok(())
    }
}

fn default_profile() -> String {
    "local".to_string()
}

fn default_api_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_database_url() -> String {
    "sqlite://matchmaker.db?mode=rwc".to_string()
}

fn default_db_max_connections() -> u32 {
    10
}

fn default_db_acquire_timeout_ms() -> u64 {
    5000
}

fn default_enrichment_timeout_ms() -> u64 {
    8000
}

fn default_resume_timeout_ms() -> u64 {
    10_000
}

fn default_github_api_base() -> String {
    "https://api.github.com".to_string()
}

fn default_github_repo_limit() -> usize {
    50
}

fn default_gemini_api_base() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_gemini_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_openai_api_base() -> String {
    "https://api.openai.com".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_provider_timeout_ms() -> u64 {
    20_000
}

fn default_preview_chars() -> usize {
    800
}

fn default_max_output_tokens() -> u32 {
    800
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load environment file {path}: {source}")]
    EnvFile {
        path: PathBuf,
        source: dotenvy::Error,
    },
    #[error("invalid api bind address '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
    #[error("log format must be 'json' or 'pretty', got '{value}'")]
    InvalidLogFormat { value: String },
    #[error("database max connections must be positive, got {value}")]
    InvalidDbMaxConnections { value: u32 },
    #[error("{field} must be between 1 and its upper bound, got {value}")]
    InvalidTimeout { field: &'static str, value: u64 },
    #[error("GitHub repository limit must be between 1 and 100, got {value}")]
    InvalidGithubRepoLimit { value: usize },
    #[error("prompt preview length must be positive, got {value}")]
    InvalidPreviewChars { value: usize },
    #[error("provider max output tokens must be positive, got {value}")]
    InvalidMaxOutputTokens { value: u32 },
    #[error("{field} is not a valid URL: '{value}'")]
    InvalidUrl { field: &'static str, value: String },
}

/// Loads configuration using layered `.env` files and `MATCHMAKER_*` env vars.
pub struct ConfigLoader {
    base_dir: PathBuf,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            base_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// Loader reading env files from `base_dir` instead of the working directory.
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Loads `.env`, `.env.local`, `.env.{profile}`, `.env.{profile}.local`,
    /// then the process environment, later layers winning.
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let (mut layered, profile_hint) = self.read_env_files()?;

        layered.extend(env::vars().filter_map(|(key, value)| {
            key.strip_prefix(ENV_PREFIX).map(|name| (name.to_string(), value))
        }));

        let profile = take_string(&mut layered, "PROFILE").unwrap_or(profile_hint);

        let enrichment = EnrichmentConfig {
            timeout_ms: take_parsed(&mut layered, "ENRICHMENT_TIMEOUT_MS")
                .unwrap_or_else(default_enrichment_timeout_ms),
            resume_timeout_ms: take_parsed(&mut layered, "RESUME_TIMEOUT_MS")
                .unwrap_or_else(default_resume_timeout_ms),
            github_api_base: take_string(&mut layered, "GITHUB_API_BASE")
                .unwrap_or_else(default_github_api_base),
            github_token: take_secret(&mut layered, "GITHUB_TOKEN"),
            github_repo_limit: take_parsed(&mut layered, "GITHUB_REPO_LIMIT")
                .unwrap_or_else(default_github_repo_limit),
            resume_base_url: take_string(&mut layered, "RESUME_BASE_URL"),
        };

        let scoring = ScoringConfig {
            gemini_api_key: take_secret(&mut layered, "GEMINI_API_KEY"),
            gemini_api_base: take_string(&mut layered, "GEMINI_API_BASE")
                .unwrap_or_else(default_gemini_api_base),
            gemini_model: take_string(&mut layered, "GEMINI_MODEL")
                .unwrap_or_else(default_gemini_model),
            openai_api_key: take_secret(&mut layered, "OPENAI_API_KEY"),
            openai_api_base: take_string(&mut layered, "OPENAI_API_BASE")
                .unwrap_or_else(default_openai_api_base),
            openai_model: take_string(&mut layered, "OPENAI_MODEL")
                .unwrap_or_else(default_openai_model),
            provider_timeout_ms: take_parsed(&mut layered, "PROVIDER_TIMEOUT_MS")
                .unwrap_or_else(default_provider_timeout_ms),
            preview_chars: take_parsed(&mut layered, "PREVIEW_CHARS")
                .unwrap_or_else(default_preview_chars),
            max_output_tokens: take_parsed(&mut layered, "MAX_OUTPUT_TOKENS")
                .unwrap_or_else(default_max_output_tokens),
        };

        let config = AppConfig {
            profile,
            api_bind_addr: take_string(&mut layered, "API_BIND_ADDR")
                .unwrap_or_else(default_api_bind_addr),
            log_level: take_string(&mut layered, "LOG_LEVEL").unwrap_or_else(default_log_level),
            log_format: take_string(&mut layered, "LOG_FORMAT")
                .unwrap_or_else(default_log_format),
            database_url: take_string(&mut layered, "DATABASE_URL")
                .unwrap_or_else(default_database_url),
            db_max_connections: take_parsed(&mut layered, "DB_MAX_CONNECTIONS")
                .unwrap_or_else(default_db_max_connections),
            db_acquire_timeout_ms: take_parsed(&mut layered, "DB_ACQUIRE_TIMEOUT_MS")
                .unwrap_or_else(default_db_acquire_timeout_ms),
            enrichment,
            scoring,
        };

        config.validate()?;
        config
            .bind_addr()
            .map_err(|source| ConfigError::InvalidBindAddr {
                value: config.api_bind_addr.clone(),
                source,
            })?;
        Ok(config)
    }

    /// `.env` and `.env.local` first; their `PROFILE` (or the process one)
    /// picks which profile files layer on top.
    fn read_env_files(&self) -> Result<(BTreeMap<String, String>, String), ConfigError> {
        let mut layered = BTreeMap::new();
        for name in [".env", ".env.local"] {
            merge_env_file(&self.base_dir.join(name), &mut layered)?;
        }

        let profile = env::var(format!("{ENV_PREFIX}PROFILE"))
            .ok()
            .filter(|p| !p.trim().is_empty())
            .or_else(|| layered.get("PROFILE").cloned())
            .unwrap_or_else(default_profile);

        for name in [format!(".env.{profile}"), format!(".env.{profile}.local")] {
            merge_env_file(&self.base_dir.join(name), &mut layered)?;
        }
        Ok((layered, profile))
    }
}

/// Copy `MATCHMAKER_*` entries of one env file into `layered`; a missing file is skipped.
fn merge_env_file(path: &Path, layered: &mut BTreeMap<String, String>) -> Result<(), ConfigError> {
    let entries = match dotenvy::from_path_iter(path) {
        Ok(entries) => entries,
        Err(dotenvy::Error::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(source) => {
            return Err(ConfigError::EnvFile {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    for entry in entries {
        let (key, value) = entry.map_err(|source| ConfigError::EnvFile {
            path: path.to_path_buf(),
            source,
        })?;
        if let Some(name) = key.strip_prefix(ENV_PREFIX) {
            layered.insert(name.to_string(), value);
        }
    }
    Ok(())
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn take_string(values: &mut BTreeMap<String, String>, key: &str) -> Option<String> {
    values.remove(key).filter(|v| !v.is_empty())
}

fn take_secret(values: &mut BTreeMap<String, String>, key: &str) -> Option<String> {
    values
        .remove(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn take_parsed<T: std::str::FromStr>(values: &mut BTreeMap<String, String>, key: &str) -> Option<T> {
    values.remove(key).and_then(|v| v.trim().parse().ok())
}
