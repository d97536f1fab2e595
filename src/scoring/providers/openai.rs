//! OpenAI chat completions provider

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::{ProviderError, ScoringProvider, body_snippet};
use crate::config::ScoringConfig;
use crate::scoring::types::Provenance;

#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: Option<String>,
    api_base: String,
    model: String,
    max_output_tokens: u32,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<Message>,
    /// Legacy completions shape
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: Option<String>,
}

impl OpenAiProvider {
    pub fn new(client: reqwest::Client, config: &ScoringConfig) -> Self {
        Self {
            client,
            api_key: config.openai_api_key.clone(),
            api_base: config.openai_api_base.trim_end_matches('/').to_string(),
            model: config.openai_model.clone(),
            max_output_tokens: config.max_output_tokens,
            timeout: config.provider_timeout(),
        }
    }
}

#[async_trait]
impl ScoringProvider for OpenAiProvider {
    fn provenance(&self) -> Provenance {
        Provenance::OpenAi
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let api_key = self.api_key.as_deref().unwrap_or_default();
        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.api_base))
            .bearer_auth(api_key)
            .timeout(self.timeout)
            .json(&json!({
                "model": self.model,
                "messages": [{ "role": "user", "content": prompt }],
                "max_tokens": self.max_output_tokens,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Http {
                status,
                body: body_snippet(body, 200),
            });
        }

        let payload: ChatCompletionResponse = response.json().await?;
        payload
            .choices
            .into_iter()
            .next()
            .and_then(|choice| {
                choice
                    .message
                    .and_then(|message| message.content)
                    .filter(|content| !content.trim().is_empty())
                    .or(choice.text)
            })
            .filter(|text| !text.trim().is_empty())
            .ok_or(ProviderError::EmptyReply)
    }
}
