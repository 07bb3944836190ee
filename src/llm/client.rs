//! Chat-completion client for an OpenAI-compatible API.

use crate::config::Config;
use crate::error::{AppError, AppResult};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

/// Low-temperature setting for SQL generation: deterministic, syntactically
/// conservative output.
pub const NL_QUERY_TEMPERATURE: f32 = 0.3;

/// Temperature for dump analysis, where creativity is purely a liability.
pub const EXTRACTION_TEMPERATURE: f32 = 0.0;

/// Client for the text-completion oracle.
#[derive(Debug, Clone)]
pub struct LlmClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

impl LlmClient {
    /// Build a client from server configuration.
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.oracle_timeout_duration())
            .build()
            .map_err(|e| AppError::internal(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_key: config.openai_api_key.clone(),
            model: config.model.clone(),
            base_url: config.openai_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Request one chat completion and return the trimmed first-choice text.
    pub async fn complete(
        &self,
        system_prompt: &str,
        user_content: &str,
        temperature: f32,
    ) -> AppResult<String> {
        debug!(model = %self.model, temperature, "Requesting completion");

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": self.model,
                "messages": [
                    {"role": "system", "content": system_prompt},
                    {"role": "user", "content": user_content}
                ],
                "temperature": temperature
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::oracle(format!(
                "language model returned {}: {}",
                status,
                body.trim()
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::oracle(format!("malformed completion response: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .ok_or_else(|| AppError::oracle("completion contained no choices"))
    }
}

/// Strip a surrounding markdown code fence from model output.
///
/// Handles ```` ```json ````, ```` ```sql ```` and bare ```` ``` ```` fences;
/// anything else passes through unchanged.
pub fn strip_code_fences(text: &str) -> String {
    let text = text.trim();
    if !text.starts_with("```") {
        return text.to_string();
    }
    let start = text.find('\n').map(|i| i + 1).unwrap_or(0);
    let end = text.rfind("```").unwrap_or(text.len());
    if end <= start {
        return text.to_string();
    }
    text[start..end].trim().to_string()
}
