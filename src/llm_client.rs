//! LLM client for free-form chat
//!
//! `general_chat` turns are answered by an OpenAI-compatible chat
//! completion endpoint. Failures are reported as `anyhow` errors; the
//! orchestrator replaces them with a canned reply.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::Deserialize;

use crate::config::LlmConfig;

/// One prior turn passed along as context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    /// "user" or "assistant"
    pub role: &'static str,
    pub content: String,
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Call the LLM with a system prompt and the user's message
    async fn chat(
        &self,
        system_prompt: &str,
        history: &[ChatTurn],
        message: &str,
    ) -> Result<String>;

    /// Model name for logging
    fn model_name(&self) -> &str;
}

/// OpenAI-compatible `/chat/completions` client
#[derive(Clone)]
pub struct OpenAiCompatibleClient {
    api_url: String,
    api_key: String,
    client: reqwest::Client,
    model: String,
}

impl OpenAiCompatibleClient {
    pub fn new(config: &LlmConfig) -> Self {
        Self {
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            client: reqwest::Client::new(),
            model: config.model.clone(),
        }
    }

    fn endpoint(&self) -> String {
        if self.api_url.ends_with("/chat/completions") {
            self.api_url.clone()
        } else {
            format!("{}/chat/completions", self.api_url)
        }
    }
}

#[async_trait]
impl LlmClient for OpenAiCompatibleClient {
    async fn chat(
        &self,
        system_prompt: &str,
        history: &[ChatTurn],
        message: &str,
    ) -> Result<String> {
        let mut messages = vec![serde_json::json!({"role": "system", "content": system_prompt})];
        messages.extend(
            history
                .iter()
                .map(|t| serde_json::json!({"role": t.role, "content": t.content})),
        );
        messages.push(serde_json::json!({"role": "user", "content": message}));

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "model": &self.model,
                "messages": messages,
                "max_tokens": 800,
                "temperature": 0.7,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("LLM API error {}: {}", status, body));
        }

        #[derive(Deserialize)]
        struct Message {
            content: Option<String>,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: Message,
        }
        #[derive(Deserialize)]
        struct ApiResponse {
            choices: Vec<Choice>,
        }

        let api_response: ApiResponse = response.json().await?;
        api_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| anyhow!("Empty response from LLM"))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
