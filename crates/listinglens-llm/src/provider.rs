use anyhow::{anyhow, Context, Result};
use listinglens_core::config::OpenAiConfig;
use listinglens_core::traits::TextGenerator;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Text generator backed by an OpenAI-compatible chat-completions endpoint.
///
/// Requests block and carry the configured timeout; expiry surfaces as a
/// recoverable error the caller may retry.
pub struct RemoteGenerator {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

impl RemoteGenerator {
    pub fn new(config: &OpenAiConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(anyhow!("generation API key cannot be empty"));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.chat_model.clone(),
            api_key: config.api_key.clone(),
            temperature: config.temperature,
        })
    }
}

impl TextGenerator for RemoteGenerator {
    fn generate(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage { role: "user", content: prompt }],
            temperature: self.temperature,
        };
        let response = self
            .client
            .post(format!("{}/chat/completions", self.endpoint))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .context("chat completion request")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(anyhow!("chat endpoint returned {status}: {body}"));
        }

        let parsed: ChatResponse = response.json().context("malformed chat response")?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| anyhow!("chat endpoint returned no choices"))?;
        Ok(content.trim().to_string())
    }
}
