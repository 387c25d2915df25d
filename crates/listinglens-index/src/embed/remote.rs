use anyhow::{anyhow, Context, Result};
use listinglens_core::config::OpenAiConfig;
use listinglens_core::traits::Embedder;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_EMBED_DIM: usize = 1536;

/// Embedder backed by an OpenAI-compatible `/embeddings` endpoint.
///
/// Calls block and carry the configured request timeout; expiry surfaces as
/// a recoverable error, never a crash.
pub struct RemoteEmbedder {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
    dim: usize,
}

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Deserialize)]
struct EmbeddingItem {
    index: usize,
    embedding: Vec<f32>,
}

impl RemoteEmbedder {
    pub fn new(config: &OpenAiConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(anyhow!("embedding API key cannot be empty"));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.embed_model.clone(),
            api_key: config.api_key.clone(),
            dim: DEFAULT_EMBED_DIM,
        })
    }

    pub fn with_dim(mut self, dim: usize) -> Self {
        self.dim = dim;
        self
    }
}

impl Embedder for RemoteEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }
        let response = self
            .client
            .post(format!("{}/embeddings", self.endpoint))
            .bearer_auth(&self.api_key)
            .json(&EmbeddingsRequest { model: &self.model, input: texts })
            .send()
            .with_context(|| format!("embeddings request for {} texts", texts.len()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(anyhow!("embeddings endpoint returned {status}: {body}"));
        }

        let mut parsed: EmbeddingsResponse =
            response.json().context("malformed embeddings response")?;
        if parsed.data.len() != texts.len() {
            return Err(anyhow!(
                "embeddings endpoint returned {} vectors for {} texts",
                parsed.data.len(),
                texts.len()
            ));
        }
        // The API may answer out of order; `index` restores input order.
        parsed.data.sort_by_key(|item| item.index);
        Ok(parsed.data.into_iter().map(|item| item.embedding).collect())
    }
}
