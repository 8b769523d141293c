//! Embedding provider abstraction and implementations.
//!
//! Defines the [`EmbeddingProvider`] trait and concrete implementations:
//! - **[`DisabledProvider`]**: returns errors; used when embeddings are
//!   not configured.
//! - **[`HttpProvider`]**: calls an OpenAI-compatible `/embeddings`
//!   endpoint on an external inference engine, one request per text.
//!
//! There is no automatic retry: a failed request propagates to the
//! caller, and the surrounding build or query aborts rather than falling
//! back to a degraded embedding.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::time::Duration;

use crate::config::EmbeddingConfig;

/// Trait for embedding backends.
///
/// The model identifier and vector dimensionality are fixed properties of
/// the configured deployment; `embed` must return a vector of exactly
/// `dims()` floats for any input.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Returns the model identifier (e.g. `"all-minilm-l6-v2"`).
    fn model_name(&self) -> &str;
    /// Returns the embedding vector dimensionality (e.g. `384`).
    fn dims(&self) -> usize;
    /// Embed a single text into a fixed-length vector.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// A no-op embedding provider that always returns errors.
///
/// Used when `embedding.provider = "disabled"` in the configuration.
pub struct DisabledProvider;

#[async_trait]
impl EmbeddingProvider for DisabledProvider {
    fn model_name(&self) -> &str {
        "disabled"
    }
    fn dims(&self) -> usize {
        0
    }
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        bail!("Embedding provider is disabled. Set [embedding] provider in config.")
    }
}

/// Embedding provider backed by an OpenAI-compatible HTTP inference engine.
///
/// Sends `POST {endpoint}/embeddings` with `{ "model": ..., "input": ... }`
/// and expects the usual `data[0].embedding` response shape. The API key
/// header is attached only when the configured environment variable is
/// set; local inference engines typically need none.
pub struct HttpProvider {
    model: String,
    dims: usize,
    endpoint: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl HttpProvider {
    /// Create a new HTTP provider from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `endpoint`, `model`, or `dimension` is not set
    /// in config, or if the HTTP client cannot be constructed.
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let model = config
            .model
            .clone()
            .ok_or_else(|| anyhow::anyhow!("embedding.model required for http provider"))?;
        let dims = config
            .dimension
            .ok_or_else(|| anyhow::anyhow!("embedding.dimension required for http provider"))?;
        let endpoint = config
            .endpoint
            .clone()
            .ok_or_else(|| anyhow::anyhow!("embedding.endpoint required for http provider"))?;

        let api_key = config
            .api_key_env
            .as_deref()
            .and_then(|var| std::env::var(var).ok());

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            model,
            dims,
            endpoint,
            api_key,
            client,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for HttpProvider {
    fn model_name(&self) -> &str {
        &self.model
    }
    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/embeddings", self.endpoint.trim_end_matches('/'));
        let body = serde_json::json!({
            "model": self.model,
            "input": text,
        });

        let mut request = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("embedding request to {url} failed"))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            bail!("embedding API error {}: {}", status, body_text);
        }

        let json: serde_json::Value = response.json().await?;
        parse_embedding_response(&json)
    }
}

/// Extract `data[0].embedding` from an OpenAI-compatible response.
fn parse_embedding_response(json: &serde_json::Value) -> Result<Vec<f32>> {
    let data = json
        .get("data")
        .and_then(|d| d.as_array())
        .ok_or_else(|| anyhow::anyhow!("Invalid embedding response: missing data array"))?;

    let first = data
        .first()
        .ok_or_else(|| anyhow::anyhow!("Empty embedding response"))?;

    let embedding = first
        .get("embedding")
        .and_then(|e| e.as_array())
        .ok_or_else(|| anyhow::anyhow!("Invalid embedding response: missing embedding"))?;

    Ok(embedding
        .iter()
        .map(|v| v.as_f64().unwrap_or(0.0) as f32)
        .collect())
}

/// Create the appropriate [`EmbeddingProvider`] based on configuration.
pub fn create_provider(config: &EmbeddingConfig) -> Result<Box<dyn EmbeddingProvider>> {
    match config.provider.as_str() {
        "disabled" => Ok(Box::new(DisabledProvider)),
        "http" => Ok(Box::new(HttpProvider::new(config)?)),
        other => bail!("Unknown embedding provider: {}", other),
    }
}
