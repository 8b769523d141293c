//! Single-flight embedder over an [`EmbeddingProvider`].
//!
//! Provider initialization (config validation, HTTP client construction)
//! happens exactly once no matter how many callers race to embed first:
//! the cell is initialized by the first caller and concurrent callers
//! await the same initialization instead of triggering parallel ones.
//!
//! Batched embedding issues up to `batch_size` requests as
//! concurrently-awaited operations and waits for the whole batch before
//! starting the next, bounding peak in-flight inference work while
//! overlapping per-item latency.

use anyhow::{bail, Result};
use futures_util::future::try_join_all;
use tokio::sync::OnceCell;

use crate::config::EmbeddingConfig;
use crate::embedding::{create_provider, EmbeddingProvider};
use crate::progress::{ProgressEvent, ProgressReporter};

pub struct Embedder {
    config: EmbeddingConfig,
    provider: OnceCell<Box<dyn EmbeddingProvider>>,
}

impl Embedder {
    pub fn new(config: EmbeddingConfig) -> Self {
        Self {
            config,
            provider: OnceCell::new(),
        }
    }

    /// Build an embedder around an existing provider (tests, custom
    /// backends). The lazy initialization step is skipped.
    pub fn with_provider(config: EmbeddingConfig, provider: Box<dyn EmbeddingProvider>) -> Self {
        Self {
            config,
            provider: OnceCell::new_with(Some(provider)),
        }
    }

    async fn provider(&self) -> Result<&dyn EmbeddingProvider> {
        let provider = self
            .provider
            .get_or_try_init(|| async { create_provider(&self.config) })
            .await?;
        Ok(provider.as_ref())
    }

    /// The model identifier recorded in built artifacts.
    pub async fn model_name(&self) -> Result<String> {
        Ok(self.provider().await?.model_name().to_string())
    }

    /// The fixed embedding dimensionality of the configured model.
    pub async fn dims(&self) -> Result<usize> {
        Ok(self.provider().await?.dims())
    }

    /// Embed a single text.
    ///
    /// The returned vector length is asserted against the configured
    /// dimension; a model returning the wrong size is a hard error.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let provider = self.provider().await?;
        let vector = provider.embed(text).await?;
        if vector.len() != provider.dims() {
            bail!(
                "model returned a {}-dimensional vector, expected {}",
                vector.len(),
                provider.dims()
            );
        }
        Ok(vector)
    }

    /// Embed a batch of texts, preserving input order.
    ///
    /// Progress is reported after each completed batch. Any single
    /// failure aborts the whole call; nothing is retried.
    pub async fn embed_batch(
        &self,
        texts: &[String],
        batch_size: usize,
        reporter: &dyn ProgressReporter,
    ) -> Result<Vec<Vec<f32>>> {
        let batch_size = batch_size.max(1);
        let total = texts.len();
        let mut vectors = Vec::with_capacity(total);

        for batch in texts.chunks(batch_size) {
            let batch_vectors = try_join_all(batch.iter().map(|text| self.embed(text))).await?;
            vectors.extend(batch_vectors);
            reporter.report(ProgressEvent::Embedding {
                done: vectors.len() as u64,
                total: total as u64,
            });
        }

        Ok(vectors)
    }
}
