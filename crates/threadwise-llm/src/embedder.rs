use std::sync::Arc;
use std::time::Duration;

use rand::random;
use threadwise_types::Chunk;

use crate::error::{EmbeddingError, ProviderError, Result};
use crate::traits::EmbeddingProvider;

pub const DEFAULT_BATCH_SIZE: usize = 100;
pub const DEFAULT_MAX_RETRIES: u32 = 3;

#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub model: String,
    pub dimensions: usize,
    pub batch_size: usize,
    /// Total attempts per batch, the first call included.
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl EmbeddingConfig {
    pub fn new(model: impl Into<String>, dimensions: usize) -> Self {
        Self {
            model: model.into(),
            dimensions,
            batch_size: DEFAULT_BATCH_SIZE,
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_delays(mut self, base_delay: Duration, max_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self.max_delay = max_delay;
        self
    }

    /// `base * 2^attempt` plus up to one second of jitter, capped at `max_delay`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base = self.base_delay.as_secs_f64() * 2f64.powi(attempt as i32);
        let jittered = base + random::<f64>();
        Duration::from_secs_f64(jittered.min(self.max_delay.as_secs_f64()))
    }
}

/// Embeds texts through an [`EmbeddingProvider`] in fixed-size batches,
/// retrying batches that hit a rate limit.
#[derive(Clone)]
pub struct Embedder {
    provider: Arc<dyn EmbeddingProvider>,
    config: EmbeddingConfig,
}

impl Embedder {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, config: EmbeddingConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &EmbeddingConfig {
        &self.config
    }

    /// One vector per text, in input order.
    pub async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());

        for (batch_index, batch) in texts.chunks(self.config.batch_size.max(1)).enumerate() {
            let vectors = self.embed_batch_with_retry(batch, batch_index).await?;
            embeddings.extend(vectors);
        }

        Ok(embeddings)
    }

    /// Fill `embedding` on every chunk. Nothing else on the chunk changes.
    pub async fn embed_chunks(&self, mut chunks: Vec<Chunk>) -> Result<Vec<Chunk>> {
        if chunks.is_empty() {
            return Ok(chunks);
        }

        let texts: Vec<String> = chunks.iter().map(|chunk| chunk.text.clone()).collect();
        let embeddings = self.embed_texts(&texts).await?;

        if embeddings.len() != chunks.len() {
            return Err(EmbeddingError::CountMismatch {
                expected: chunks.len(),
                actual: embeddings.len(),
            });
        }

        for (chunk, vector) in chunks.iter_mut().zip(embeddings) {
            chunk.embedding = Some(vector);
        }

        tracing::debug!(chunks = chunks.len(), model = %self.config.model, "Embedded chunks");
        Ok(chunks)
    }

    async fn embed_batch_with_retry(
        &self,
        batch: &[String],
        batch_index: usize,
    ) -> Result<Vec<Vec<f32>>> {
        let mut attempt = 0;

        loop {
            let source: ProviderError = match self.provider.embed(batch).await {
                Ok(vectors) => return Ok(vectors),
                Err(err) => err,
            };

            attempt += 1;
            if !source.is_rate_limit() || attempt >= self.config.max_retries {
                return Err(EmbeddingError::Batch {
                    batch_index,
                    source,
                });
            }

            let delay = self.config.delay_for_attempt(attempt - 1);
            tracing::warn!(
                batch = batch_index,
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %source,
                "Embedding batch rate limited, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }
}
