use std::sync::Arc;

use anyhow::{Context, Result};

use crate::{
    Chunk, ChunkingConfig, Embedder, LLMProvider, SummarizationConfig, Thread, ThreadChunker,
    ThreadSummarizer, Tokenizer,
};

/// Builder for [`IngestPipeline`]
///
/// # Example
///
/// ```rust,no_run
/// use threadwise::prelude::*;
///
/// # fn main() -> Result<()> {
/// let pipeline = IngestPipelineBuilder::new()
///     .chunking(ChunkingConfig::default())
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct IngestPipelineBuilder {
    chunking: Option<ChunkingConfig>,
    tokenizer: Option<Arc<dyn Tokenizer>>,
    summarization: Option<SummarizationConfig>,
    llm_provider: Option<Arc<dyn LLMProvider>>,
    embedder: Option<Embedder>,
}

impl IngestPipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the chunking configuration (required)
    pub fn chunking(mut self, config: ChunkingConfig) -> Self {
        self.chunking = Some(config);
        self
    }

    /// Use this tokenizer instead of the one named in the chunking config
    pub fn tokenizer(mut self, tokenizer: Arc<dyn Tokenizer>) -> Self {
        self.tokenizer = Some(tokenizer);
        self
    }

    /// Append a summary chunk to every non-empty thread
    pub fn summarization(mut self, config: SummarizationConfig) -> Self {
        self.summarization = Some(config);
        self
    }

    /// Provider for LLM summaries
    pub fn llm_provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.llm_provider = Some(provider);
        self
    }

    /// Embed every chunk before returning it
    pub fn embedder(mut self, embedder: Embedder) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Build the pipeline
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the chunking config is not set or is invalid
    /// - the tokenizer cannot be loaded
    /// - LLM summarization is requested without a provider
    pub fn build(self) -> Result<IngestPipeline> {
        let chunking = self
            .chunking
            .context("Chunking config is required. Call .chunking(config)")?;

        let chunker = match self.tokenizer {
            Some(tokenizer) => ThreadChunker::with_tokenizer(chunking, tokenizer),
            None => ThreadChunker::new(chunking),
        }
        .context("Failed to create thread chunker")?;

        let summarizer = self
            .summarization
            .map(|config| match self.llm_provider {
                Some(provider) => ThreadSummarizer::with_provider(config, provider),
                None => ThreadSummarizer::new(config),
            })
            .transpose()
            .context("Failed to create thread summarizer")?;

        Ok(IngestPipeline {
            chunker,
            summarizer,
            embedder: self.embedder,
        })
    }
}

/// Chunker plus optional summarizer and embedder
#[derive(Clone)]
pub struct IngestPipeline {
    chunker: ThreadChunker,
    summarizer: Option<ThreadSummarizer>,
    embedder: Option<Embedder>,
}

impl IngestPipeline {
    /// Detail chunks in order, then the summary chunk if one is configured.
    /// Every chunk is embedded when an embedder is set.
    pub async fn ingest(&self, thread: &Thread, project_id: &str) -> Result<Vec<Chunk>> {
        let mut chunks = self.chunker.chunk_thread(thread, project_id);

        if let Some(summarizer) = &self.summarizer {
            if !thread.is_empty() {
                let summary = summarizer
                    .summarize_thread(thread, project_id)
                    .await
                    .with_context(|| format!("Failed to summarize thread {}", thread.thread_id))?;
                chunks.push(summary);
            }
        }

        if let Some(embedder) = &self.embedder {
            chunks = embedder
                .embed_chunks(chunks)
                .await
                .with_context(|| format!("Failed to embed thread {}", thread.thread_id))?;
        }

        tracing::info!(
            thread_id = %thread.thread_id,
            project_id,
            messages = thread.len(),
            chunks = chunks.len(),
            "Ingested thread"
        );

        Ok(chunks)
    }

    pub fn chunker(&self) -> &ThreadChunker {
        &self.chunker
    }

    pub fn summarizer(&self) -> Option<&ThreadSummarizer> {
        self.summarizer.as_ref()
    }

    pub fn embedder(&self) -> Option<&Embedder> {
        self.embedder.as_ref()
    }
}
