//! # Threadwise - thread-aware ingestion for RAG
//!
//! Threadwise turns conversation threads (email first) into retrieval-ready
//! chunks:
//! - **Message-boundary chunking** under a token budget, with a raw token
//!   window as the last resort for messages that cannot be split cleanly
//! - **Preceding context** attached to every later chunk, so a chunk still
//!   reads sensibly when retrieved alone
//! - **Summary chunks** per thread, extractive or LLM generated
//! - **Batched embedding** with backoff on provider rate limits
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use threadwise::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let pipeline = IngestPipelineBuilder::new()
//!         .chunking(ChunkingConfig::default().with_chunk_size(256))
//!         .summarization(SummarizationConfig::default())
//!         .build()?;
//!
//!     let thread = Thread::new("thread-1").with_subject("Launch plan");
//!     for chunk in pipeline.ingest(&thread, "project-1").await? {
//!         println!("{} ({})", chunk.id, chunk.metadata.chunk_level);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **threadwise-types**: Thread, Message and Chunk records
//! - **threadwise-chunker**: the chunking engine and tokenizer adapter
//! - **threadwise-llm**: embedding/LLM provider capabilities, the batching
//!   embedder and an OpenAI-compatible HTTP provider
//! - **threadwise-summarizer**: whole-thread summary chunks

pub use threadwise_chunker as chunker;
pub use threadwise_llm as llm;
pub use threadwise_summarizer as summarizer;
pub use threadwise_types as types;

pub use threadwise_chunker::{ChunkingConfig, ThreadChunker, Tokenizer};
pub use threadwise_llm::{Embedder, EmbeddingConfig, EmbeddingProvider, LLMProvider, OpenAIProvider};
pub use threadwise_summarizer::{SummarizationConfig, SummaryMethod, ThreadSummarizer};
pub use threadwise_types::{Chunk, ChunkLevel, ChunkMetadata, Message, Thread};

/// Chunk, summarize and embed a thread in one call
pub mod pipeline;

/// Convenient prelude with commonly used types
pub mod prelude {
    pub use crate::pipeline::{IngestPipeline, IngestPipelineBuilder};
    pub use crate::types::{Chunk, ChunkLevel, Message, Thread};
    pub use crate::{ChunkingConfig, EmbeddingConfig, SummarizationConfig};
    pub use anyhow::Result;
}
