use serde::{Deserialize, Serialize};

use crate::error::{ChunkerError, Result};

pub const DEFAULT_CHUNK_SIZE: usize = 512;
pub const DEFAULT_CHUNK_OVERLAP: usize = 50;
pub const DEFAULT_TOKENIZER: &str = "cl100k_base";
pub const DEFAULT_SOURCE_TYPE: &str = "gmail";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Token budget per chunk
    pub chunk_size: usize,
    /// Tokens repeated between consecutive sub-chunks of one oversized message
    pub chunk_overlap: usize,
    /// Encoding name (`cl100k_base`, `o200k_base`, ...) or a model name
    pub tokenizer: String,
    /// Written to `ChunkMetadata::source_type`
    pub source_type: String,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            tokenizer: DEFAULT_TOKENIZER.to_string(),
            source_type: DEFAULT_SOURCE_TYPE.to_string(),
        }
    }
}

impl ChunkingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_chunk_overlap(mut self, chunk_overlap: usize) -> Self {
        self.chunk_overlap = chunk_overlap;
        self
    }

    pub fn with_tokenizer(mut self, tokenizer: impl Into<String>) -> Self {
        self.tokenizer = tokenizer.into();
        self
    }

    pub fn with_source_type(mut self, source_type: impl Into<String>) -> Self {
        self.source_type = source_type.into();
        self
    }

    /// Reject configurations the engine cannot run with.
    ///
    /// An overlap at or above the chunk size is accepted: the raw token
    /// window always advances by at least one token.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(ChunkerError::InvalidConfig(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.tokenizer.trim().is_empty() {
            return Err(ChunkerError::InvalidConfig(
                "tokenizer must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
