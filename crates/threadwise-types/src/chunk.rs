use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// `chunk_index` reserved for the whole-thread summary chunk.
pub const SUMMARY_CHUNK_INDEX: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkLevel {
    Detail,
    Summary,
}

impl Default for ChunkLevel {
    fn default() -> Self {
        ChunkLevel::Detail
    }
}

impl ChunkLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChunkLevel::Detail => "detail",
            ChunkLevel::Summary => "summary",
        }
    }
}

impl fmt::Display for ChunkLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub project_id: String,
    pub source_type: String,
    /// Thread id the chunk was cut from
    pub source_id: String,
    pub chunk_index: i64,
    #[serde(default)]
    pub chunk_level: ChunkLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_context: Option<String>,
}

/// A bounded piece of thread text ready for embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub text: String,
    /// Filled in by the embedding step, never at creation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    pub metadata: ChunkMetadata,
}

impl Chunk {
    pub fn detail_id(thread_id: &str, chunk_index: usize) -> String {
        format!("{}:{}", thread_id, chunk_index)
    }

    pub fn summary_id(thread_id: &str) -> String {
        format!("{}:summary", thread_id)
    }

    pub fn is_summary(&self) -> bool {
        self.metadata.chunk_level == ChunkLevel::Summary
    }
}
