use threadwise_types::{Chunk, ChunkLevel, ChunkMetadata, Message, Thread, SUMMARY_CHUNK_INDEX};

/// Builds chunk records with their retrieval metadata.
#[derive(Debug, Clone)]
pub struct ChunkAssembler {
    source_type: String,
}

impl ChunkAssembler {
    pub fn new(source_type: impl Into<String>) -> Self {
        Self {
            source_type: source_type.into(),
        }
    }

    pub fn source_type(&self) -> &str {
        &self.source_type
    }

    /// A detail chunk; author and date come from `first_message`.
    pub fn detail(
        &self,
        thread: &Thread,
        project_id: &str,
        chunk_index: usize,
        text: String,
        first_message: &Message,
        thread_context: Option<String>,
    ) -> Chunk {
        Chunk {
            id: Chunk::detail_id(&thread.thread_id, chunk_index),
            text,
            embedding: None,
            metadata: self.metadata(
                thread,
                project_id,
                chunk_index as i64,
                ChunkLevel::Detail,
                first_message,
                thread_context,
            ),
        }
    }

    /// The single whole-thread summary chunk.
    pub fn summary(
        &self,
        thread: &Thread,
        project_id: &str,
        text: String,
        first_message: &Message,
    ) -> Chunk {
        Chunk {
            id: Chunk::summary_id(&thread.thread_id),
            text,
            embedding: None,
            metadata: self.metadata(
                thread,
                project_id,
                SUMMARY_CHUNK_INDEX,
                ChunkLevel::Summary,
                first_message,
                None,
            ),
        }
    }

    fn metadata(
        &self,
        thread: &Thread,
        project_id: &str,
        chunk_index: i64,
        chunk_level: ChunkLevel,
        first_message: &Message,
        thread_context: Option<String>,
    ) -> ChunkMetadata {
        ChunkMetadata {
            project_id: project_id.to_string(),
            source_type: self.source_type.clone(),
            source_id: thread.thread_id.clone(),
            chunk_index,
            chunk_level,
            author: Some(first_message.sender.clone()),
            date: Some(first_message.date),
            subject: thread.subject.clone(),
            thread_context,
        }
    }
}
