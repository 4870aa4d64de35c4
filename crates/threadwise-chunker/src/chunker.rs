use std::sync::Arc;

use threadwise_types::{Chunk, Thread};

use crate::assembler::ChunkAssembler;
use crate::config::ChunkingConfig;
use crate::context::ContextSynthesizer;
use crate::error::Result;
use crate::format::{format_message, MESSAGE_SEPARATOR, SEPARATOR_TOKEN_COST};
use crate::splitter::SegmentSplitter;
use crate::tokenizer::{TiktokenTokenizer, Tokenizer};

/// Cuts a thread into detail chunks under the configured token budget.
///
/// Messages are packed greedily left to right and never reordered. A
/// message that does not fit alongside the buffer starts a new chunk; one
/// that does not fit on its own is handed to the [`SegmentSplitter`].
#[derive(Clone)]
pub struct ThreadChunker {
    config: ChunkingConfig,
    tokenizer: Arc<dyn Tokenizer>,
    assembler: ChunkAssembler,
    synthesizer: ContextSynthesizer,
    splitter: SegmentSplitter,
}

/// Messages accumulated for the chunk being built.
struct Buffer<'a> {
    units: Vec<&'a str>,
    tokens: usize,
    first_message: usize,
}

impl<'a> Buffer<'a> {
    fn starting_at(first_message: usize) -> Self {
        Self {
            units: Vec::new(),
            tokens: 0,
            first_message,
        }
    }

    fn separator_cost(&self) -> usize {
        if self.units.is_empty() {
            0
        } else {
            SEPARATOR_TOKEN_COST
        }
    }
}

impl ThreadChunker {
    /// Validate `config` and load the tokenizer it names.
    pub fn new(config: ChunkingConfig) -> Result<Self> {
        config.validate()?;
        let tokenizer = TiktokenTokenizer::from_name(&config.tokenizer)?;
        Self::with_tokenizer(config, Arc::new(tokenizer))
    }

    /// Use an already constructed tokenizer; `config.tokenizer` is ignored.
    pub fn with_tokenizer(config: ChunkingConfig, tokenizer: Arc<dyn Tokenizer>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            assembler: ChunkAssembler::new(config.source_type.clone()),
            synthesizer: ContextSynthesizer::new(Arc::clone(&tokenizer)),
            splitter: SegmentSplitter::new(
                Arc::clone(&tokenizer),
                config.chunk_size,
                config.chunk_overlap,
            ),
            tokenizer,
            config,
        })
    }

    pub fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    pub fn tokenizer(&self) -> &Arc<dyn Tokenizer> {
        &self.tokenizer
    }

    pub fn assembler(&self) -> &ChunkAssembler {
        &self.assembler
    }

    pub fn chunk_thread(&self, thread: &Thread, project_id: &str) -> Vec<Chunk> {
        if thread.messages.is_empty() {
            return Vec::new();
        }

        let units: Vec<String> = thread.messages.iter().map(format_message).collect();
        let counts: Vec<usize> = units
            .iter()
            .map(|unit| self.tokenizer.count_tokens(unit))
            .collect();
        let total: usize = counts.iter().sum();
        let chunk_size = self.config.chunk_size;

        if total <= chunk_size {
            tracing::debug!(
                thread_id = %thread.thread_id,
                messages = units.len(),
                total_tokens = total,
                "Thread fits in a single chunk"
            );
            return vec![self.assembler.detail(
                thread,
                project_id,
                0,
                units.join(MESSAGE_SEPARATOR),
                &thread.messages[0],
                None,
            )];
        }

        let mut chunks = Vec::new();
        let mut buffer = Buffer::starting_at(0);

        for (idx, (unit, &tokens)) in units.iter().zip(&counts).enumerate() {
            let separator = buffer.separator_cost();
            if buffer.tokens + separator + tokens <= chunk_size {
                buffer.units.push(unit);
                buffer.tokens += separator + tokens;
                continue;
            }

            self.flush(&mut chunks, thread, project_id, &buffer);

            if tokens > chunk_size {
                self.split_oversized(&mut chunks, thread, project_id, idx, unit);
                buffer = Buffer::starting_at(idx + 1);
            } else {
                buffer = Buffer::starting_at(idx);
                buffer.units.push(unit);
                buffer.tokens = tokens;
            }
        }

        self.flush(&mut chunks, thread, project_id, &buffer);

        tracing::debug!(
            thread_id = %thread.thread_id,
            messages = units.len(),
            total_tokens = total,
            chunks = chunks.len(),
            "Thread chunked"
        );

        chunks
    }

    /// Emit the buffer as one chunk, if it holds anything.
    fn flush(&self, chunks: &mut Vec<Chunk>, thread: &Thread, project_id: &str, buffer: &Buffer<'_>) {
        if buffer.units.is_empty() {
            return;
        }

        let first = buffer.first_message;
        let context = self.synthesizer.synthesize(&thread.messages[..first]);
        chunks.push(self.assembler.detail(
            thread,
            project_id,
            chunks.len(),
            buffer.units.join(MESSAGE_SEPARATOR),
            &thread.messages[first],
            context,
        ));
    }

    fn split_oversized(
        &self,
        chunks: &mut Vec<Chunk>,
        thread: &Thread,
        project_id: &str,
        idx: usize,
        unit: &str,
    ) {
        let (strategy, parts) = self.splitter.split_with_strategy(unit);
        tracing::debug!(
            thread_id = %thread.thread_id,
            message = idx,
            parts = parts.len(),
            %strategy,
            "Split oversized message"
        );

        let context = self.synthesizer.synthesize(&thread.messages[..idx]);
        let emitted_before = !chunks.is_empty();

        for (part_idx, part) in parts.into_iter().enumerate() {
            let part_context = if part_idx == 0 || emitted_before {
                context.clone()
            } else {
                None
            };
            chunks.push(self.assembler.detail(
                thread,
                project_id,
                chunks.len(),
                part,
                &thread.messages[idx],
                part_context,
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChunkerError;
    use chrono::{TimeZone, Utc};
    use threadwise_types::Message;

    fn message(content: &str, sender: &str, hour: u32) -> Message {
        let date = Utc.with_ymd_and_hms(2024, 1, 15, hour, 0, 0).unwrap();
        Message::new(sender, date, content)
    }

    fn chunker(chunk_size: usize, overlap: usize) -> ThreadChunker {
        ThreadChunker::new(
            ChunkingConfig::default()
                .with_chunk_size(chunk_size)
                .with_chunk_overlap(overlap),
        )
        .unwrap()
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let err = ThreadChunker::new(ChunkingConfig::default().with_chunk_size(0)).err().unwrap();
        assert!(matches!(err, ChunkerError::InvalidConfig(_)));
    }

    #[test]
    fn test_unknown_tokenizer_fails_fast() {
        let config = ChunkingConfig::default().with_tokenizer("no-such-encoding");
        assert!(matches!(
            ThreadChunker::new(config).err().unwrap(),
            ChunkerError::UnknownTokenizer(_)
        ));
    }

    #[test]
    fn test_empty_thread() {
        let thread = Thread::new("thread1");
        assert!(chunker(512, 50).chunk_thread(&thread, "proj1").is_empty());
    }

    #[test]
    fn test_single_chunk_joins_messages() {
        let thread = Thread::new("thread1")
            .with_message(message("Hello there.", "Alice <a@t.com>", 10))
            .with_message(message("Hi Alice!", "Bob <b@t.com>", 11));

        let chunks = chunker(512, 50).chunk_thread(&thread, "proj1");

        assert_eq!(chunks.len(), 1);
        assert_eq!(
            chunks[0].text,
            "**From: Alice <a@t.com> (2024-01-15 10:00)**\n\nHello there.\n\n\
             **From: Bob <b@t.com> (2024-01-15 11:00)**\n\nHi Alice!"
        );
    }

    #[test]
    fn test_oversized_middle_message_gets_context_on_every_part() {
        let long = (0..12)
            .map(|i| format!("Paragraph {} explains one more detail of the rollout plan.", i))
            .collect::<Vec<_>>()
            .join("\n\n");
        let thread = Thread::new("thread1")
            .with_message(message("Kickoff note.", "Alice <a@t.com>", 9))
            .with_message(message(&long, "Bob <b@t.com>", 10))
            .with_message(message("Thanks, looks good.", "Carol <c@t.com>", 11));

        let chunks = chunker(60, 5).chunk_thread(&thread, "proj1");

        let bob_parts: Vec<&Chunk> = chunks
            .iter()
            .filter(|c| c.metadata.author.as_deref() == Some("Bob <b@t.com>"))
            .collect();
        assert!(bob_parts.len() >= 2);
        for part in bob_parts {
            let context = part.metadata.thread_context.as_deref().unwrap();
            assert!(context.contains("Alice (Jan 15): 'Kickoff note....'"));
        }

        let last = chunks.last().unwrap();
        assert_eq!(last.metadata.author.as_deref(), Some("Carol <c@t.com>"));
        assert!(last.text.starts_with("**From: Carol"));
    }

    #[test]
    fn test_oversized_first_message_has_no_context() {
        let long = (0..10)
            .map(|i| format!("Sentence number {} describes the incident timeline.", i))
            .collect::<Vec<_>>()
            .join(" ");
        let thread = Thread::new("thread1").with_message(message(&long, "Alice <a@t.com>", 9));

        let chunks = chunker(40, 5).chunk_thread(&thread, "proj1");

        assert!(chunks.len() >= 2);
        for chunk in &chunks {
            assert!(chunk.metadata.thread_context.is_none());
            assert_eq!(chunk.metadata.author.as_deref(), Some("Alice <a@t.com>"));
        }
    }
}
