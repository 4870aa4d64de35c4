//! Thread-aware chunking engine.
//!
//! Turns an ordered, already-cleaned conversation [`Thread`] into detail
//! [`Chunk`]s that stay under a token budget, keep message boundaries
//! whenever a message fits, and carry a short "preceding context" blurb so
//! a chunk retrieved on its own still reads sensibly.
//!
//! ```rust,no_run
//! use threadwise_chunker::{ChunkingConfig, ThreadChunker};
//! use threadwise_types::Thread;
//!
//! # fn main() -> Result<(), threadwise_chunker::ChunkerError> {
//! let chunker = ThreadChunker::new(ChunkingConfig::default().with_chunk_size(256))?;
//! let thread = Thread::new("thread-1").with_subject("Quarterly plan");
//! let chunks = chunker.chunk_thread(&thread, "project-1");
//! assert!(chunks.is_empty());
//! # Ok(())
//! # }
//! ```

mod assembler;
mod chunker;
mod config;
mod context;
mod error;
mod format;
mod splitter;
mod tokenizer;

pub use assembler::ChunkAssembler;
pub use chunker::ThreadChunker;
pub use config::{ChunkingConfig, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, DEFAULT_SOURCE_TYPE, DEFAULT_TOKENIZER};
pub use context::{display_name, ContextSynthesizer, PRECEDING_CONTEXT_BUDGET};
pub use error::{ChunkerError, Result, TokenizerError};
pub use format::{format_header, format_message, MESSAGE_SEPARATOR, SEPARATOR_TOKEN_COST};
pub use splitter::{SegmentSplitter, SplitStrategy};
pub use tokenizer::{TiktokenTokenizer, TokenId, Tokenizer};

pub use threadwise_types::{Chunk, ChunkLevel, ChunkMetadata, Message, Thread};
