pub mod chunk;
pub mod thread;

pub use chunk::{Chunk, ChunkLevel, ChunkMetadata, SUMMARY_CHUNK_INDEX};
pub use thread::{Message, Thread};
