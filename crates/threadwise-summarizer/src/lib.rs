pub mod config;
pub mod error;
pub mod summarizer;

pub use config::{SummarizationConfig, SummaryMethod};
pub use error::{Result, SummarizerError};
pub use summarizer::ThreadSummarizer;
