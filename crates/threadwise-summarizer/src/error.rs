use thiserror::Error;
use threadwise_chunker::ChunkerError;
use threadwise_llm::ProviderError;

#[derive(Error, Debug)]
pub enum SummarizerError {
    #[error("Cannot summarize empty thread: {0}")]
    EmptyThread(String),

    #[error("LLM summarization requires an LLM provider")]
    MissingProvider,

    #[error("Invalid summarization configuration: {0}")]
    InvalidConfig(String),

    #[error("Tokenizer setup failed: {0}")]
    Chunker(#[from] ChunkerError),

    #[error("LLM provider error: {0}")]
    Provider(#[from] ProviderError),
}

pub type Result<T> = std::result::Result<T, SummarizerError>;
