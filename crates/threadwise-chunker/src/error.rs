use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChunkerError {
    #[error("Invalid chunking configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown tokenizer: {0}")]
    UnknownTokenizer(String),

    #[error("Tokenizer error: {0}")]
    Tokenizer(#[from] TokenizerError),
}

#[derive(Error, Debug)]
pub enum TokenizerError {
    #[error("Failed to load tokenizer '{name}': {reason}")]
    Load { name: String, reason: String },

    #[error("Failed to decode {count} tokens: {reason}")]
    Decode { count: usize, reason: String },
}

pub type Result<T> = std::result::Result<T, ChunkerError>;
