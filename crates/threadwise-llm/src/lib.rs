pub mod embedder;
pub mod error;
pub mod openai;
pub mod traits;

pub use embedder::{Embedder, EmbeddingConfig};
pub use error::{EmbeddingError, ProviderError, Result};
pub use openai::OpenAIProvider;
pub use traits::{EmbeddingProvider, LLMProvider};
