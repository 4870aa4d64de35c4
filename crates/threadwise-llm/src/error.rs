use thiserror::Error;

const RATE_LIMIT_SIGNALS: [&str; 3] = ["rate limit", "429", "too many requests"];

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Provider returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),

    #[error("Invalid provider configuration: {0}")]
    Configuration(String),

    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    /// Whether retrying later could succeed.
    ///
    /// Besides [`ProviderError::RateLimited`], any error whose message
    /// mentions a rate limit counts, so providers that only surface a
    /// textual error still get retried.
    pub fn is_rate_limit(&self) -> bool {
        if matches!(self, ProviderError::RateLimited(_)) {
            return true;
        }
        let message = self.to_string().to_lowercase();
        RATE_LIMIT_SIGNALS
            .iter()
            .any(|signal| message.contains(signal))
    }
}

#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("Embedding failed for batch {batch_index}: {source}")]
    Batch {
        batch_index: usize,
        #[source]
        source: ProviderError,
    },

    #[error("Provider returned {actual} embeddings for {expected} chunks")]
    CountMismatch { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, EmbeddingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_detection() {
        assert!(ProviderError::RateLimited("slow down".into()).is_rate_limit());
        assert!(ProviderError::Other("Rate Limit exceeded".into()).is_rate_limit());
        assert!(ProviderError::Other("Too Many Requests".into()).is_rate_limit());
        assert!(ProviderError::Http {
            status: 429,
            body: String::new()
        }
        .is_rate_limit());

        assert!(!ProviderError::Other("invalid api key".into()).is_rate_limit());
        assert!(!ProviderError::Http {
            status: 500,
            body: "boom".into()
        }
        .is_rate_limit());
    }

    #[test]
    fn test_batch_error_message() {
        let err = EmbeddingError::Batch {
            batch_index: 2,
            source: ProviderError::Other("boom".into()),
        };
        assert_eq!(err.to_string(), "Embedding failed for batch 2: boom");
    }
}
