use serde::{Deserialize, Serialize};
use threadwise_chunker::{DEFAULT_SOURCE_TYPE, DEFAULT_TOKENIZER};

use crate::error::{Result, SummarizerError};

pub const DEFAULT_CONTEXT_WINDOW: usize = 128_000;
pub const DEFAULT_MAX_SUMMARY_TOKENS: usize = 512;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryMethod {
    /// First and last message excerpts, no provider needed
    #[default]
    Extractive,
    Llm,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizationConfig {
    pub method: SummaryMethod,
    /// Model context window, in tokens
    pub context_window: usize,
    /// Tokens reserved for the generated summary
    pub max_summary_tokens: usize,
    pub tokenizer: String,
    pub source_type: String,
}

impl Default for SummarizationConfig {
    fn default() -> Self {
        Self {
            method: SummaryMethod::default(),
            context_window: DEFAULT_CONTEXT_WINDOW,
            max_summary_tokens: DEFAULT_MAX_SUMMARY_TOKENS,
            tokenizer: DEFAULT_TOKENIZER.to_string(),
            source_type: DEFAULT_SOURCE_TYPE.to_string(),
        }
    }
}

impl SummarizationConfig {
    pub fn llm() -> Self {
        Self {
            method: SummaryMethod::Llm,
            ..Self::default()
        }
    }

    pub fn with_context_window(mut self, context_window: usize) -> Self {
        self.context_window = context_window;
        self
    }

    pub fn with_max_summary_tokens(mut self, max_summary_tokens: usize) -> Self {
        self.max_summary_tokens = max_summary_tokens;
        self
    }

    pub fn with_source_type(mut self, source_type: impl Into<String>) -> Self {
        self.source_type = source_type.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_summary_tokens >= self.context_window {
            return Err(SummarizerError::InvalidConfig(format!(
                "max_summary_tokens ({}) must be below context_window ({})",
                self.max_summary_tokens, self.context_window
            )));
        }
        if self.tokenizer.trim().is_empty() {
            return Err(SummarizerError::InvalidConfig(
                "tokenizer must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SummarizationConfig::default();
        assert_eq!(config.method, SummaryMethod::Extractive);
        assert_eq!(config.context_window, 128_000);
        assert_eq!(config.max_summary_tokens, 512);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: SummarizationConfig = toml::from_str(
            r#"
            method = "llm"
            context_window = 8000
            "#,
        )
        .unwrap();

        assert_eq!(config.method, SummaryMethod::Llm);
        assert_eq!(config.context_window, 8000);
        assert_eq!(config.max_summary_tokens, 512);
    }

    #[test]
    fn test_reserved_tokens_must_fit_window() {
        let config = SummarizationConfig::default()
            .with_context_window(500)
            .with_max_summary_tokens(500);
        assert!(matches!(
            config.validate(),
            Err(SummarizerError::InvalidConfig(_))
        ));
    }
}
