use std::fmt;
use std::sync::Arc;

use tiktoken_rs::CoreBPE;

use crate::error::{ChunkerError, Result, TokenizerError};

pub type TokenId = u32;

/// Token counting and encode/decode for precise sub-splitting.
///
/// Implementations must be pure functions of their input so one instance
/// can be shared across concurrent chunking calls.
pub trait Tokenizer: Send + Sync {
    fn name(&self) -> &str;

    fn encode(&self, text: &str) -> Vec<TokenId>;

    fn decode(&self, tokens: &[TokenId]) -> std::result::Result<String, TokenizerError>;

    fn count_tokens(&self, text: &str) -> usize {
        self.encode(text).len()
    }

    /// Decode, substituting U+FFFD for tokens that cannot be decoded.
    fn decode_lossy(&self, tokens: &[TokenId]) -> String {
        if let Ok(text) = self.decode(tokens) {
            return text;
        }
        tokens
            .iter()
            .map(|token| {
                self.decode(std::slice::from_ref(token))
                    .unwrap_or_else(|_| char::REPLACEMENT_CHARACTER.to_string())
            })
            .collect()
    }
}

/// BPE tokenizer backed by `tiktoken-rs`.
#[derive(Clone)]
pub struct TiktokenTokenizer {
    name: String,
    bpe: Arc<CoreBPE>,
}

impl TiktokenTokenizer {
    /// Load an encoding by name (`cl100k_base`, `o200k_base`, `p50k_base`,
    /// `p50k_edit`, `r50k_base`) or by a model name tiktoken knows about.
    pub fn from_name(name: &str) -> Result<Self> {
        let bpe = match name {
            "cl100k_base" => tiktoken_rs::cl100k_base().map_err(|e| load_error(name, e))?,
            "o200k_base" => tiktoken_rs::o200k_base().map_err(|e| load_error(name, e))?,
            "p50k_base" => tiktoken_rs::p50k_base().map_err(|e| load_error(name, e))?,
            "p50k_edit" => tiktoken_rs::p50k_edit().map_err(|e| load_error(name, e))?,
            "r50k_base" | "gpt2" => tiktoken_rs::r50k_base().map_err(|e| load_error(name, e))?,
            model => tiktoken_rs::get_bpe_from_model(model)
                .map_err(|_| ChunkerError::UnknownTokenizer(model.to_string()))?,
        };

        Ok(Self {
            name: name.to_string(),
            bpe: Arc::new(bpe),
        })
    }

    pub fn cl100k() -> Result<Self> {
        Self::from_name("cl100k_base")
    }
}

fn load_error(name: &str, reason: impl fmt::Display) -> TokenizerError {
    TokenizerError::Load {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

impl fmt::Debug for TiktokenTokenizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TiktokenTokenizer")
            .field("name", &self.name)
            .finish()
    }
}

impl Tokenizer for TiktokenTokenizer {
    fn name(&self) -> &str {
        &self.name
    }

    fn encode(&self, text: &str) -> Vec<TokenId> {
        self.bpe
            .encode_with_special_tokens(text)
            .into_iter()
            .map(|token| token as TokenId)
            .collect()
    }

    fn decode(&self, tokens: &[TokenId]) -> std::result::Result<String, TokenizerError> {
        self.bpe
            .decode(tokens.iter().map(|&token| token as _).collect())
            .map_err(|e| TokenizerError::Decode {
                count: tokens.len(),
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_matches_encode_len() {
        let tokenizer = TiktokenTokenizer::cl100k().unwrap();
        let text = "Hello there, how is the quarterly plan going?";
        assert_eq!(tokenizer.count_tokens(text), tokenizer.encode(text).len());
        assert!(tokenizer.count_tokens(text) > 0);
        assert_eq!(tokenizer.count_tokens(""), 0);
    }

    #[test]
    fn test_round_trip_preserves_counts() {
        let tokenizer = TiktokenTokenizer::cl100k().unwrap();
        let text = "**From: Alice <a@t.com> (2024-01-15 10:00)**\n\nShip it on Friday. Thanks!";
        let decoded = tokenizer.decode(&tokenizer.encode(text)).unwrap();
        assert_eq!(decoded, text);
        assert_eq!(tokenizer.count_tokens(&decoded), tokenizer.count_tokens(text));
    }

    #[test]
    fn test_known_encodings_load() {
        for name in ["cl100k_base", "o200k_base", "p50k_base", "r50k_base"] {
            let tokenizer = TiktokenTokenizer::from_name(name).unwrap();
            assert_eq!(tokenizer.name(), name);
        }
    }

    #[test]
    fn test_model_name_resolves() {
        assert!(TiktokenTokenizer::from_name("gpt-4").is_ok());
    }

    #[test]
    fn test_unknown_tokenizer_fails() {
        let err = TiktokenTokenizer::from_name("definitely-not-a-tokenizer").unwrap_err();
        assert!(matches!(err, ChunkerError::UnknownTokenizer(_)));
    }

    #[test]
    fn test_decode_lossy_on_split_character() {
        let tokenizer = TiktokenTokenizer::cl100k().unwrap();
        let tokens = tokenizer.encode("日本語のテキスト");
        let lossy = tokenizer.decode_lossy(&tokens);
        assert_eq!(lossy, "日本語のテキスト");
    }
}
