use std::fmt;
use std::sync::Arc;

use crate::tokenizer::{TokenId, Tokenizer};

const PARAGRAPH_SEPARATOR: &str = "\n\n";
const SENTENCE_SEPARATOR: &str = " ";

/// Which policy produced a split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitStrategy {
    Paragraph,
    Sentence,
    TokenWindow,
}

impl fmt::Display for SplitStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SplitStrategy::Paragraph => "paragraph",
            SplitStrategy::Sentence => "sentence",
            SplitStrategy::TokenWindow => "token_window",
        };
        f.write_str(name)
    }
}

/// Splits one oversized text into sub-texts that each fit `chunk_size`.
///
/// Tries paragraph merging, then sentence merging, and finally slices the
/// raw token sequence. The first strategy whose every sub-text fits wins.
/// Consecutive sub-texts share up to `overlap` trailing tokens.
#[derive(Clone)]
pub struct SegmentSplitter {
    tokenizer: Arc<dyn Tokenizer>,
    chunk_size: usize,
    overlap: usize,
}

impl SegmentSplitter {
    pub fn new(tokenizer: Arc<dyn Tokenizer>, chunk_size: usize, overlap: usize) -> Self {
        Self {
            tokenizer,
            chunk_size: chunk_size.max(1),
            overlap,
        }
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        self.split_with_strategy(text).1
    }

    pub fn split_with_strategy(&self, text: &str) -> (SplitStrategy, Vec<String>) {
        let paragraphs: Vec<&str> = text.split(PARAGRAPH_SEPARATOR).collect();
        if paragraphs.len() > 1 {
            let merged = self.merge_segments(&paragraphs, PARAGRAPH_SEPARATOR);
            if self.fits(&merged) {
                return (SplitStrategy::Paragraph, merged);
            }
        }

        let sentences = split_sentences(text);
        if sentences.len() > 1 {
            let merged = self.merge_segments(&sentences, SENTENCE_SEPARATOR);
            if self.fits(&merged) {
                return (SplitStrategy::Sentence, merged);
            }
        }

        (SplitStrategy::TokenWindow, self.token_windows(text))
    }

    fn fits(&self, texts: &[String]) -> bool {
        texts
            .iter()
            .all(|text| self.tokenizer.count_tokens(text) <= self.chunk_size)
    }

    /// Greedy left-to-right merge, seeding each new buffer with the decoded
    /// tail of the previous sub-text when overlap is enabled.
    fn merge_segments(&self, segments: &[&str], separator: &str) -> Vec<String> {
        let separator_tokens = self.tokenizer.count_tokens(separator);
        let mut merged: Vec<String> = Vec::new();
        let mut parts: Vec<String> = Vec::new();
        let mut current_tokens = 0;

        for segment in segments {
            let segment_tokens = self.tokenizer.count_tokens(segment);
            let separator_cost = if parts.is_empty() { 0 } else { separator_tokens };

            if current_tokens + separator_cost + segment_tokens <= self.chunk_size {
                parts.push(segment.to_string());
                current_tokens += separator_cost + segment_tokens;
                continue;
            }

            if !parts.is_empty() {
                merged.push(parts.join(separator));
            }

            let tail = if self.overlap > 0 {
                merged.last().and_then(|previous| self.overlap_tail(previous))
            } else {
                None
            };

            match tail {
                Some(tail) => {
                    current_tokens = self.tokenizer.count_tokens(&tail) + segment_tokens;
                    parts = vec![tail, segment.to_string()];
                }
                None => {
                    current_tokens = segment_tokens;
                    parts = vec![segment.to_string()];
                }
            }
        }

        if !parts.is_empty() {
            merged.push(parts.join(separator));
        }

        merged
    }

    /// Last `overlap` tokens of `text`, decoded. The start moves forward past
    /// tokens that only decode together with what precedes them.
    fn overlap_tail(&self, text: &str) -> Option<String> {
        let tokens = self.tokenizer.encode(text);
        let mut start = tokens.len().saturating_sub(self.overlap);

        while start < tokens.len() {
            if let Ok(tail) = self.tokenizer.decode(&tokens[start..]) {
                return Some(tail).filter(|tail| !tail.is_empty());
            }
            start += 1;
        }

        None
    }

    /// Consecutive windows of `chunk_size` tokens advancing by
    /// `chunk_size - overlap` (at least one token). The last window ends at
    /// the end of the text.
    fn token_windows(&self, text: &str) -> Vec<String> {
        let tokens = self.tokenizer.encode(text);
        let mut windows = Vec::new();
        let mut start = 0;
        let mut emitted = 0;

        while start < tokens.len() {
            let end = (start + self.chunk_size).min(tokens.len());
            let (window_start, window_end, window) = self.fit_window(&tokens, start, end, emitted);
            windows.push(window);
            emitted = window_end;

            if window_end >= tokens.len() {
                break;
            }
            start = window_end
                .saturating_sub(self.overlap)
                .max(window_start + 1);
        }

        windows
    }

    /// Decode `tokens[start..end]`, shrinking the end until the text decodes
    /// and re-tokenizes within budget. The start may only move forward over
    /// tokens already emitted by the previous window.
    fn fit_window(
        &self,
        tokens: &[TokenId],
        start: usize,
        end: usize,
        emitted: usize,
    ) -> (usize, usize, String) {
        let last_start = emitted.max(start).min(end.saturating_sub(1));

        for window_start in start..=last_start {
            for window_end in (window_start + 1..=end).rev() {
                let Ok(text) = self.tokenizer.decode(&tokens[window_start..window_end]) else {
                    continue;
                };
                if self.tokenizer.count_tokens(&text) <= self.chunk_size {
                    return (window_start, window_end, text);
                }
            }
        }

        (start, end, self.tokenizer.decode_lossy(&tokens[start..end]))
    }
}

/// Split after `.`, `?` or `!` when followed by a space; the space is dropped.
pub(crate) fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut previous = None;

    for (idx, ch) in text.char_indices() {
        if ch == ' ' && matches!(previous, Some('.' | '?' | '!')) {
            sentences.push(&text[start..idx]);
            start = idx + ch.len_utf8();
        }
        previous = Some(ch);
    }
    sentences.push(&text[start..]);

    sentences
}
