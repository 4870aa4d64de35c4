use std::sync::Arc;

use threadwise_chunker::{
    format_message, ChunkAssembler, TiktokenTokenizer, Tokenizer, MESSAGE_SEPARATOR,
};
use threadwise_llm::LLMProvider;
use threadwise_types::{Chunk, Thread};

use crate::config::{SummarizationConfig, SummaryMethod};
use crate::error::{Result, SummarizerError};

const EXCERPT_TOKENS: usize = 150;
// Headroom for the instruction text and chat framing.
const PROMPT_RESERVE_TOKENS: usize = 500;
const TRUNCATION_MARKER: &str = "[Earlier messages truncated]\n\n";
const NO_SUBJECT: &str = "(no subject)";
const SUMMARY_INSTRUCTION: &str = "Summarize the following email thread in a concise paragraph. \
Focus on the key topics, decisions, and action items.";

/// Produces the single summary chunk that sits above a thread's detail
/// chunks for coarse retrieval.
#[derive(Clone)]
pub struct ThreadSummarizer {
    config: SummarizationConfig,
    tokenizer: Arc<dyn Tokenizer>,
    assembler: ChunkAssembler,
    provider: Option<Arc<dyn LLMProvider>>,
}

impl ThreadSummarizer {
    /// Summarizer without an LLM; fails for [`SummaryMethod::Llm`].
    pub fn new(config: SummarizationConfig) -> Result<Self> {
        Self::build(config, None)
    }

    pub fn with_provider(
        config: SummarizationConfig,
        provider: Arc<dyn LLMProvider>,
    ) -> Result<Self> {
        Self::build(config, Some(provider))
    }

    fn build(config: SummarizationConfig, provider: Option<Arc<dyn LLMProvider>>) -> Result<Self> {
        config.validate()?;
        if config.method == SummaryMethod::Llm && provider.is_none() {
            return Err(SummarizerError::MissingProvider);
        }
        let tokenizer = TiktokenTokenizer::from_name(&config.tokenizer)?;

        Ok(Self {
            assembler: ChunkAssembler::new(config.source_type.clone()),
            tokenizer: Arc::new(tokenizer),
            provider,
            config,
        })
    }

    /// Replace the tokenizer used for excerpts and the prompt budget.
    pub fn with_tokenizer(mut self, tokenizer: Arc<dyn Tokenizer>) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    pub fn config(&self) -> &SummarizationConfig {
        &self.config
    }

    pub async fn summarize_thread(&self, thread: &Thread, project_id: &str) -> Result<Chunk> {
        let first_message = thread
            .messages
            .first()
            .ok_or_else(|| SummarizerError::EmptyThread(thread.thread_id.clone()))?;

        let text = match (self.config.method, &self.provider) {
            (SummaryMethod::Llm, Some(provider)) => {
                let prompt = self.prompt(thread);
                tracing::debug!(
                    thread_id = %thread.thread_id,
                    prompt_tokens = self.tokenizer.count_tokens(&prompt),
                    "Requesting LLM thread summary"
                );
                provider.generate(&prompt).await?
            }
            (SummaryMethod::Llm, None) => return Err(SummarizerError::MissingProvider),
            (SummaryMethod::Extractive, _) => self.extractive_summary(thread),
        };

        Ok(self
            .assembler
            .summary(thread, project_id, text, first_message))
    }

    /// The full LLM prompt for `thread`, trimmed to the context window.
    pub fn prompt(&self, thread: &Thread) -> String {
        format!("{}\n\n{}", SUMMARY_INSTRUCTION, self.fit_transcript(thread))
    }

    /// Every formatted message if they fit; otherwise the most recent ones
    /// that do, behind a truncation marker.
    fn fit_transcript(&self, thread: &Thread) -> String {
        let parts: Vec<String> = thread.messages.iter().map(format_message).collect();
        let budget = self
            .config
            .context_window
            .saturating_sub(self.config.max_summary_tokens)
            .saturating_sub(PROMPT_RESERVE_TOKENS);

        let combined = parts.join(MESSAGE_SEPARATOR);
        if self.tokenizer.count_tokens(&combined) <= budget {
            return combined;
        }

        let mut used = 0;
        let mut kept = 0;
        for part in parts.iter().rev() {
            let cost = self.tokenizer.count_tokens(part) + 2;
            if used + cost > budget {
                break;
            }
            used += cost;
            kept += 1;
        }

        tracing::debug!(
            thread_id = %thread.thread_id,
            kept,
            dropped = parts.len() - kept,
            budget,
            "Truncated thread for LLM summary"
        );

        format!(
            "{}{}",
            TRUNCATION_MARKER,
            parts[parts.len() - kept..].join(MESSAGE_SEPARATOR)
        )
    }

    fn extractive_summary(&self, thread: &Thread) -> String {
        let subject = thread.subject.as_deref().unwrap_or(NO_SUBJECT);

        match thread.messages.as_slice() {
            [] => format!("Thread: {}", subject),
            [only] => format!("Thread: {}\n\n{}", subject, self.excerpt(&only.content)),
            [first, .., last] => format!(
                "Thread: {}\n\n{}\n\n[...]\n\n{}",
                subject,
                self.excerpt(&first.content),
                self.excerpt(&last.content)
            ),
        }
    }

    /// First paragraph, cut to at most [`EXCERPT_TOKENS`] tokens.
    fn excerpt(&self, content: &str) -> String {
        let paragraph = content.split("\n\n").next().unwrap_or_default();
        let tokens = self.tokenizer.encode(paragraph);
        if tokens.len() <= EXCERPT_TOKENS {
            return paragraph.to_string();
        }

        // Back off until the cut lands on a character boundary.
        (1..=EXCERPT_TOKENS)
            .rev()
            .find_map(|end| self.tokenizer.decode(&tokens[..end]).ok())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use threadwise_types::Message;

    fn thread(contents: &[&str]) -> Thread {
        let date = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
        contents.iter().fold(
            Thread::new("thread1").with_subject("Test Subject"),
            |thread, content| thread.with_message(Message::new("Alice <alice@test.com>", date, *content)),
        )
    }

    fn summarizer() -> ThreadSummarizer {
        ThreadSummarizer::new(SummarizationConfig::default()).unwrap()
    }

    #[test]
    fn test_extractive_single_message() {
        let text = summarizer().extractive_summary(&thread(&["Only message in the thread."]));
        assert_eq!(text, "Thread: Test Subject\n\nOnly message in the thread.");
    }

    #[test]
    fn test_extractive_first_and_last() {
        let text = summarizer().extractive_summary(&thread(&[
            "Opening remarks about the project.\n\nSecond paragraph.",
            "Middle discussion.",
            "Final conclusions and next steps.",
        ]));

        assert_eq!(
            text,
            "Thread: Test Subject\n\nOpening remarks about the project.\n\n[...]\n\nFinal conclusions and next steps."
        );
    }

    #[test]
    fn test_excerpt_truncates_long_paragraph() {
        let summarizer = summarizer();
        let long = "word ".repeat(400);

        let excerpt = summarizer.excerpt(&long);

        assert!(summarizer.tokenizer.count_tokens(&excerpt) <= EXCERPT_TOKENS);
        assert!(long.starts_with(&excerpt));
    }

    #[test]
    fn test_missing_subject() {
        let mut thread = thread(&["Hi."]);
        thread.subject = None;
        assert!(summarizer()
            .extractive_summary(&thread)
            .starts_with("Thread: (no subject)\n\n"));
    }

    #[test]
    fn test_llm_without_provider_fails() {
        assert!(matches!(
            ThreadSummarizer::new(SummarizationConfig::llm()),
            Err(SummarizerError::MissingProvider)
        ));
    }
}
