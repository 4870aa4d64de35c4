use std::sync::{Arc, LazyLock};

use regex::Regex;
use threadwise_types::Message;

use crate::tokenizer::Tokenizer;

/// Token allowance for a synthesized context string, template included.
pub const PRECEDING_CONTEXT_BUDGET: usize = 100;

const FIRST_LINE_CHARS: usize = 80;
const FRAGMENT_SEPARATOR: &str = " | ";
// Charged once up front for the "[Preceding: ...]" wrapper and one separator.
const TEMPLATE_OVERHEAD: &str = "[Preceding:  | ]";

static NAME_WITH_ADDRESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+?)\s*<[^>]+>$").expect("display name pattern is valid")
});

/// `"Alice Smith <alice@example.com>"` becomes `"Alice Smith"`; anything
/// else is returned unchanged.
pub fn display_name(sender: &str) -> &str {
    NAME_WITH_ADDRESS
        .captures(sender)
        .and_then(|caps| caps.get(1))
        .map(|name| name.as_str().trim())
        .unwrap_or(sender)
}

/// Builds the short "preceding context" blurb attached to later chunks.
#[derive(Clone)]
pub struct ContextSynthesizer {
    tokenizer: Arc<dyn Tokenizer>,
    budget: usize,
}

impl ContextSynthesizer {
    pub fn new(tokenizer: Arc<dyn Tokenizer>) -> Self {
        Self {
            tokenizer,
            budget: PRECEDING_CONTEXT_BUDGET,
        }
    }

    /// Summarize `preceding` (earliest first) within the token budget.
    ///
    /// Fragments are taken in chronological order and accumulation stops at
    /// the first fragment that would overflow, so the most recent preceding
    /// messages are the ones dropped when the budget runs out.
    pub fn synthesize(&self, preceding: &[Message]) -> Option<String> {
        if preceding.is_empty() {
            return None;
        }

        let mut used = self.tokenizer.count_tokens(TEMPLATE_OVERHEAD);
        let mut fragments = Vec::new();

        for message in preceding {
            let fragment = self.fragment(message);
            let cost = self.tokenizer.count_tokens(&fragment);
            if used + cost > self.budget {
                break;
            }
            used += cost;
            fragments.push(fragment);
        }

        if fragments.is_empty() {
            return None;
        }

        Some(format!("[Preceding: {}]", fragments.join(FRAGMENT_SEPARATOR)))
    }

    fn fragment(&self, message: &Message) -> String {
        let first_line: String = message
            .content
            .split('\n')
            .next()
            .unwrap_or_default()
            .chars()
            .take(FIRST_LINE_CHARS)
            .collect();

        format!(
            "{} ({}): '{}...'",
            display_name(&message.sender),
            message.date.format("%b %d"),
            first_line
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::TiktokenTokenizer;
    use chrono::{TimeZone, Utc};

    fn synthesizer() -> ContextSynthesizer {
        ContextSynthesizer::new(Arc::new(TiktokenTokenizer::cl100k().unwrap()))
    }

    fn message(sender: &str, day: u32, content: &str) -> Message {
        let date = Utc.with_ymd_and_hms(2024, 1, day, 9, 0, 0).unwrap();
        Message::new(sender, date, content)
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("Alice Smith <alice@example.com>"), "Alice Smith");
        assert_eq!(display_name("Bob<bob@example.com>"), "Bob");
        assert_eq!(display_name("carol@example.com"), "carol@example.com");
        assert_eq!(display_name("<only@address.com>"), "<only@address.com>");
    }

    #[test]
    fn test_no_preceding_messages() {
        assert_eq!(synthesizer().synthesize(&[]), None);
    }

    #[test]
    fn test_single_fragment_format() {
        let preceding = vec![message(
            "Alice <a@t.com>",
            15,
            "Can we move the launch?\nDetails below.",
        )];

        let context = synthesizer().synthesize(&preceding).unwrap();
        assert_eq!(
            context,
            "[Preceding: Alice (Jan 15): 'Can we move the launch?...']"
        );
    }

    #[test]
    fn test_fragments_joined_in_order() {
        let preceding = vec![
            message("Alice <a@t.com>", 15, "First point"),
            message("Bob <b@t.com>", 16, "Second point"),
        ];

        let context = synthesizer().synthesize(&preceding).unwrap();
        assert_eq!(
            context,
            "[Preceding: Alice (Jan 15): 'First point...' | Bob (Jan 16): 'Second point...']"
        );
    }

    #[test]
    fn test_first_line_truncated_to_80_chars() {
        let long_line = "x".repeat(200);
        let preceding = vec![message("Alice", 15, &long_line)];

        let context = synthesizer().synthesize(&preceding).unwrap();
        let quoted = format!("'{}...'", "x".repeat(80));
        assert!(context.contains(&quoted));
        assert!(!context.contains(&"x".repeat(81)));
    }

    #[test]
    fn test_budget_keeps_earliest_messages() {
        let preceding: Vec<Message> = (1..=20)
            .map(|day| {
                message(
                    &format!("Sender{} <s{}@t.com>", day, day),
                    day,
                    &format!("Update number {} about the migration timeline", day),
                )
            })
            .collect();

        let context = synthesizer().synthesize(&preceding).unwrap();

        assert!(context.contains("Sender1 (Jan 01)"));
        assert!(!context.contains("Sender20 "));
        assert!(context.matches(FRAGMENT_SEPARATOR).count() < 19);
    }

    #[test]
    fn test_nothing_fits_returns_none() {
        // Digits encode in groups of three, so this alone is ~200 tokens.
        let sender = "9".repeat(600);
        let preceding = vec![message(&sender, 15, "hi")];
        assert_eq!(synthesizer().synthesize(&preceding), None);
    }
}
