use threadwise_types::Message;

/// Joins formatted messages inside a chunk.
pub const MESSAGE_SEPARATOR: &str = "\n\n";

/// Token cost charged for each message separator while packing a chunk.
pub const SEPARATOR_TOKEN_COST: usize = 2;

pub fn format_header(message: &Message) -> String {
    format!(
        "**From: {} ({})**",
        message.sender,
        message.date.format("%Y-%m-%d %H:%M")
    )
}

/// Header line, blank line, then the message body.
pub fn format_message(message: &Message) -> String {
    format!("{}\n\n{}", format_header(message), message.content)
}
