use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single, already-cleaned message of a conversation thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    /// Sender as it appears in the `From` header, e.g. `Alice <alice@example.com>`
    pub sender: String,
    #[serde(default)]
    pub recipients: Vec<String>,
    pub date: DateTime<Utc>,
    pub content: String,
    /// Ordinal position inside the thread
    #[serde(default)]
    pub position: usize,
}

impl Message {
    pub fn new(
        sender: impl Into<String>,
        date: DateTime<Utc>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            message_id: None,
            sender: sender.into(),
            recipients: Vec::new(),
            date,
            content: content.into(),
            position: 0,
        }
    }

    pub fn with_id(mut self, message_id: impl Into<String>) -> Self {
        self.message_id = Some(message_id.into());
        self
    }

    pub fn with_recipients(mut self, recipients: Vec<String>) -> Self {
        self.recipients = recipients;
        self
    }
}

/// An ordered conversation thread.
///
/// Message order is chronological and load-bearing: it defines which
/// messages are packed together and what "preceding" means.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    pub thread_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Thread {
    pub fn new(thread_id: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            subject: None,
            messages: Vec::new(),
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Append a message, stamping its position from the current length.
    pub fn with_message(mut self, message: Message) -> Self {
        self.push_message(message);
        self
    }

    pub fn push_message(&mut self, mut message: Message) {
        message.position = self.messages.len();
        self.messages.push(message);
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }
}
