//! Conversation transcript - append-only log of role-tagged messages
//!
//! The transcript is sent verbatim as conversation context on every request,
//! so ordering is load-bearing. It lives for one panel session and is cleared
//! in full when the panel closes.

use serde::{Deserialize, Serialize};

/// Who produced a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person typing or speaking
    User,
    /// The companion's reply
    Assistant,
}

/// One conversation turn, immutable once appended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message author
    pub role: Role,
    /// Message text
    pub content: String,
}

impl Message {
    /// Create a user message
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Ordered, append-only message log for a single panel session
#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    /// Create an empty transcript
    #[must_use]
    pub const fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    /// Append a message to the end of the log
    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Read-only ordered snapshot of all messages
    #[must_use]
    pub fn all(&self) -> &[Message] {
        &self.messages
    }

    /// Clear the transcript in full (panel close)
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Number of messages
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the transcript is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_preserves_order() {
        let mut transcript = Transcript::new();
        transcript.append(Message::user("hello"));
        transcript.append(Message::assistant("hi there"));
        transcript.append(Message::user("how are you?"));

        let all = transcript.all();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0], Message::user("hello"));
        assert_eq!(all[1], Message::assistant("hi there"));
        assert_eq!(all[2], Message::user("how are you?"));
    }

    #[test]
    fn clear_empties_in_full() {
        let mut transcript = Transcript::new();
        transcript.append(Message::user("a"));
        transcript.append(Message::assistant("b"));

        transcript.clear();
        assert!(transcript.is_empty());
        assert_eq!(transcript.len(), 0);
    }

    #[test]
    fn message_roles_serialize_lowercase() {
        let json = serde_json::to_string(&Message::user("hi")).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"hi"}"#);

        let json = serde_json::to_string(&Message::assistant("hey")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"hey"}"#);
    }
}
