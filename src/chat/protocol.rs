//! Wire contract for the chat endpoint
//!
//! Outbound: POST a JSON body carrying the full conversation history plus a
//! human-readable timestamp (the endpoint is stateless between calls and has
//! no clock of its own). Inbound: either a newline-delimited `data:` event
//! stream terminated by the `[DONE]` sentinel, or a legacy single JSON object
//! with a `reply` field.

use serde::{Deserialize, Serialize};

use crate::transcript::Message;

/// Event prefix for streamed response lines
pub const DATA_PREFIX: &str = "data:";

/// Sentinel payload signaling the stream intentionally ended
pub const DONE_SENTINEL: &str = "[DONE]";

/// Outbound request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Full conversation history, in order
    pub history: Vec<Message>,
    /// Current wall-clock time as a weekday + time string
    #[serde(rename = "currentTime")]
    pub current_time: String,
}

/// Legacy non-streaming response body
#[derive(Debug, Clone, Deserialize)]
pub struct SingleReply {
    /// The complete assistant reply
    pub reply: String,
}

/// One streamed event payload
#[derive(Debug, Clone, Deserialize)]
pub struct StreamEvent {
    /// Completion choices; only the first is consulted
    #[serde(default)]
    pub choices: Vec<StreamChoice>,
}

/// A single choice within a streamed event
#[derive(Debug, Clone, Deserialize)]
pub struct StreamChoice {
    /// Incremental content for this choice
    #[serde(default)]
    pub delta: StreamDelta,
}

/// Incremental content fragment
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StreamDelta {
    /// New assistant text, absent on role/bookkeeping events
    #[serde(default)]
    pub content: Option<String>,
}

impl StreamEvent {
    /// Extract the text delta from this event, if any
    #[must_use]
    pub fn text_delta(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.delta.content.as_deref())
    }
}
