//! Chat session controller
//!
//! Owns the transcript and orchestrates one exchange at a time:
//! `Idle -> AwaitingResponse -> Streaming -> Idle`. Success and failure both
//! land back in `Idle` with the affordances re-enabled. The full transcript
//! plus a wall-clock time string is sent on every request - the endpoint is
//! stateless between calls.

use std::sync::Arc;

use chrono::Local;
use futures::StreamExt;
use uuid::Uuid;

use crate::chat::decoder::{StreamChunk, StreamDecoder};
use crate::chat::protocol::{ChatRequest, SingleReply};
use crate::chat::transport::ChatTransport;
use crate::config::ResponseMode;
use crate::controls::Controls;
use crate::events::{PresentationSink, SessionEvent};
use crate::transcript::{Message, Transcript};

/// Exchange lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No exchange in flight
    Idle,
    /// Request issued, response not yet open
    AwaitingResponse,
    /// Response body is being decoded
    Streaming,
}

/// What a call to [`ChatSession::submit`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Input was empty after trimming, or submit was not actionable;
    /// nothing happened
    Ignored,
    /// Exchange completed; the finalized reply text (may be empty if the
    /// stream carried no content)
    Replied(String),
    /// Exchange failed; the fallback phrase was surfaced instead
    Fallback,
}

/// Controller for the conversational streaming session
pub struct ChatSession {
    transport: Arc<dyn ChatTransport>,
    sink: Arc<dyn PresentationSink>,
    controls: Controls,
    transcript: Transcript,
    state: SessionState,
    response_mode: ResponseMode,
    fallback_phrase: String,
}

impl ChatSession {
    /// Create a session in the idle state with an empty transcript
    #[must_use]
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        sink: Arc<dyn PresentationSink>,
        controls: Controls,
        response_mode: ResponseMode,
        fallback_phrase: String,
    ) -> Self {
        Self {
            transport,
            sink,
            controls,
            transcript: Transcript::new(),
            state: SessionState::Idle,
            response_mode,
            fallback_phrase,
        }
    }

    /// Current lifecycle state
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Read-only view of the conversation so far
    #[must_use]
    pub fn transcript(&self) -> &[Message] {
        self.transcript.all()
    }

    /// Notify the presentation layer that the panel opened
    pub fn open_panel(&self) {
        self.sink.notify(SessionEvent::PanelOpened);
    }

    /// Close the panel, clearing the transcript in full
    pub fn close_panel(&mut self) {
        self.transcript.clear();
        self.sink.notify(SessionEvent::PanelClosed);
        tracing::debug!("panel closed, transcript cleared");
    }

    /// Submit user text and run the exchange to completion
    ///
    /// Whitespace-only input is a silent no-op: no state change, no network
    /// activity. Failures never propagate - the fallback phrase is surfaced
    /// and the session returns to idle; the user may resubmit manually.
    pub async fn submit(&mut self, text: &str) -> SubmitOutcome {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            tracing::debug!("ignoring empty submission");
            return SubmitOutcome::Ignored;
        }
        if !self.controls.submit_enabled() {
            tracing::debug!("submit not actionable, ignoring");
            return SubmitOutcome::Ignored;
        }

        let exchange = Uuid::new_v4();
        tracing::info!(exchange = %exchange, chars = trimmed.len(), "exchange started");

        self.transcript.append(Message::user(trimmed));
        self.state = SessionState::AwaitingResponse;
        self.controls.disable_for_exchange();
        self.controls.clear_input();
        self.sink.notify(SessionEvent::ExchangeStarted);

        let request = ChatRequest {
            history: self.transcript.all().to_vec(),
            current_time: current_time_string(),
        };

        let body = match self.transport.send(&request).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(exchange = %exchange, error = %e, "request failed");
                return self.fail_exchange();
            }
        };

        self.state = SessionState::Streaming;

        let reply = match self.response_mode {
            ResponseMode::Streaming => self.consume_stream(body).await,
            ResponseMode::Single => Self::consume_single(body).await,
        };

        match reply {
            Ok(text) => self.finalize_reply(exchange, text),
            Err(e) => {
                tracing::warn!(exchange = %exchange, error = %e, "response body failed");
                self.fail_exchange()
            }
        }
    }

    /// Decode the streamed body, notifying per delta
    async fn consume_stream(
        &mut self,
        mut body: crate::chat::transport::ByteStream,
    ) -> crate::Result<String> {
        let mut decoder = StreamDecoder::new();
        let mut pending = String::new();

        while let Some(piece) = body.next().await {
            for chunk in decoder.feed(&piece?) {
                match chunk {
                    StreamChunk::Delta(delta) => {
                        pending.push_str(&delta);
                        // Incremental delivery is the entire point of
                        // streaming - never buffer to the end
                        self.sink.notify(SessionEvent::PartialReply(pending.clone()));
                    }
                    StreamChunk::Done => return Ok(pending),
                }
            }
            if decoder.is_done() {
                return Ok(pending);
            }
        }

        // Transport EOF without the sentinel
        for chunk in decoder.finish() {
            if let StreamChunk::Delta(delta) = chunk {
                pending.push_str(&delta);
                self.sink.notify(SessionEvent::PartialReply(pending.clone()));
            }
        }
        Ok(pending)
    }

    /// Collect the whole body and parse the legacy `{ "reply": ... }` shape
    async fn consume_single(
        mut body: crate::chat::transport::ByteStream,
    ) -> crate::Result<String> {
        let mut bytes = Vec::new();
        while let Some(piece) = body.next().await {
            bytes.extend_from_slice(&piece?);
        }
        let reply: SingleReply = serde_json::from_slice(&bytes)
            .map_err(|e| crate::Error::Protocol(format!("reply body: {e}")))?;
        Ok(reply.reply)
    }

    /// Success path: append a non-empty reply and return to idle
    fn finalize_reply(&mut self, exchange: Uuid, reply: String) -> SubmitOutcome {
        if reply.is_empty() {
            tracing::info!(exchange = %exchange, "exchange completed with empty reply");
        } else {
            self.transcript.append(Message::assistant(reply.clone()));
            tracing::info!(exchange = %exchange, chars = reply.len(), "exchange completed");
        }
        self.sink.notify(SessionEvent::ReplyFinalized(reply.clone()));
        self.conclude();
        SubmitOutcome::Replied(reply)
    }

    /// Failure path: surface the fallback phrase, never touch the transcript
    fn fail_exchange(&mut self) -> SubmitOutcome {
        self.sink
            .notify(SessionEvent::FallbackShown(self.fallback_phrase.clone()));
        self.conclude();
        SubmitOutcome::Fallback
    }

    /// Guaranteed cleanup shared by every exit path
    fn conclude(&mut self) {
        self.state = SessionState::Idle;
        self.controls.restore();
    }
}

/// Format the current wall-clock time as a weekday + time string
///
/// Lets the endpoint produce time-aware replies without its own clock.
#[must_use]
pub fn current_time_string() -> String {
    Local::now().format("%A %-I:%M %p").to_string()
}
