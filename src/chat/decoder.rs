//! Incremental decoder for the streamed chat response body
//!
//! Turns arbitrarily-sized byte chunks into an ordered sequence of text
//! deltas. The body is UTF-8, newline-delimited; lines carrying the `data:`
//! prefix hold a JSON event payload, everything else is ignored. The decoder
//! buffers raw bytes rather than decoded text so a chunk boundary may fall
//! anywhere - mid-line, mid-JSON, or inside a multi-byte character - without
//! affecting the emitted sequence.

use crate::chat::protocol::{DATA_PREFIX, DONE_SENTINEL, StreamEvent};

/// A decoded unit of the response stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamChunk {
    /// Incremental assistant text
    Delta(String),
    /// Terminal marker; nothing follows
    Done,
}

/// Outcome of decoding one complete line
enum LineOutcome {
    /// Emit this text delta
    Delta(String),
    /// Sentinel observed, stream is over
    Terminate,
    /// Ignored or malformed line
    Skip,
}

/// Non-restartable push decoder for one response stream
#[derive(Debug, Default)]
pub struct StreamDecoder {
    buffer: Vec<u8>,
    done: bool,
}

impl StreamDecoder {
    /// Create a decoder for a fresh response stream
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buffer: Vec::new(),
            done: false,
        }
    }

    /// Feed the next piece of the response body
    ///
    /// Returns the chunks completed by this piece, in arrival order. An
    /// incomplete trailing line is held back and reassembled against the
    /// next piece. Once [`StreamChunk::Done`] has been emitted, further
    /// input is discarded.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<StreamChunk> {
        if self.done {
            return Vec::new();
        }

        self.buffer.extend_from_slice(bytes);

        let mut chunks = Vec::new();
        while let Some(newline) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            match Self::decode_line(&line[..line.len() - 1]) {
                LineOutcome::Delta(text) => chunks.push(StreamChunk::Delta(text)),
                LineOutcome::Terminate => {
                    self.terminate(&mut chunks);
                    break;
                }
                LineOutcome::Skip => {}
            }
        }

        chunks
    }

    /// Signal end-of-stream from the transport
    ///
    /// A trailing line that never received its newline is decoded here,
    /// then the terminal marker is emitted (unless the sentinel already
    /// ended the stream).
    pub fn finish(&mut self) -> Vec<StreamChunk> {
        if self.done {
            return Vec::new();
        }

        let mut chunks = Vec::new();
        let residue = std::mem::take(&mut self.buffer);
        if !residue.is_empty() {
            if let LineOutcome::Delta(text) = Self::decode_line(&residue) {
                chunks.push(StreamChunk::Delta(text));
            }
        }

        self.terminate(&mut chunks);
        chunks
    }

    /// Whether the stream has terminated
    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.done
    }

    fn terminate(&mut self, chunks: &mut Vec<StreamChunk>) {
        self.done = true;
        self.buffer.clear();
        chunks.push(StreamChunk::Done);
    }

    /// Decode one complete line (newline already stripped)
    ///
    /// Malformed lines - invalid UTF-8, broken JSON, missing fields - are
    /// skipped; they must not abort the stream. Empty deltas are suppressed.
    fn decode_line(raw: &[u8]) -> LineOutcome {
        let Ok(line) = std::str::from_utf8(raw) else {
            tracing::debug!(len = raw.len(), "skipping non-UTF-8 line");
            return LineOutcome::Skip;
        };

        let Some(payload) = line.trim().strip_prefix(DATA_PREFIX) else {
            return LineOutcome::Skip;
        };
        let payload = payload.trim();

        if payload == DONE_SENTINEL {
            return LineOutcome::Terminate;
        }

        match serde_json::from_str::<StreamEvent>(payload) {
            Ok(event) => match event.text_delta() {
                Some(text) if !text.is_empty() => LineOutcome::Delta(text.to_string()),
                _ => LineOutcome::Skip,
            },
            Err(e) => {
                tracing::debug!(error = %e, "skipping malformed event line");
                LineOutcome::Skip
            }
        }
    }
}
