//! Conversational streaming session
//!
//! Request/response orchestration over the chat endpoint: wire types,
//! transport seam, incremental stream decoding, and the exchange state
//! machine.

mod decoder;
pub mod protocol;
mod session;
mod transport;

pub use decoder::{StreamChunk, StreamDecoder};
pub use protocol::{ChatRequest, SingleReply, StreamEvent};
pub use session::{ChatSession, SessionState, SubmitOutcome, current_time_string};
pub use transport::{ByteStream, ChatTransport, HttpTransport};
