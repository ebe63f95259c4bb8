//! Arelia - chat streaming and voice capture session core
//!
//! The session core behind a virtual-companion UI: a streaming chat
//! exchange state machine, an incremental response decoder, and a
//! push-to-talk voice capture state machine, all decoupled from
//! presentation.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │              Presentation (external)                 │
//! │   avatar video  │  chat panel  │  capture control   │
//! └───────▲──────────────────┬─────────────────▲────────┘
//!         │ SessionEvents    │ input           │ gestures
//! ┌───────┴──────────────────▼─────────────────┴────────┐
//! │                  Session core                        │
//! │   ChatSession  │  Controls  │  CaptureController    │
//! │   StreamDecoder │ Transcript │  SpeechEngine seam   │
//! └──────────────────────┬──────────────────────────────┘
//!                        │ POST history + time
//! ┌──────────────────────▼──────────────────────────────┐
//! │           Chat endpoint (opaque, remote)             │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod chat;
pub mod config;
pub mod controls;
pub mod error;
pub mod events;
pub mod transcript;
pub mod voice;

pub use chat::{
    ByteStream, ChatRequest, ChatSession, ChatTransport, HttpTransport, SessionState,
    StreamChunk, StreamDecoder, SubmitOutcome,
};
pub use config::{Config, InteractionMode, ResponseMode, VoiceConfig};
pub use controls::Controls;
pub use error::{Error, Result};
pub use events::{NullSink, PresentationSink, SessionEvent};
pub use transcript::{Message, Role, Transcript};
pub use voice::{CaptureController, CaptureOutcome, CaptureState, EngineEvent, SpeechEngine};
