//! Voice input module
//!
//! Push-to-talk and toggle capture over an external recognition engine.
//! The engine itself is a host capability (see [`engine::SpeechEngine`]).

mod capture;
mod engine;

pub use capture::{CaptureController, CaptureOutcome, CaptureState, DEFAULT_GRACE};
pub use engine::{EngineEvent, SpeechEngine};
