//! Speech recognition engine boundary
//!
//! Recognition is a host capability (a browser runtime, an OS dictation
//! service), not something this crate implements. Hosts hand the capture
//! controller a [`SpeechEngine`] and pump its output back in as
//! [`EngineEvent`]s; when the host has no engine, no controller is
//! instantiated and the capture control is hidden entirely.

use crate::Result;

/// Output from the recognition engine
///
/// Transcript events carry the cumulative utterance so far, not deltas -
/// each revision replaces the previous one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Not-yet-final transcript revision
    Interim(String),
    /// Final transcript revision for the utterance
    Final(String),
    /// The engine stopped on its own (end of speech, timeout)
    End,
    /// The engine failed; capture must abort
    Error(String),
}

/// External speech-to-text engine behind start/stop/abort
///
/// Recognition language is fixed to a single locale for the engine's
/// lifetime. The hint list biases recognition toward known keywords
/// (e.g. the companion's wake word).
pub trait SpeechEngine: Send {
    /// Begin recognizing, biased by the given keyword hints
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Recognition`] if the engine cannot start
    fn start(&mut self, locale: &str, hints: &[String]) -> Result<()>;

    /// Request a graceful stop; the engine flushes its final transcript
    /// revision (as [`EngineEvent::Final`]) before going quiet
    fn stop(&mut self);

    /// Hard stop with no final revision
    fn abort(&mut self);
}
