//! Voice capture controller
//!
//! Wraps the host's recognition engine behind a start/stop/cancel state
//! machine: `Idle -> Capturing -> Finalizing -> Idle`. Two interaction modes
//! exist: toggle (activate to start, again to stop) and press-and-hold,
//! where releasing with the pointer outside the control's bounds discards
//! the utterance (slide-to-cancel).
//!
//! The stop decision is deferred: after the raw release the controller sits
//! in `Finalizing` for a short grace period so the engine can flush its
//! final transcript revision, then [`CaptureController::finalize`] consults
//! the latched cancel flag and settles submit-or-discard.

use std::sync::Arc;
use std::time::Duration;

use crate::config::InteractionMode;
use crate::controls::Controls;
use crate::events::{PresentationSink, SessionEvent};
use crate::voice::engine::{EngineEvent, SpeechEngine};

/// Grace period between the raw release and the submit-or-cancel decision
pub const DEFAULT_GRACE: Duration = Duration::from_millis(200);

/// Capture lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// Not capturing
    Idle,
    /// Engine running, interim text flowing into the input field
    Capturing,
    /// Release received, waiting out the grace period
    Finalizing,
}

/// Result of a finalized capture
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// Capture ended inside the control; forward this text to the chat
    /// session
    Submitted(String),
    /// Capture was cancelled; the input field was emptied
    Cancelled,
}

/// Push-to-talk / toggle state machine over a speech engine
pub struct CaptureController {
    engine: Box<dyn SpeechEngine>,
    sink: Arc<dyn PresentationSink>,
    controls: Controls,
    mode: InteractionMode,
    locale: String,
    hints: Vec<String>,
    grace: Duration,
    state: CaptureState,
    cancel_requested: bool,
    pointer_inside: bool,
    captured: String,
}

impl CaptureController {
    /// Create a controller over a detected engine
    ///
    /// The capability check lives with the caller: when the host offers no
    /// engine there is nothing to construct and the control stays hidden.
    #[must_use]
    pub fn new(
        engine: Box<dyn SpeechEngine>,
        sink: Arc<dyn PresentationSink>,
        controls: Controls,
        mode: InteractionMode,
        locale: String,
        hints: Vec<String>,
        grace: Duration,
    ) -> Self {
        Self {
            engine,
            sink,
            controls,
            mode,
            locale,
            hints,
            grace,
            state: CaptureState::Idle,
            cancel_requested: false,
            pointer_inside: true,
            captured: String::new(),
        }
    }

    /// Current lifecycle state
    #[must_use]
    pub const fn state(&self) -> CaptureState {
        self.state
    }

    /// Configured grace period
    #[must_use]
    pub const fn grace(&self) -> Duration {
        self.grace
    }

    /// Press the capture control (press-and-hold mode)
    ///
    /// Returns whether capture actually started. A press while the capture
    /// affordance is disabled (chat exchange in flight) is a no-op.
    pub fn press(&mut self) -> bool {
        if self.mode != InteractionMode::PressHold {
            return false;
        }
        self.begin()
    }

    /// Release the capture control (press-and-hold mode)
    ///
    /// Enters `Finalizing`; the caller waits out [`Self::grace`] and then
    /// calls [`Self::finalize`]. See [`Self::complete_release`] for the
    /// combined form.
    pub fn release(&mut self) {
        if self.state != CaptureState::Capturing {
            return;
        }
        self.state = CaptureState::Finalizing;
        self.engine.stop();
        tracing::debug!(
            cancel_requested = self.cancel_requested,
            "release received, awaiting final revision"
        );
    }

    /// Activate the toggle control: starts capture when idle, otherwise
    /// requests the stop that [`Self::finalize`] will settle
    pub fn toggle(&mut self) -> bool {
        if self.mode != InteractionMode::Toggle {
            return false;
        }
        match self.state {
            CaptureState::Idle => self.begin(),
            CaptureState::Capturing => {
                self.state = CaptureState::Finalizing;
                self.engine.stop();
                true
            }
            CaptureState::Finalizing => false,
        }
    }

    /// Track pointer movement during a hold
    ///
    /// Leaving the control's bounds latches the cancel request and arms the
    /// "release to cancel" affordance; re-entering disarms it. Consulted
    /// only when the release is finalized.
    pub fn pointer_moved(&mut self, inside: bool) {
        if self.mode != InteractionMode::PressHold || self.state != CaptureState::Capturing {
            return;
        }
        if inside == self.pointer_inside {
            return;
        }
        self.pointer_inside = inside;
        self.cancel_requested = !inside;
        self.sink.notify(SessionEvent::CancelArmed(!inside));
    }

    /// Feed one engine event into the state machine
    pub fn on_engine_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::Interim(text) | EngineEvent::Final(text) => {
                if self.state == CaptureState::Idle {
                    return;
                }
                // Cumulative revision: overwrite, never append
                self.captured = text;
                self.controls.set_input_text(&self.captured);
                self.sink
                    .notify(SessionEvent::InterimTranscript(self.captured.clone()));
            }
            EngineEvent::End => {
                if self.state == CaptureState::Capturing {
                    tracing::debug!("engine ended on its own");
                    self.state = CaptureState::Finalizing;
                }
            }
            EngineEvent::Error(message) => {
                if self.state == CaptureState::Idle {
                    return;
                }
                tracing::warn!(error = %message, "recognition error, aborting capture");
                self.engine.abort();
                self.captured.clear();
                self.controls.clear_input();
                self.sink.notify(SessionEvent::CaptureCancelled);
                self.conclude();
            }
        }
    }

    /// Settle the deferred stop decision
    ///
    /// Called once the grace period after release has elapsed, so the
    /// engine has had its chance to flush a final revision. Evaluates the
    /// cancel flag latched during the hold: outside cancels, inside
    /// submits. Returns `None` when no release is pending.
    pub fn finalize(&mut self) -> Option<CaptureOutcome> {
        if self.state != CaptureState::Finalizing {
            return None;
        }

        let outcome = if self.cancel_requested {
            self.captured.clear();
            self.controls.clear_input();
            self.sink.notify(SessionEvent::CaptureCancelled);
            tracing::info!("capture cancelled");
            CaptureOutcome::Cancelled
        } else {
            let text = std::mem::take(&mut self.captured);
            self.controls.set_input_text(&text);
            self.sink.notify(SessionEvent::CaptureStopped);
            tracing::info!(chars = text.len(), "capture submitted");
            CaptureOutcome::Submitted(text)
        };

        self.conclude();
        Some(outcome)
    }

    /// Release and finalize in one step, sleeping out the grace period
    pub async fn complete_release(&mut self) -> Option<CaptureOutcome> {
        self.release();
        if self.state != CaptureState::Finalizing {
            return None;
        }
        tokio::time::sleep(self.grace).await;
        self.finalize()
    }

    /// Stop a toggle-mode capture and finalize after the grace period
    pub async fn complete_toggle(&mut self) -> Option<CaptureOutcome> {
        if !self.toggle() {
            return None;
        }
        tokio::time::sleep(self.grace).await;
        self.finalize()
    }

    /// Common start path for both modes
    fn begin(&mut self) -> bool {
        if self.state != CaptureState::Idle {
            return false;
        }
        if !self.controls.capture_enabled() {
            tracing::debug!("capture not actionable, ignoring");
            return false;
        }

        // The cancel latch survives until the next start
        self.cancel_requested = false;
        self.pointer_inside = true;
        self.captured.clear();

        if let Err(e) = self.engine.start(&self.locale, &self.hints) {
            tracing::warn!(error = %e, "speech engine failed to start");
            return false;
        }

        self.state = CaptureState::Capturing;
        self.controls.disable_for_capture();
        self.sink.notify(SessionEvent::CaptureStarted);
        tracing::info!(mode = ?self.mode, "capture started");
        true
    }

    /// Shared exit: back to idle with affordances restored
    fn conclude(&mut self) {
        self.state = CaptureState::Idle;
        self.controls.restore();
    }
}
