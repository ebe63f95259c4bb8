//! Shared input field and control affordances
//!
//! The input field and the submit/capture buttons are shared mutable state
//! between the chat session and the voice capture controller. There is one
//! thread of control, so correctness rests on the disabling discipline, not
//! locks: an in-flight exchange disables capture, and an active capture
//! disables submit (the field is the engine's interim-output surface while
//! capturing, so a concurrent submit would read a half-revised transcript).

use std::sync::{Arc, Mutex};

/// Snapshot of the shared control state
#[derive(Debug, Clone, Default)]
struct ControlState {
    input_text: String,
    submit_enabled: bool,
    capture_enabled: bool,
}

/// Handle to the shared input field and affordances
///
/// Clones share the same underlying state.
#[derive(Debug, Clone)]
pub struct Controls {
    state: Arc<Mutex<ControlState>>,
}

impl Default for Controls {
    fn default() -> Self {
        Self::new()
    }
}

impl Controls {
    /// Create controls with both affordances enabled and an empty field
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ControlState {
                input_text: String::new(),
                submit_enabled: true,
                capture_enabled: true,
            })),
        }
    }

    /// Current input field text
    #[must_use]
    pub fn input_text(&self) -> String {
        self.lock().input_text.clone()
    }

    /// Overwrite the input field (interim recognition results are
    /// cumulative, so each update replaces the previous one)
    pub fn set_input_text(&self, text: impl Into<String>) {
        self.lock().input_text = text.into();
    }

    /// Clear the input field
    pub fn clear_input(&self) {
        self.lock().input_text.clear();
    }

    /// Take the input field text, leaving it empty
    #[must_use]
    pub fn take_input(&self) -> String {
        std::mem::take(&mut self.lock().input_text)
    }

    /// Whether the submit affordance is actionable
    #[must_use]
    pub fn submit_enabled(&self) -> bool {
        self.lock().submit_enabled
    }

    /// Whether the capture affordance is actionable
    #[must_use]
    pub fn capture_enabled(&self) -> bool {
        self.lock().capture_enabled
    }

    /// Disable both affordances for the duration of an exchange
    pub fn disable_for_exchange(&self) {
        let mut state = self.lock();
        state.submit_enabled = false;
        state.capture_enabled = false;
    }

    /// Disable submit while capture is producing interim text
    pub fn disable_for_capture(&self) {
        self.lock().submit_enabled = false;
    }

    /// Re-enable both affordances (every exit path lands here)
    pub fn restore(&self) {
        let mut state = self.lock();
        state.submit_enabled = true;
        state.capture_enabled = true;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ControlState> {
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
