//! Presentation notifications
//!
//! The session core never touches rendering. Instead both controllers emit
//! [`SessionEvent`]s through a [`PresentationSink`], and the presentation
//! layer (avatar video, panel visuals) subscribes to them. Delivery is
//! best-effort and strictly in transition order.

/// State notification for the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Chat panel opened; companion enters its listening pose
    PanelOpened,
    /// Chat panel closed; transcript was cleared
    PanelClosed,
    /// An exchange started (request issued)
    ExchangeStarted,
    /// Running partial reply text changed
    PartialReply(String),
    /// Reply finalized and appended to the transcript
    ReplyFinalized(String),
    /// Exchange failed; the fallback phrase is shown instead
    FallbackShown(String),
    /// Voice capture started
    CaptureStarted,
    /// Voice capture stopped; captured text was submitted
    CaptureStopped,
    /// Voice capture cancelled; captured text was discarded
    CaptureCancelled,
    /// Pointer slid outside the capture control mid-hold (true) or back
    /// inside (false); drives the "release to cancel" affordance
    CancelArmed(bool),
    /// Interim recognition text changed
    InterimTranscript(String),
}

/// Receives session events from the controllers
///
/// Implementations must be cheap and non-blocking; they run inline at each
/// state transition.
pub trait PresentationSink: Send + Sync {
    /// Deliver one event
    fn notify(&self, event: SessionEvent);
}

/// Sink that drops every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl PresentationSink for NullSink {
    fn notify(&self, _event: SessionEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Sink that records events for assertions
    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<SessionEvent>>,
    }

    impl PresentationSink for RecordingSink {
        fn notify(&self, event: SessionEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    #[test]
    fn events_recorded_in_order() {
        let sink = RecordingSink::default();
        sink.notify(SessionEvent::ExchangeStarted);
        sink.notify(SessionEvent::PartialReply("Hi".to_string()));
        sink.notify(SessionEvent::ReplyFinalized("Hi there".to_string()));

        let events = sink.events.lock().unwrap();
        assert_eq!(events[0], SessionEvent::ExchangeStarted);
        assert_eq!(events[2], SessionEvent::ReplyFinalized("Hi there".to_string()));
    }
}
