//! Chat session integration tests
//!
//! Exercise the exchange state machine over scripted transports - no
//! network, no rendering surface.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use arelia_core::chat::{ByteStream, ChatRequest, ChatTransport};
use arelia_core::{
    ChatSession, Controls, Error, Message, PresentationSink, ResponseMode, SessionEvent,
    SessionState, SubmitOutcome,
};

const FALLBACK: &str = "(she seems to be away)";

/// Transport that replays canned body pieces and records every request
struct ScriptedTransport {
    pieces: Vec<Vec<u8>>,
    fail: bool,
    requests: Arc<Mutex<Vec<ChatRequest>>>,
    /// Checked at send time when present: affordances must already be
    /// disabled once the request is in flight
    controls: Option<Controls>,
}

impl ScriptedTransport {
    fn replying(pieces: Vec<Vec<u8>>) -> (Self, Arc<Mutex<Vec<ChatRequest>>>) {
        let requests = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                pieces,
                fail: false,
                requests: Arc::clone(&requests),
                controls: None,
            },
            requests,
        )
    }

    fn failing() -> (Self, Arc<Mutex<Vec<ChatRequest>>>) {
        let requests = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                pieces: Vec::new(),
                fail: true,
                requests: Arc::clone(&requests),
                controls: None,
            },
            requests,
        )
    }
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    async fn send(&self, request: &ChatRequest) -> arelia_core::Result<ByteStream> {
        self.requests.lock().unwrap().push(request.clone());

        if let Some(controls) = &self.controls {
            assert!(
                !controls.submit_enabled() && !controls.capture_enabled(),
                "affordances must be disabled while the request is in flight"
            );
        }

        if self.fail {
            return Err(Error::Transport("503 service unavailable".to_string()));
        }

        let pieces: Vec<arelia_core::Result<Vec<u8>>> =
            self.pieces.clone().into_iter().map(Ok).collect();
        Ok(Box::pin(futures::stream::iter(pieces)))
    }
}

/// Sink that records every event for assertions
#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<SessionEvent>>,
}

impl RecordingSink {
    fn events(&self) -> Vec<SessionEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl PresentationSink for RecordingSink {
    fn notify(&self, event: SessionEvent) {
        self.events.lock().unwrap().push(event);
    }
}

fn event_line(text: &str) -> String {
    format!("data: {{\"choices\":[{{\"delta\":{{\"content\":\"{text}\"}}}}]}}\n")
}

fn streamed_body(deltas: &[&str]) -> Vec<u8> {
    let mut body = String::new();
    for delta in deltas {
        body.push_str(&event_line(delta));
    }
    body.push_str("data: [DONE]\n");
    body.into_bytes()
}

fn session_over(
    transport: ScriptedTransport,
    mode: ResponseMode,
) -> (ChatSession, Arc<RecordingSink>, Controls) {
    let sink = Arc::new(RecordingSink::default());
    let controls = Controls::new();
    let session = ChatSession::new(
        Arc::new(transport),
        Arc::clone(&sink) as Arc<dyn PresentationSink>,
        controls.clone(),
        mode,
        FALLBACK.to_string(),
    );
    (session, sink, controls)
}

#[tokio::test]
async fn hello_exchange_end_to_end() {
    let (transport, requests) = ScriptedTransport::replying(vec![streamed_body(&["Hi", " there"])]);
    let (mut session, sink, _) = session_over(transport, ResponseMode::Streaming);

    let outcome = session.submit("hello").await;
    assert_eq!(outcome, SubmitOutcome::Replied("Hi there".to_string()));

    // Transcript holds both turns in order
    assert_eq!(
        session.transcript(),
        &[Message::user("hello"), Message::assistant("Hi there")]
    );

    // Exactly one request, carrying the full history at submit time
    let requests = requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].history, vec![Message::user("hello")]);
    assert!(!requests[0].current_time.is_empty());

    // Partial text progressed incrementally: "Hi" then "Hi there"
    let partials: Vec<String> = sink
        .events()
        .into_iter()
        .filter_map(|e| match e {
            SessionEvent::PartialReply(text) => Some(text),
            _ => None,
        })
        .collect();
    assert_eq!(partials, vec!["Hi".to_string(), "Hi there".to_string()]);
}

#[tokio::test]
async fn reply_is_identical_regardless_of_piece_boundaries() {
    let body = streamed_body(&["He", "llo \u{4E16}\u{754C}", "!"]);

    for piece_len in [1, 2, 3, 7, body.len()] {
        let pieces: Vec<Vec<u8>> = body.chunks(piece_len).map(<[u8]>::to_vec).collect();
        let (transport, _) = ScriptedTransport::replying(pieces);
        let (mut session, _, _) = session_over(transport, ResponseMode::Streaming);

        let outcome = session.submit("hi").await;
        assert_eq!(
            outcome,
            SubmitOutcome::Replied("Hello \u{4E16}\u{754C}!".to_string()),
            "piece length {piece_len}"
        );
    }
}

#[tokio::test]
async fn transport_failure_surfaces_fallback_without_transcript_pollution() {
    let (transport, _) = ScriptedTransport::failing();
    let (mut session, sink, controls) = session_over(transport, ResponseMode::Streaming);

    let outcome = session.submit("are you there?").await;
    assert_eq!(outcome, SubmitOutcome::Fallback);

    // Only the user message landed; the failed turn is never appended
    assert_eq!(session.transcript(), &[Message::user("are you there?")]);
    assert_eq!(session.state(), SessionState::Idle);

    // Affordances restored on the failure path
    assert!(controls.submit_enabled());
    assert!(controls.capture_enabled());

    assert!(
        sink.events()
            .contains(&SessionEvent::FallbackShown(FALLBACK.to_string()))
    );
}

#[tokio::test]
async fn resubmit_after_failure_keeps_history_consistent() {
    // First exchange fails at the transport
    let (transport, _) = ScriptedTransport::failing();
    let (mut session, _, _) = session_over(transport, ResponseMode::Streaming);
    session.submit("first try").await;
    assert_eq!(session.transcript(), &[Message::user("first try")]);

    // Manual resubmission: transcript gains only the new user message
    session.submit("second try").await;
    assert_eq!(
        session.transcript(),
        &[Message::user("first try"), Message::user("second try")]
    );
}

#[tokio::test]
async fn whitespace_submission_is_a_complete_no_op() {
    let (transport, requests) = ScriptedTransport::replying(vec![streamed_body(&["x"])]);
    let (mut session, sink, _) = session_over(transport, ResponseMode::Streaming);

    for input in ["", "   ", "\n\t  \n"] {
        let outcome = session.submit(input).await;
        assert_eq!(outcome, SubmitOutcome::Ignored);
    }

    assert!(session.transcript().is_empty());
    assert!(requests.lock().unwrap().is_empty());
    assert!(sink.events().is_empty());
}

#[tokio::test]
async fn input_is_trimmed_before_sending() {
    let (transport, requests) = ScriptedTransport::replying(vec![streamed_body(&["ok"])]);
    let (mut session, _, _) = session_over(transport, ResponseMode::Streaming);

    session.submit("  hello  \n").await;
    assert_eq!(
        requests.lock().unwrap()[0].history,
        vec![Message::user("hello")]
    );
}

#[tokio::test]
async fn affordances_disabled_while_request_in_flight() {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let controls = Controls::new();
    let transport = ScriptedTransport {
        pieces: vec![streamed_body(&["ok"])],
        fail: false,
        requests,
        controls: Some(controls.clone()),
    };
    let sink = Arc::new(RecordingSink::default());
    let mut session = ChatSession::new(
        Arc::new(transport),
        sink as Arc<dyn PresentationSink>,
        controls.clone(),
        ResponseMode::Streaming,
        FALLBACK.to_string(),
    );

    // The transport itself asserts the mid-flight state
    session.submit("hello").await;

    // And both come back afterwards
    assert!(controls.submit_enabled());
    assert!(controls.capture_enabled());
}

#[tokio::test]
async fn bytes_after_sentinel_are_ignored() {
    let mut body = streamed_body(&["real"]);
    body.extend_from_slice(event_line("ghost").as_bytes());

    let (transport, _) = ScriptedTransport::replying(vec![body]);
    let (mut session, _, _) = session_over(transport, ResponseMode::Streaming);

    let outcome = session.submit("hi").await;
    assert_eq!(outcome, SubmitOutcome::Replied("real".to_string()));
    assert_eq!(
        session.transcript(),
        &[Message::user("hi"), Message::assistant("real")]
    );
}

#[tokio::test]
async fn empty_stream_finalizes_without_assistant_turn() {
    let (transport, _) = ScriptedTransport::replying(vec![b"data: [DONE]\n".to_vec()]);
    let (mut session, _, _) = session_over(transport, ResponseMode::Streaming);

    let outcome = session.submit("hi").await;
    assert_eq!(outcome, SubmitOutcome::Replied(String::new()));
    assert_eq!(session.transcript(), &[Message::user("hi")]);
}

#[tokio::test]
async fn eof_without_sentinel_still_finalizes() {
    // Body ends mid-conversation with no [DONE] and no trailing newline
    let body = format!("{}data: {{\"choices\":[{{\"delta\":{{\"content\":\"!\"}}}}]}}", event_line("Hey"));
    let (transport, _) = ScriptedTransport::replying(vec![body.into_bytes()]);
    let (mut session, _, _) = session_over(transport, ResponseMode::Streaming);

    let outcome = session.submit("hi").await;
    assert_eq!(outcome, SubmitOutcome::Replied("Hey!".to_string()));
}

#[tokio::test]
async fn single_mode_parses_legacy_reply_shape() {
    let (transport, _) =
        ScriptedTransport::replying(vec![br#"{"reply":"right here with you"}"#.to_vec()]);
    let (mut session, sink, _) = session_over(transport, ResponseMode::Single);

    let outcome = session.submit("hello?").await;
    assert_eq!(
        outcome,
        SubmitOutcome::Replied("right here with you".to_string())
    );
    assert_eq!(
        session.transcript(),
        &[
            Message::user("hello?"),
            Message::assistant("right here with you")
        ]
    );
    assert!(
        sink.events()
            .contains(&SessionEvent::ReplyFinalized("right here with you".to_string()))
    );
}

#[tokio::test]
async fn single_mode_bad_body_falls_back() {
    let (transport, _) = ScriptedTransport::replying(vec![b"not json at all".to_vec()]);
    let (mut session, _, controls) = session_over(transport, ResponseMode::Single);

    let outcome = session.submit("hello?").await;
    assert_eq!(outcome, SubmitOutcome::Fallback);
    assert_eq!(session.transcript(), &[Message::user("hello?")]);
    assert!(controls.submit_enabled());
}

#[tokio::test]
async fn history_grows_across_exchanges() {
    let (transport, requests) = ScriptedTransport::replying(vec![
        streamed_body(&["first reply"]),
        streamed_body(&["second reply"]),
    ]);
    // The scripted transport replays the same body every send; the
    // assertions here are about the outgoing history, not the replies
    let (mut session, _, _) = session_over(transport, ResponseMode::Streaming);

    session.submit("one").await;
    session.submit("two").await;

    let requests = requests.lock().unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].history.len(), 1);
    // Second request resends the whole conversation so far
    assert_eq!(requests[1].history.len(), 3);
    assert_eq!(requests[1].history[0], Message::user("one"));
    assert_eq!(requests[1].history[2], Message::user("two"));
}

#[tokio::test]
async fn close_panel_clears_transcript_in_full() {
    let (transport, _) = ScriptedTransport::replying(vec![streamed_body(&["hey"])]);
    let (mut session, sink, _) = session_over(transport, ResponseMode::Streaming);

    session.open_panel();
    session.submit("hello").await;
    assert_eq!(session.transcript().len(), 2);

    session.close_panel();
    assert!(session.transcript().is_empty());

    let events = sink.events();
    assert!(events.contains(&SessionEvent::PanelOpened));
    assert!(events.contains(&SessionEvent::PanelClosed));
}
