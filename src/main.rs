use std::io::Write as _;
use std::process::ExitCode;
use std::sync::{Arc, Mutex, PoisonError};

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;
use url::Url;

use arelia_core::{
    ChatSession, ChatTransport, Config, Controls, HttpTransport, PresentationSink, SessionEvent,
    SpeechEngine, SubmitOutcome,
};

/// Arelia - companion chat session core, driven from the terminal
#[derive(Parser)]
#[command(name = "arelia", version, about)]
struct Cli {
    /// Chat endpoint URL
    #[arg(long, env = "ARELIA_ENDPOINT")]
    endpoint: Option<String>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Send a single message and print the reply
    Send {
        /// Message text
        text: String,
    },
    /// Check connectivity to the chat endpoint
    TestEndpoint,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "warn,arelia_core=info",
        1 => "info,arelia_core=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load()?;
    if let Some(endpoint) = &cli.endpoint {
        config.endpoint = Url::parse(endpoint)?;
    }

    tracing::debug!(endpoint = %config.endpoint, mode = ?config.response_mode, "configured");

    if let Some(cmd) = cli.command {
        return match cmd {
            Command::Send { text } => send_once(&config, &text).await,
            Command::TestEndpoint => test_endpoint(&config).await,
        };
    }

    chat_loop(&config).await
}

/// Interactive chat loop on stdin
async fn chat_loop(config: &Config) -> anyhow::Result<()> {
    let controls = Controls::new();
    let mut session = build_session(config, controls)?;

    // Capability branch: on a plain terminal there is no recognition
    // engine, so the voice control is hidden entirely
    if config.voice.enabled && host_speech_engine().is_none() {
        tracing::info!("no speech recognition engine on this host, voice input hidden");
    }

    session.open_panel();
    println!("Chatting with Arelia. Type a message, or /quit to leave.");

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    prompt()?;
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "/quit" | "/exit" => break,
            "/clear" => {
                session.close_panel();
                session.open_panel();
                println!("(transcript cleared)");
            }
            _ => {
                session.submit(&line).await;
            }
        }
        prompt()?;
    }

    session.close_panel();
    Ok(())
}

/// Send one message and print the reply
async fn send_once(config: &Config, text: &str) -> anyhow::Result<()> {
    let mut session = build_session(config, Controls::new())?;

    match session.submit(text).await {
        SubmitOutcome::Replied(_) | SubmitOutcome::Fallback => Ok(()),
        SubmitOutcome::Ignored => {
            anyhow::bail!("nothing to send (message was empty)")
        }
    }
}

/// Probe the endpoint with a minimal request
async fn test_endpoint(config: &Config) -> anyhow::Result<()> {
    println!("Probing {} ...", config.endpoint);

    let transport = HttpTransport::new(config.endpoint.clone(), config.request_timeout)?;
    let request = arelia_core::ChatRequest {
        history: vec![arelia_core::Message::user("hello")],
        current_time: arelia_core::chat::current_time_string(),
    };

    let started = std::time::Instant::now();
    match transport.send(&request).await {
        Ok(_body) => {
            println!("OK ({} ms to response headers)", started.elapsed().as_millis());
            Ok(())
        }
        Err(e) => {
            println!("FAILED: {e}");
            Err(e.into())
        }
    }
}

fn build_session(config: &Config, controls: Controls) -> anyhow::Result<ChatSession> {
    let transport = HttpTransport::new(config.endpoint.clone(), config.request_timeout)?;
    Ok(ChatSession::new(
        Arc::new(transport),
        Arc::new(TerminalSink::default()),
        controls,
        config.response_mode,
        config.fallback_phrase.clone(),
    ))
}

/// Probe for a host speech recognition engine
///
/// Terminal builds carry none; embedders (browser shells, desktop hosts)
/// supply their own implementation of [`SpeechEngine`].
fn host_speech_engine() -> Option<Box<dyn SpeechEngine>> {
    None
}

fn prompt() -> std::io::Result<()> {
    print!("you> ");
    std::io::stdout().flush()
}

/// Prints streamed replies to the terminal as they arrive
#[derive(Default)]
struct TerminalSink {
    printed: Mutex<usize>,
}

impl TerminalSink {
    fn printed(&self) -> std::sync::MutexGuard<'_, usize> {
        self.printed.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PresentationSink for TerminalSink {
    fn notify(&self, event: SessionEvent) {
        match event {
            SessionEvent::ExchangeStarted => {
                *self.printed() = 0;
                print!("arelia> ");
                let _ = std::io::stdout().flush();
            }
            SessionEvent::PartialReply(text) => {
                // Partial text grows by appended deltas, so the previous
                // print position is always a char boundary
                let mut printed = self.printed();
                print!("{}", &text[*printed..]);
                let _ = std::io::stdout().flush();
                *printed = text.len();
            }
            SessionEvent::ReplyFinalized(text) => {
                if *self.printed() == 0 && !text.is_empty() {
                    // Single-shot mode delivers the reply all at once
                    print!("{text}");
                }
                println!();
            }
            SessionEvent::FallbackShown(phrase) => {
                println!("{phrase}");
            }
            _ => {}
        }
    }
}
