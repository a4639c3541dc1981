//! Single-page persona chat over a hosted completion API.
//!
//! Serves an embedded chat page plus a REST API, forwarding each submit to
//! the OpenAI chat completions endpoint with the selected persona template.
//! Reads the API key from the `OPENAI_API_KEY` environment variable.
//!
//! # Usage
//!
//! ```bash
//! OPENAI_API_KEY=sk-... cargo run -p parley-web
//! OPENAI_API_KEY=sk-... cargo run -p parley-web -- --port 8080
//! OPENAI_API_KEY=sk-... cargo run -p parley-web -- --persona witty --temperature 0.9
//! ```
//!
//! Then open the printed URL in a browser to chat.

use std::sync::{Arc, Mutex};

use clap::Parser;
use parley::config::{SessionSettings, load_api_key};
use parley::persona::Persona;
use parley::session::SessionState;
use parley::trace::LogCaptureLayer;
use parley::{CompletionService, DEFAULT_MODEL, DEFAULT_TEMPERATURE, OpenAiClient};
use parley_web::{WebConfig, spawn_web};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Single-page persona chat with a browser-based UI.
#[derive(Parser)]
#[command(about = "Persona chat over a hosted completion API")]
struct Args {
    /// Port for the web UI server.
    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// Initial model (changeable from the UI dropdown).
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,

    /// Initial persona (changeable from the UI dropdown).
    #[arg(long, default_value = "general-assistant")]
    persona: Persona,

    /// Initial sampling temperature in [0.0, 1.0].
    #[arg(long, default_value_t = DEFAULT_TEMPERATURE)]
    temperature: f32,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initial settings are validated once, exactly like the UI boundary.
    let settings = SessionSettings {
        model: args.model,
        persona: args.persona,
        temperature: args.temperature,
    };
    if let Err(e) = settings.validate() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    // Missing credential is a fatal startup error.
    let api_key = match load_api_key() {
        Ok(key) => key,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let client = match OpenAiClient::new(api_key) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: failed to create API client: {e}");
            std::process::exit(1);
        }
    };
    let service: Arc<dyn CompletionService> = Arc::new(client);

    // Route tracing into the snapshot log buffer.
    let (capture_layer, log_buffer) = LogCaptureLayer::new();
    tracing_subscriber::registry().with(capture_layer).init();

    let session = Arc::new(Mutex::new(SessionState::with_settings(settings)));

    let config = WebConfig {
        bind_addr: ([127, 0, 0, 1], args.port).into(),
    };
    let addr = spawn_web(session, service, log_buffer, config).await;
    println!("Chat UI: http://{addr}");

    // The server runs on background tasks; park main until interrupted.
    let _ = tokio::signal::ctrl_c().await;
}
