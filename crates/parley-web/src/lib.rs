//! Browser-based single-page chat UI for parley.
//!
//! `parley-web` provides an axum web server that serves an embedded chat page
//! and a small REST API around one [`SessionState`]: pick a model, a persona,
//! and a temperature, submit text, and read back the paired transcript.
//!
//! # Quick start
//!
//! ```ignore
//! use parley::{OpenAiClient, session::SessionState, trace::LogCaptureLayer};
//! use parley_web::{WebConfig, spawn_web};
//! use std::sync::{Arc, Mutex};
//!
//! let session = Arc::new(Mutex::new(SessionState::default()));
//! let client = Arc::new(OpenAiClient::new(api_key)?);
//! let (_layer, log_buffer) = LogCaptureLayer::new();
//!
//! let addr = spawn_web(session, client, log_buffer, WebConfig::default()).await;
//! println!("Chat UI: http://{addr}");
//! ```
//!
//! # Architecture
//!
//! ```text
//! browser ──POST /api/chat──▶ handler ──render persona template──▶ CompletionService
//!    ▲                                                                   │
//!    └────GET /api/state──── Arc<Mutex<SessionState>> ◀──append/fail─────┘
//! ```
//!
//! The session is two states, idle and awaiting-response, and the handlers
//! enforce that only one completion call is ever in flight.

mod api;
mod page;
mod server;
pub mod snapshot;

pub use api::AppState;
pub use snapshot::{Exchange, SessionSnapshot};

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use parley::CompletionService;
use parley::session::SessionState;
use parley::trace::LogBuffer;

/// Configuration for the web server.
pub struct WebConfig {
    /// Address to bind to. Default: `127.0.0.1:8080`.
    pub bind_addr: SocketAddr,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
        }
    }
}

/// Spawn the web server on a Tokio task and return the bound address.
///
/// The server runs until the Tokio runtime shuts down.
///
/// # Arguments
///
/// * `session` — Shared session state (transcript, settings, busy flag).
/// * `service` — The outbound completion seam; [`parley::OpenAiClient`] in
///   production, a canned implementation in tests.
/// * `log_buffer` — Capture buffer drained into state snapshots. Pair it with
///   the [`LogCaptureLayer`](parley::trace::LogCaptureLayer) installed in the
///   binary.
/// * `config` — Server configuration.
pub async fn spawn_web(
    session: Arc<Mutex<SessionState>>,
    service: Arc<dyn CompletionService>,
    log_buffer: LogBuffer,
    config: WebConfig,
) -> SocketAddr {
    let router = server::build_router(session, service, log_buffer);
    server::start_server(router, config.bind_addr).await
}
