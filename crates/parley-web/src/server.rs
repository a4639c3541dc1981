//! Axum server setup and router construction.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::routing::{get, post};
use parley::CompletionService;
use parley::session::SessionState;
use parley::trace::LogBuffer;
use tower_http::cors::{Any, CorsLayer};

use crate::api::{self, AppState};
use crate::page;

/// Build the full axum router.
///
/// The router serves:
/// - The embedded single-page chat UI at `/`
/// - REST API at `/api/*`
pub fn build_router(
    session: Arc<Mutex<SessionState>>,
    service: Arc<dyn CompletionService>,
    log_buffer: LogBuffer,
) -> Router {
    let app_state = AppState {
        session,
        service,
        log_buffer,
    };

    // CORS layer for development (frontend tinkering from another origin).
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(page::chat_page))
        .route("/api/state", get(api::get_state))
        .route("/api/chat", post(api::post_chat))
        .route("/api/settings", post(api::post_settings))
        .route("/api/reset", post(api::post_reset))
        .with_state(app_state)
        .layer(cors)
}

/// Start the axum server and return the bound address.
pub async fn start_server(router: Router, bind_addr: SocketAddr) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind(bind_addr).await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    addr
}
