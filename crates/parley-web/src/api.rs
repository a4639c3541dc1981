//! REST API endpoint handlers.
//!
//! One session, four endpoints: read a state snapshot, submit a chat message,
//! change settings, reset. The chat handler is the whole request/response
//! cycle: render the persona template, make one completion call, record the
//! exchange or the inline error.

use std::sync::{Arc, Mutex};

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use parley::session::{
    SessionState, apply_settings, begin_exchange, fail_exchange, finish_exchange, reset_session,
};
use parley::trace::LogBuffer;
use parley::{CompletionRequest, CompletionService, config::SessionSettings};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::snapshot::SessionSnapshot;

/// Shared application state passed to all handlers via axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Mutex<SessionState>>,
    pub service: Arc<dyn CompletionService>,
    pub log_buffer: LogBuffer,
}

/// Error body for non-2xx JSON responses.
#[derive(Serialize)]
struct ApiError {
    error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ApiError {
            error: message.into(),
        }),
    )
        .into_response()
}

/// GET /api/state — Full session snapshot.
///
/// Drains captured log lines into the session first, so the snapshot carries
/// the most recent logs. Used for initial page load and after every exchange.
pub async fn get_state(State(app): State<AppState>) -> Json<serde_json::Value> {
    app.log_buffer.flush_into(&app.session);
    let snapshot = {
        let state = app.session.lock().unwrap();
        SessionSnapshot::from_session(&state)
    };
    Json(serde_json::to_value(snapshot).unwrap_or_default())
}

/// Request body for POST /api/chat.
#[derive(Deserialize)]
pub struct ChatSubmission {
    pub message: String,
}

/// Response body for a successful POST /api/chat.
#[derive(Serialize)]
pub struct ChatReply {
    pub reply: String,
}

/// POST /api/chat — Submit one user message.
///
/// Renders the session's persona template around the message, makes one
/// completion call, and appends the exchange to the transcript. Returns:
/// - 200 with the generated text on success
/// - 409 if a call is already in flight (the UI disables submit, but the
///   server still refuses rather than queue)
/// - 422 for an empty message
/// - 502 with the upstream error message when the call fails; the transcript
///   is left untouched and the error is recorded inline for the page
pub async fn post_chat(
    State(app): State<AppState>,
    Json(body): Json<ChatSubmission>,
) -> Response {
    let message = body.message.trim().to_string();
    if message.is_empty() {
        return error_response(StatusCode::UNPROCESSABLE_ENTITY, "message must not be empty");
    }

    // Enter awaiting-response, refusing a second in-flight call.
    let Some(settings) = begin_exchange(&app.session) else {
        return error_response(
            StatusCode::CONFLICT,
            "a completion call is already in flight",
        );
    };

    info!(
        "chat submit: persona={}, model={}, temp={}",
        settings.persona, settings.model, settings.temperature
    );

    let request = CompletionRequest {
        model: settings.model,
        temperature: settings.temperature,
        prompt: settings.persona.render(&message),
    };

    // The session lock is NOT held across the outbound call.
    match app.service.complete(request).await {
        Ok(reply) => {
            finish_exchange(&app.session, &message, &reply);
            (StatusCode::OK, Json(ChatReply { reply })).into_response()
        }
        Err(err) => {
            warn!("completion call failed: {err}");
            fail_exchange(&app.session, &err);
            error_response(StatusCode::BAD_GATEWAY, err)
        }
    }
}

/// POST /api/settings — Apply session settings.
///
/// Validates catalog membership and the temperature domain; 422 on
/// violations. Unknown personas never reach the handler because the closed
/// enum rejects them at deserialization.
pub async fn post_settings(
    State(app): State<AppState>,
    Json(settings): Json<SessionSettings>,
) -> Response {
    if let Err(err) = settings.validate() {
        return error_response(StatusCode::UNPROCESSABLE_ENTITY, err);
    }
    info!(
        "settings applied: persona={}, model={}, temp={}",
        settings.persona, settings.model, settings.temperature
    );
    apply_settings(&app.session, settings);
    StatusCode::NO_CONTENT.into_response()
}

/// POST /api/reset — Start a new chat.
///
/// Clears the transcript and any inline error; settings survive.
pub async fn post_reset(State(app): State<AppState>) -> StatusCode {
    reset_session(&app.session);
    info!("session reset");
    StatusCode::NO_CONTENT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_submission_deserializes() {
        let json = r#"{"message":"tell me a joke"}"#;
        let req: ChatSubmission = serde_json::from_str(json).unwrap();
        assert_eq!(req.message, "tell me a joke");
    }

    #[test]
    fn chat_reply_serializes() {
        let reply = ChatReply {
            reply: "Why did...".into(),
        };
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["reply"], "Why did...");
    }

    #[test]
    fn settings_body_rejects_unknown_persona() {
        let json = r#"{"model":"gpt-3.5-turbo","persona":"sarcastic","temperature":0.5}"#;
        assert!(serde_json::from_str::<SessionSettings>(json).is_err());
    }
}
