//! Persona-driven chat over a hosted completion API.
//!
//! `parley` is the core library behind a single-page chat widget: it selects
//! one of a fixed set of persona prompt templates, renders the latest user
//! input into it, and sends the result to the OpenAI chat completions API.
//! The exchange is recorded in a paired [`Transcript`](transcript::Transcript)
//! owned by a shared [`SessionState`](session::SessionState).
//!
//! There is deliberately no retry, no streaming, and no multi-turn context
//! replay: each submit is one rendered prompt and one synchronous call.
//!
//! # Getting started
//!
//! ```ignore
//! use parley::{CompletionRequest, CompletionService, OpenAiClient};
//! use parley::persona::Persona;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), String> {
//!     let api_key = parley::config::load_api_key()?;
//!     let client = OpenAiClient::new(api_key)?;
//!
//!     let reply = client
//!         .complete(CompletionRequest {
//!             model: "gpt-3.5-turbo".into(),
//!             temperature: 0.5,
//!             prompt: Persona::Witty.render("tell me a joke"),
//!         })
//!         .await?;
//!
//!     println!("{reply}");
//!     Ok(())
//! }
//! ```
//!
//! # Where to find things
//!
//! - **Persona templates:** [`persona::Persona`] — a closed enum mapped
//!   through a total, exhaustive lookup to template strings with a single
//!   `{input}` slot.
//! - **Transcript:** [`transcript::Transcript`] — two insertion-ordered
//!   sequences that only ever grow together.
//! - **Session state:** [`session::SessionState`] plus the convenience
//!   updaters that lock the shared mutex for you.
//! - **Settings:** [`config::SessionSettings`] — model catalog membership and
//!   temperature range, validated once at the boundary.
//! - **Log capture:** [`trace::LogCaptureLayer`] — a tracing layer that
//!   buffers log lines for the web snapshot.

pub mod config;
pub mod persona;
pub mod session;
pub mod trace;
pub mod transcript;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

// ── Constants ──────────────────────────────────────────────────────

pub const OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Default model when none is chosen in the UI.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Default sampling temperature (matches the UI slider's initial position).
pub const DEFAULT_TEMPERATURE: f32 = 0.5;

// ── Message types ──────────────────────────────────────────────────

/// Role of a message in the completion request.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
}

/// A message in the completion request.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

// ── Request / response types ───────────────────────────────────────

/// Chat completion request body. Only the fields this application sets are
/// modeled; the hosted API treats everything else as defaulted.
#[derive(Serialize, Debug)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub temperature: f32,
}

/// Raw API response (internal deserialization target).
#[derive(Deserialize, Debug)]
struct RawChatResponse {
    choices: Option<Vec<RawChoice>>,
    error: Option<ApiErrorResponse>,
    #[serde(default)]
    usage: Option<UsageInfo>,
}

#[derive(Deserialize, Debug)]
struct RawChoice {
    message: RawResponseMessage,
}

#[derive(Deserialize, Debug)]
struct RawResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ApiErrorResponse {
    message: String,
}

/// Token usage statistics.
#[derive(Deserialize, Debug, Clone)]
pub struct UsageInfo {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

// ── Completion service seam ────────────────────────────────────────

/// One fully-parameterized outbound call: a rendered prompt plus the session's
/// model settings.
#[derive(Clone, Debug)]
pub struct CompletionRequest {
    pub model: String,
    pub temperature: f32,
    pub prompt: String,
}

/// The outbound seam to the hosted completion API.
///
/// The web layer holds an `Arc<dyn CompletionService>` so integration tests
/// can substitute a canned implementation for [`OpenAiClient`].
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Perform one synchronous completion call and return the generated text,
    /// or an error string carrying the upstream message.
    async fn complete(&self, request: CompletionRequest) -> Result<String, String>;
}

// ── Client ─────────────────────────────────────────────────────────

/// Async HTTP client for the OpenAI chat completions API.
pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: String,
}

impl OpenAiClient {
    /// Create a new client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .user_agent("parley/0.1")
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| format!("failed to build HTTP client: {e}"))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
        })
    }

    /// Send a chat completion request and return the generated text.
    pub async fn chat(&self, body: &ChatRequest) -> Result<String, String> {
        debug!(
            "completion request: model={}, temp={}, prompt_chars={}",
            body.model,
            body.temperature,
            body.messages.iter().map(|m| m.content.len()).sum::<usize>(),
        );

        let start = Instant::now();

        let resp = self
            .client
            .post(OPENAI_URL)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| format!("failed to read response: {e}"))?;

        debug!(
            "completion response: HTTP {} in {:.1}s ({} bytes)",
            status,
            start.elapsed().as_secs_f64(),
            text.len()
        );

        if !status.is_success() {
            return Err(format!("completion API HTTP {status}: {text}"));
        }

        let parsed: RawChatResponse =
            serde_json::from_str(&text).map_err(|e| format!("failed to parse response: {e}"))?;

        if let Some(err) = parsed.error {
            return Err(format!("completion API error: {}", err.message));
        }

        if let Some(ref usage) = parsed.usage {
            debug!(
                "token usage: prompt={}, completion={}, total={}",
                usage.prompt_tokens.unwrap_or(0),
                usage.completion_tokens.unwrap_or(0),
                usage.total_tokens.unwrap_or(0),
            );
        }

        parsed
            .choices
            .and_then(|c| c.into_iter().next())
            .and_then(|c| c.message.content)
            .filter(|content| !content.is_empty())
            .ok_or_else(|| "empty completion response".to_string())
    }
}

#[async_trait]
impl CompletionService for OpenAiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, String> {
        let body = ChatRequest {
            model: request.model,
            temperature: request.temperature,
            messages: vec![Message::user(request.prompt)],
        };
        self.chat(&body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_constructors() {
        let sys = Message::system("hello");
        assert_eq!(sys.role, MessageRole::System);
        assert_eq!(sys.content, "hello");

        let user = Message::user("world");
        assert_eq!(user.role, MessageRole::User);
        assert_eq!(user.content, "world");
    }

    #[test]
    fn chat_request_serializes_lowercase_roles() {
        let req = ChatRequest {
            model: "gpt-3.5-turbo".into(),
            messages: vec![Message::user("hi")],
            temperature: 0.5,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["model"], "gpt-3.5-turbo");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hi");
    }

    #[test]
    fn raw_response_parses_generated_text() {
        let raw = r#"{"choices":[{"message":{"content":"Why did..."}}],"usage":{"prompt_tokens":12,"completion_tokens":8,"total_tokens":20}}"#;
        let parsed: RawChatResponse = serde_json::from_str(raw).unwrap();
        let content = parsed
            .choices
            .and_then(|c| c.into_iter().next())
            .and_then(|c| c.message.content);
        assert_eq!(content.as_deref(), Some("Why did..."));
        assert_eq!(parsed.usage.unwrap().total_tokens, Some(20));
    }

    #[test]
    fn raw_response_parses_api_error() {
        let raw = r#"{"error":{"message":"You exceeded your current quota"}}"#;
        let parsed: RawChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(
            parsed.error.unwrap().message,
            "You exceeded your current quota"
        );
    }
}
