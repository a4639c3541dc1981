//! Shared session state and types for the chat frontend.
//!
//! This module provides the data model one browser session reads and writes.
//! It contains no rendering or HTTP dependencies — just plain data types and
//! convenience updaters.
//!
//! # Architecture
//!
//! ```text
//! HTTP handlers ──write──▶ Arc<Mutex<SessionState>> ◀──read── snapshot endpoint
//! ```
//!
//! The whole app is two states: idle, and awaiting-response while exactly one
//! completion call is in flight. [`begin_exchange`] moves the session into
//! awaiting-response (refusing if it already is there);
//! [`finish_exchange`] / [`fail_exchange`] move it back.

use crate::config::SessionSettings;
use crate::transcript::Transcript;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// Maximum captured log lines kept in memory.
pub const MAX_LOG_LINES: usize = 2000;
/// Trim to this many when the cap is exceeded.
pub const LOG_TRIM_TO: usize = 1200;

// ── Log types ─────────────────────────────────────────────────────────

/// A single log line captured from tracing.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogLine {
    pub time: String,
    pub level: LogLevel,
    pub message: String,
}

/// Log severity level (mirrors tracing levels).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Short fixed-width label for display.
    pub fn label(self) -> &'static str {
        match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO ",
            Self::Warn => "WARN ",
            Self::Error => "ERROR",
        }
    }
}

// ── SessionState ──────────────────────────────────────────────────────

/// State owned by one browser session, protected by a `Mutex`.
///
/// The lock is never held across the outbound completion `.await`; handlers
/// take it briefly to read settings or record results.
pub struct SessionState {
    /// Current model / persona / temperature selection.
    pub settings: SessionSettings,
    /// Paired inputs and outputs.
    pub transcript: Transcript,
    /// `true` while one completion call is in flight (awaiting-response).
    pub busy: bool,
    /// Inline error from the most recent failed call, cleared on the next
    /// submit and on reset.
    pub last_error: Option<String>,
    /// Tracing log capture, drained into snapshots.
    pub logs: Vec<LogLine>,
}

impl SessionState {
    /// Create a session with validated initial settings.
    pub fn with_settings(settings: SessionSettings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            settings: SessionSettings::default(),
            transcript: Transcript::new(),
            busy: false,
            last_error: None,
            logs: Vec::new(),
        }
    }
}

// ── Convenience updaters ──────────────────────────────────────────────

/// Lock the shared state mutex and run a closure on the guard.
/// Silently ignores poisoned locks (no log spam inside handlers).
macro_rules! with_state {
    ($state:expr, |$s:ident| $body:block) => {
        if let Ok(mut $s) = $state.lock() {
            $body
        }
    };
}

/// Enter the awaiting-response state and return the settings to use for the
/// call.
///
/// Returns `None` when a call is already in flight; the caller must refuse
/// the submit rather than queue it. Clears the previous inline error so the
/// UI doesn't show a stale failure next to a fresh spinner.
pub fn begin_exchange(state: &Arc<Mutex<SessionState>>) -> Option<SessionSettings> {
    let mut s = state.lock().ok()?;
    if s.busy {
        return None;
    }
    s.busy = true;
    s.last_error = None;
    Some(s.settings.clone())
}

/// Record a successful exchange and return to idle.
pub fn finish_exchange(state: &Arc<Mutex<SessionState>>, input: &str, output: &str) {
    with_state!(state, |s| {
        s.transcript.append(input, output);
        s.busy = false;
    });
}

/// Record a failed call and return to idle. The transcript is untouched.
pub fn fail_exchange(state: &Arc<Mutex<SessionState>>, error: impl Into<String>) {
    with_state!(state, |s| {
        s.last_error = Some(error.into());
        s.busy = false;
    });
}

/// Replace the session settings (already validated at the boundary).
pub fn apply_settings(state: &Arc<Mutex<SessionState>>, settings: SessionSettings) {
    with_state!(state, |s| { s.settings = settings });
}

/// Clear the transcript and any inline error. Settings survive a reset.
pub fn reset_session(state: &Arc<Mutex<SessionState>>) {
    with_state!(state, |s| {
        s.transcript.reset();
        s.last_error = None;
    });
}

/// Append captured log lines, trimming to the configured cap.
pub fn push_logs(state: &Arc<Mutex<SessionState>>, lines: Vec<LogLine>) {
    if lines.is_empty() {
        return;
    }
    with_state!(state, |s| {
        s.logs.extend(lines);
        if s.logs.len() > MAX_LOG_LINES {
            let trim = s.logs.len() - LOG_TRIM_TO;
            s.logs.drain(..trim);
        }
    });
}

// ── Tests ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::Persona;

    #[test]
    fn log_level_labels() {
        assert_eq!(LogLevel::Info.label(), "INFO ");
        assert_eq!(LogLevel::Error.label(), "ERROR");
    }

    #[test]
    fn session_defaults_to_idle_and_empty() {
        let s = SessionState::default();
        assert!(!s.busy);
        assert!(s.last_error.is_none());
        assert!(s.transcript.is_empty());
        assert!(s.logs.is_empty());
    }

    #[test]
    fn begin_exchange_enters_awaiting_response_once() {
        let state = Arc::new(Mutex::new(SessionState::default()));

        let settings = begin_exchange(&state).expect("idle session accepts a submit");
        assert_eq!(settings, SessionSettings::default());
        assert!(state.lock().unwrap().busy);

        // Second submit while in flight is refused.
        assert!(begin_exchange(&state).is_none());
    }

    #[test]
    fn begin_exchange_clears_stale_error() {
        let state = Arc::new(Mutex::new(SessionState::default()));
        fail_exchange(&state, "completion API HTTP 429: rate limited");
        assert!(state.lock().unwrap().last_error.is_some());

        begin_exchange(&state).unwrap();
        assert!(state.lock().unwrap().last_error.is_none());
    }

    #[test]
    fn finish_exchange_appends_and_returns_to_idle() {
        let state = Arc::new(Mutex::new(SessionState::default()));
        begin_exchange(&state).unwrap();
        finish_exchange(&state, "tell me a joke", "Why did...");

        let s = state.lock().unwrap();
        assert!(!s.busy);
        assert_eq!(s.transcript.len(), 1);
        assert_eq!(s.transcript.inputs()[0], "tell me a joke");
        assert_eq!(s.transcript.outputs()[0], "Why did...");
    }

    #[test]
    fn fail_exchange_leaves_transcript_untouched() {
        let state = Arc::new(Mutex::new(SessionState::default()));
        begin_exchange(&state).unwrap();
        fail_exchange(&state, "request failed: connection refused");

        let s = state.lock().unwrap();
        assert!(!s.busy);
        assert!(s.transcript.is_empty());
        assert_eq!(
            s.last_error.as_deref(),
            Some("request failed: connection refused")
        );
    }

    #[test]
    fn reset_clears_transcript_and_error_but_keeps_settings() {
        let state = Arc::new(Mutex::new(SessionState::default()));
        apply_settings(
            &state,
            SessionSettings {
                persona: Persona::Witty,
                ..Default::default()
            },
        );
        finish_exchange(&state, "a", "b");
        fail_exchange(&state, "boom");

        reset_session(&state);

        let s = state.lock().unwrap();
        assert!(s.transcript.is_empty());
        assert!(s.last_error.is_none());
        assert_eq!(s.settings.persona, Persona::Witty);
    }

    #[test]
    fn push_logs_trims_at_the_cap() {
        let state = Arc::new(Mutex::new(SessionState::default()));
        let lines: Vec<LogLine> = (0..MAX_LOG_LINES + 100)
            .map(|i| LogLine {
                time: format!("{i}"),
                level: LogLevel::Debug,
                message: format!("msg {i}"),
            })
            .collect();
        push_logs(&state, lines);

        let s = state.lock().unwrap();
        assert_eq!(s.logs.len(), LOG_TRIM_TO);
        assert_eq!(s.logs.last().unwrap().message, "msg 2099");
    }
}
