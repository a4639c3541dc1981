//! Serializable projection of [`SessionState`] for the REST API.
//!
//! [`SessionState`] holds the transcript as two parallel sequences; the
//! snapshot pairs them up for rendering and caps the log tail so the payload
//! stays small.

use parley::persona::Persona;
use parley::session::{LogLine, SessionState};
use serde::Serialize;

/// Maximum number of log lines included in a snapshot.
pub const SNAPSHOT_MAX_LOGS: usize = 200;

/// One completed exchange, paired for display.
#[derive(Clone, Debug, Serialize)]
pub struct Exchange {
    pub input: String,
    pub output: String,
}

/// Serializable view of the session sent to the page.
#[derive(Debug, Serialize)]
pub struct SessionSnapshot {
    // ── Settings ──
    pub model: String,
    pub persona: Persona,
    pub temperature: f32,

    // ── State machine ──
    /// `true` while a completion call is in flight.
    pub busy: bool,
    /// Inline error from the most recent failed call, if any.
    pub last_error: Option<String>,

    // ── Transcript ──
    pub exchanges: Vec<Exchange>,

    // ── Logs (capped) ──
    pub logs: Vec<LogLine>,
}

impl SessionSnapshot {
    /// Build a snapshot from the current session state.
    ///
    /// Should be called while holding the session lock.
    pub fn from_session(state: &SessionState) -> Self {
        let exchanges = state
            .transcript
            .pairs()
            .map(|(input, output)| Exchange {
                input: input.to_string(),
                output: output.to_string(),
            })
            .collect();

        // Take only the most recent logs to limit payload size.
        let log_start = state.logs.len().saturating_sub(SNAPSHOT_MAX_LOGS);
        let logs: Vec<LogLine> = state.logs[log_start..].to_vec();

        Self {
            model: state.settings.model.clone(),
            persona: state.settings.persona,
            temperature: state.settings.temperature,
            busy: state.busy,
            last_error: state.last_error.clone(),
            exchanges,
            logs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley::session::{LogLevel, SessionState};

    #[test]
    fn snapshot_from_default_state() {
        let state = SessionState::default();
        let snap = SessionSnapshot::from_session(&state);

        assert_eq!(snap.model, "gpt-3.5-turbo");
        assert_eq!(snap.persona, Persona::GeneralAssistant);
        assert!(!snap.busy);
        assert!(snap.last_error.is_none());
        assert!(snap.exchanges.is_empty());
        assert!(snap.logs.is_empty());
    }

    #[test]
    fn snapshot_pairs_the_transcript() {
        let mut state = SessionState::default();
        state.transcript.append("tell me a joke", "Why did...");
        state.transcript.append("another", "Knock knock...");

        let snap = SessionSnapshot::from_session(&state);
        assert_eq!(snap.exchanges.len(), 2);
        assert_eq!(snap.exchanges[0].input, "tell me a joke");
        assert_eq!(snap.exchanges[0].output, "Why did...");
        assert_eq!(snap.exchanges[1].input, "another");
    }

    #[test]
    fn snapshot_serializes_to_json() {
        let mut state = SessionState::default();
        state.last_error = Some("completion API HTTP 429: rate limited".into());

        let json = serde_json::to_value(SessionSnapshot::from_session(&state)).unwrap();
        assert_eq!(json["persona"], "general-assistant");
        assert_eq!(json["busy"], false);
        assert_eq!(json["last_error"], "completion API HTTP 429: rate limited");
        assert!(json["exchanges"].as_array().unwrap().is_empty());
    }

    #[test]
    fn snapshot_caps_logs() {
        let mut state = SessionState::default();
        for i in 0..300 {
            state.logs.push(LogLine {
                time: format!("{i:03}"),
                level: LogLevel::Info,
                message: format!("msg {i}"),
            });
        }

        let snap = SessionSnapshot::from_session(&state);
        assert_eq!(snap.logs.len(), SNAPSHOT_MAX_LOGS);
        // Should contain the *last* 200 entries.
        assert_eq!(snap.logs[0].time, "100");
        assert_eq!(snap.logs[199].time, "299");
    }
}
