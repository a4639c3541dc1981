//! Tracing capture for the web snapshot.
//!
//! [`LogCaptureLayer`] is a `tracing-subscriber` layer that records log
//! events into a shared [`LogBuffer`]. The buffer has its own mutex, separate
//! from [`SessionState`](crate::session::SessionState), so logging from
//! request handlers never contends with snapshot reads; the snapshot endpoint
//! drains it on demand.

use std::sync::{Arc, Mutex};

use chrono::Local;
use tracing::Subscriber;
use tracing_subscriber::layer::Layer;
use tracing_subscriber::registry::LookupSpan;

use crate::session::{self, LOG_TRIM_TO, LogLevel, LogLine, MAX_LOG_LINES, SessionState};

/// A shared buffer of pending log lines.
#[derive(Clone)]
pub struct LogBuffer(Arc<Mutex<Vec<LogLine>>>);

impl LogBuffer {
    fn new() -> Self {
        Self(Arc::new(Mutex::new(Vec::with_capacity(128))))
    }

    /// Drain all pending log lines, returning them.
    pub fn drain(&self) -> Vec<LogLine> {
        let mut buf = self.0.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut *buf)
    }

    /// Drain pending log lines into `SessionState::logs`, respecting the
    /// configured trim limits. Acquires the session lock only when there are
    /// new lines.
    pub fn flush_into(&self, state: &Arc<Mutex<SessionState>>) {
        session::push_logs(state, self.drain());
    }
}

/// A tracing layer that captures log events into a [`LogBuffer`].
pub struct LogCaptureLayer {
    buffer: LogBuffer,
}

impl LogCaptureLayer {
    /// Create a capture layer and its associated [`LogBuffer`].
    pub fn new() -> (Self, LogBuffer) {
        let buffer = LogBuffer::new();
        (
            Self {
                buffer: buffer.clone(),
            },
            buffer,
        )
    }
}

impl<S: Subscriber + for<'a> LookupSpan<'a>> Layer<S> for LogCaptureLayer {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let level = match *event.metadata().level() {
            tracing::Level::TRACE => LogLevel::Trace,
            tracing::Level::DEBUG => LogLevel::Debug,
            tracing::Level::INFO => LogLevel::Info,
            tracing::Level::WARN => LogLevel::Warn,
            tracing::Level::ERROR => LogLevel::Error,
        };

        let line = LogLine {
            time: Local::now().format("%H:%M:%S").to_string(),
            level,
            message: visitor.message,
        };

        if let Ok(mut buf) = self.buffer.0.lock() {
            buf.push(line);
            // Cap the buffer so a burst of logs before the next drain doesn't
            // consume unbounded memory.
            if buf.len() > MAX_LOG_LINES {
                let trim = buf.len() - LOG_TRIM_TO;
                buf.drain(..trim);
            }
        }
    }
}

/// Visitor that extracts the `message` field from a tracing event.
#[derive(Default)]
struct MessageVisitor {
    message: String,
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            let raw = format!("{value:?}");
            // Strip surrounding quotes from debug-formatted strings.
            self.message = raw
                .strip_prefix('"')
                .and_then(|r| r.strip_suffix('"'))
                .map(str::to_string)
                .unwrap_or(raw);
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }
}
