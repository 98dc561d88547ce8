//! # Default `error` listener and diagnostic sinks.
//!
//! [`ErrorLogger`] is pre-registered as a persistent listener on the reserved
//! `error` event of every emitter (unless the builder opts out). It writes to a
//! [`DiagnosticSink`] when the payload is exactly one error value; any other
//! payload shape is ignored.
//!
//! ## Output format
//! ```text
//! error: unexpected event: sub
//! error: expected 'on' msg to have listener
//! ```
//!
//! ## Sinks
//! - [`StderrSink`] prints `error: <message>` to stderr (default).
//! - [`TracingSink`] records `tracing::error!` with the message as a field.
//!
//! Hosts plug in their own sink via
//! [`EmitterBuilder::with_sink`](crate::EmitterBuilder::with_sink).

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::Emitter;
use crate::events::Params;
use crate::listeners::Listener;

/// Destination for diagnostics the emitter cannot deliver anywhere else.
pub trait DiagnosticSink: Send + Sync + 'static {
    /// Writes one error message.
    fn write_error(&self, message: &str);
}

/// Prints `error: <message>` to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrSink;

impl DiagnosticSink for StderrSink {
    fn write_error(&self, message: &str) {
        eprintln!("error: {message}");
    }
}

/// Forwards errors to `tracing` at ERROR level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn write_error(&self, message: &str) {
        tracing::error!(target: "eventvisor", error = %message, "unhandled emitter error");
    }
}

/// Default listener for the `error` event.
pub struct ErrorLogger {
    sink: Arc<dyn DiagnosticSink>,
}

impl ErrorLogger {
    pub fn new(sink: Arc<dyn DiagnosticSink>) -> Self {
        Self { sink }
    }
}

#[async_trait]
impl Listener for ErrorLogger {
    async fn on_event(&self, _emitter: &Emitter, params: &Params) {
        if let Some(err) = params.single().and_then(|v| v.as_error()) {
            self.sink.write_error(&err.to_string());
        }
    }

    fn name(&self) -> &str {
        "error-logger"
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::DiagnosticSink;

    /// Sink that records every message, for assertions.
    #[derive(Default)]
    pub(crate) struct CollectSink {
        lines: Mutex<Vec<String>>,
    }

    impl CollectSink {
        pub(crate) fn lines(&self) -> Vec<String> {
            self.lines.lock().expect("sink poisoned").clone()
        }
    }

    impl DiagnosticSink for CollectSink {
        fn write_error(&self, message: &str) {
            self.lines
                .lock()
                .expect("sink poisoned")
                .push(format!("error: {message}"));
        }
    }
}
