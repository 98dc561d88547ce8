use std::sync::Arc;
use tokio::sync::mpsc;

use super::{
    config::EmitterConfig,
    dispatch::Dispatcher,
    emitter::{Emitter, Inner, Shared},
    registry::Registry,
};
use crate::listeners::{DiagnosticSink, ErrorLogger, StderrSink};

/// Builder for constructing an [`Emitter`] with optional features.
pub struct EmitterBuilder {
    cfg: EmitterConfig,
    sink: Arc<dyn DiagnosticSink>,
    default_error_listener: bool,
}

impl EmitterBuilder {
    /// Creates a new builder with the given configuration.
    ///
    /// Defaults: diagnostics go to stderr and the error event starts with one
    /// persistent [`ErrorLogger`].
    pub fn new(cfg: EmitterConfig) -> Self {
        Self {
            cfg,
            sink: Arc::new(StderrSink),
            default_error_listener: true,
        }
    }

    /// Sets the diagnostic sink.
    ///
    /// The sink receives the default error listener's lines and any error
    /// raised while the error event has no listeners.
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Skips registering the default error listener.
    ///
    /// The error event then has no entry until someone registers on it, and
    /// errors reported in the meantime go to the sink only.
    pub fn without_default_error_listener(mut self) -> Self {
        self.default_error_listener = false;
        self
    }

    /// Builds the emitter and spawns its dispatch loop.
    ///
    /// # Panics
    /// Panics if called outside a Tokio runtime.
    pub fn build(self) -> Emitter {
        let (tx, rx) = mpsc::channel(self.cfg.queue_capacity_clamped());

        let mut registry = Registry::new();
        if self.default_error_listener {
            let logger = Arc::new(ErrorLogger::new(Arc::clone(&self.sink)));
            registry.on(Arc::clone(&self.cfg.error_event), logger);
        }

        let shared = Arc::new(Shared::new(self.cfg, self.sink));
        let inner = Arc::new(Inner {
            tx,
            shared: Arc::clone(&shared),
        });

        Dispatcher::new(Arc::downgrade(&inner), shared, registry).spawn(rx);
        tracing::debug!("emitter dispatch loop spawned");
        Emitter::from_inner(inner)
    }
}
