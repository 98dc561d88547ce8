//! Error types used by the emitter and its listeners.
//!
//! [`EmitterError`] covers every condition the dispatcher detects on its own
//! (malformed registrations, unknown events, unknown commands, listener panics)
//! plus the failures of the front-end calls themselves (closed emitter, wait
//! timeout). Listeners can report their own failures through [`EmitterError::custom`].
//!
//! Dispatcher-detected errors are not returned to anyone: they are fired as the
//! sole payload value of the reserved `error` event.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

/// # Errors produced by the emitter.
///
/// The `Display` text of the first three variants is part of the observable
/// contract: listeners on the `error` event see exactly these messages.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EmitterError {
    /// A registration command (`on` / `once`) arrived without a listener.
    #[error("expected '{op}' msg to have listener")]
    MissingListener {
        /// Registration kind: `"on"` or `"once"`.
        op: &'static str,
    },

    /// An event was emitted (or waited on) that has no registry entry.
    #[error("unexpected event: {event}")]
    UnexpectedEvent {
        /// The unknown event name.
        event: Arc<str>,
    },

    /// A raw command carried a kind tag the dispatch loop does not know.
    #[error("unexpected cmd: {cmd}")]
    UnexpectedCommand {
        /// The unrecognized kind tag.
        cmd: Arc<str>,
    },

    /// A listener panicked while handling an event.
    #[error("listener '{listener}' panicked on '{event}': {info}")]
    ListenerPanicked {
        /// Event being handled.
        event: Arc<str>,
        /// Listener name (see [`Listener::name`](crate::Listener::name)).
        listener: Arc<str>,
        /// Panic payload rendered as text.
        info: String,
    },

    /// Application-level error reported by a listener.
    #[error("{message}")]
    Custom {
        /// Free-form message.
        message: String,
    },

    /// The emitter has been closed; no further commands are accepted.
    #[error("emitter closed")]
    Closed,

    /// The inbound queue is full (non-blocking submission only).
    #[error("inbound queue full")]
    QueueFull,

    /// `close` was called a second time.
    #[error("emitter already closed")]
    AlreadyClosed,

    /// `wait` is unavailable because the emitter runs fire-and-forget.
    #[error("completion tracking disabled (fire-and-forget policy)")]
    Untracked,

    /// `wait` did not observe a drained round within the configured timeout.
    #[error("wait on '{event}' timed out after {timeout:?}")]
    WaitTimeout {
        /// Event being waited on.
        event: Arc<str>,
        /// The configured timeout.
        timeout: Duration,
    },
}

impl EmitterError {
    /// Builds an application-level error from any message.
    ///
    /// # Example
    /// ```
    /// use eventvisor::EmitterError;
    ///
    /// let err = EmitterError::custom("invalid params: [foo bar]");
    /// assert_eq!(err.to_string(), "invalid params: [foo bar]");
    /// ```
    pub fn custom(message: impl Into<String>) -> Self {
        EmitterError::Custom {
            message: message.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use eventvisor::EmitterError;
    ///
    /// let err = EmitterError::MissingListener { op: "on" };
    /// assert_eq!(err.as_label(), "emitter_missing_listener");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            EmitterError::MissingListener { .. } => "emitter_missing_listener",
            EmitterError::UnexpectedEvent { .. } => "emitter_unexpected_event",
            EmitterError::UnexpectedCommand { .. } => "emitter_unexpected_cmd",
            EmitterError::ListenerPanicked { .. } => "emitter_listener_panicked",
            EmitterError::Custom { .. } => "emitter_custom",
            EmitterError::Closed => "emitter_closed",
            EmitterError::QueueFull => "emitter_queue_full",
            EmitterError::AlreadyClosed => "emitter_already_closed",
            EmitterError::Untracked => "emitter_untracked",
            EmitterError::WaitTimeout { .. } => "emitter_wait_timeout",
        }
    }

    /// Indicates whether the error was detected by the dispatch loop itself
    /// (and is therefore delivered through the `error` event).
    pub fn is_dispatch_error(&self) -> bool {
        matches!(
            self,
            EmitterError::MissingListener { .. }
                | EmitterError::UnexpectedEvent { .. }
                | EmitterError::UnexpectedCommand { .. }
                | EmitterError::ListenerPanicked { .. }
        )
    }
}
