//! # Emitter configuration.
//!
//! Provides [`EmitterConfig`] centralized settings for one emitter instance.
//!
//! ## Sentinel values
//! - `queue_capacity = 0` → clamped to 1 (closest to an unbuffered queue)
//! - `wait_timeout = 0s` → `wait` blocks until the round drains

use std::sync::Arc;
use std::time::Duration;

/// How a firing round reports completion.
///
/// One policy per emitter; it cannot change after construction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CompletionPolicy {
    /// Each round arms a countdown; `wait` observes drained rounds.
    #[default]
    Tracked,
    /// Invocations are launched and forgotten; `wait` returns
    /// [`EmitterError::Untracked`](crate::EmitterError::Untracked).
    ///
    /// Callers that need to know when work finished must emit their own
    /// completion event from inside a listener.
    FireAndForget,
}

/// Configuration for an [`Emitter`](crate::Emitter).
///
/// ## Field semantics
/// - `queue_capacity`: bound of the inbound command queue (min 1)
/// - `policy`: completion policy shared by every event of the emitter
/// - `wait_timeout`: upper bound on a single `wait` (`0s` = unbounded)
/// - `error_event`: name of the reserved error event
#[derive(Clone, Debug)]
pub struct EmitterConfig {
    /// Capacity of the inbound command queue.
    ///
    /// Producers that race ahead of the dispatch loop by more than this many
    /// commands are suspended in `on`/`once`/`emit` until the loop catches up.
    pub queue_capacity: usize,

    /// Completion policy for firing rounds.
    pub policy: CompletionPolicy,

    /// Maximum time a single `wait` blocks.
    ///
    /// - `Duration::ZERO` = no bound
    /// - `> 0` = `wait` returns `WaitTimeout` once exceeded
    pub wait_timeout: Duration,

    /// Reserved event name that carries dispatcher and listener errors.
    pub error_event: Arc<str>,
}

impl EmitterConfig {
    /// Returns the queue capacity clamped to a minimum of 1.
    #[inline]
    pub fn queue_capacity_clamped(&self) -> usize {
        self.queue_capacity.max(1)
    }

    /// Returns the wait timeout as an `Option`.
    ///
    /// - `None` → wait forever
    /// - `Some(d)` → bounded wait
    #[inline]
    pub fn wait_timeout(&self) -> Option<Duration> {
        if self.wait_timeout == Duration::ZERO {
            None
        } else {
            Some(self.wait_timeout)
        }
    }

    /// True if rounds are tracked and `wait` is available.
    #[inline]
    pub fn is_tracked(&self) -> bool {
        self.policy == CompletionPolicy::Tracked
    }
}

impl Default for EmitterConfig {
    /// Default configuration:
    ///
    /// - `queue_capacity = 64`
    /// - `policy = CompletionPolicy::Tracked`
    /// - `wait_timeout = 0s` (unbounded)
    /// - `error_event = "error"`
    fn default() -> Self {
        Self {
            queue_capacity: 64,
            policy: CompletionPolicy::default(),
            wait_timeout: Duration::ZERO,
            error_event: Arc::from("error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = EmitterConfig::default();
        assert_eq!(cfg.queue_capacity_clamped(), 64);
        assert!(cfg.is_tracked());
        assert_eq!(cfg.wait_timeout(), None);
        assert_eq!(&*cfg.error_event, "error");
    }

    #[test]
    fn test_sentinels() {
        let cfg = EmitterConfig {
            queue_capacity: 0,
            wait_timeout: Duration::from_millis(5),
            policy: CompletionPolicy::FireAndForget,
            ..EmitterConfig::default()
        };
        assert_eq!(cfg.queue_capacity_clamped(), 1);
        assert_eq!(cfg.wait_timeout(), Some(Duration::from_millis(5)));
        assert!(!cfg.is_tracked());
    }
}
