//! # Commands accepted by the dispatch loop.
//!
//! A [`Command`] is the immutable request the front-end posts to the dispatch
//! loop's queue. It is consumed exactly once.
//!
//! | kind     | carries                    | effect                                   |
//! |----------|----------------------------|------------------------------------------|
//! | `on`     | event + optional listener  | append to the persistent list            |
//! | `once`   | event + optional listener  | append to the one-shot list              |
//! | `emit`   | event + params             | start a firing round                     |
//! | other    | event                      | `error` event: `unexpected cmd: <kind>`  |
//!
//! The front-end methods ([`Emitter::on`](crate::Emitter::on),
//! [`Emitter::once`](crate::Emitter::once), [`Emitter::emit`](crate::Emitter::emit))
//! build these for you; [`Emitter::submit`](crate::Emitter::submit) accepts
//! hand-built ones, e.g. from a string-tagged bridge:
//! ```rust
//! use eventvisor::{Command, CommandKind};
//!
//! let cmd = Command::tagged("off", "add");
//! assert_eq!(cmd.kind(), &CommandKind::Other("off".into()));
//! assert_eq!(CommandKind::from("emit"), CommandKind::Emit);
//! ```

use std::fmt;
use std::sync::Arc;

use super::params::Params;
use crate::listeners::ListenerRef;

/// Kind tag of a [`Command`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandKind {
    /// Register a persistent listener.
    On,
    /// Register a one-shot listener.
    Once,
    /// Fire an event.
    Emit,
    /// Unrecognized tag; the dispatch loop reports it as an error.
    Other(Arc<str>),
}

impl CommandKind {
    /// Returns the wire tag of this kind.
    pub fn as_str(&self) -> &str {
        match self {
            CommandKind::On => "on",
            CommandKind::Once => "once",
            CommandKind::Emit => "emit",
            CommandKind::Other(tag) => tag,
        }
    }
}

impl From<&str> for CommandKind {
    fn from(tag: &str) -> Self {
        match tag {
            "on" => CommandKind::On,
            "once" => CommandKind::Once,
            "emit" => CommandKind::Emit,
            other => CommandKind::Other(other.into()),
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request object consumed by the dispatch loop.
#[derive(Clone)]
pub struct Command {
    kind: CommandKind,
    event: Arc<str>,
    listener: Option<ListenerRef>,
    params: Params,
}

impl Command {
    /// `on` command. A `None` listener is reported as an error, not registered.
    pub fn on(event: impl Into<Arc<str>>, listener: Option<ListenerRef>) -> Self {
        Self::new(CommandKind::On, event, listener, Params::empty())
    }

    /// `once` command. A `None` listener is reported as an error, not registered.
    pub fn once(event: impl Into<Arc<str>>, listener: Option<ListenerRef>) -> Self {
        Self::new(CommandKind::Once, event, listener, Params::empty())
    }

    /// `emit` command.
    pub fn emit(event: impl Into<Arc<str>>, params: impl Into<Params>) -> Self {
        Self::new(CommandKind::Emit, event, None, params.into())
    }

    /// Command with a raw kind tag and no listener or payload.
    pub fn tagged(kind: &str, event: impl Into<Arc<str>>) -> Self {
        Self::new(CommandKind::from(kind), event, None, Params::empty())
    }

    fn new(
        kind: CommandKind,
        event: impl Into<Arc<str>>,
        listener: Option<ListenerRef>,
        params: Params,
    ) -> Self {
        Self {
            kind,
            event: event.into(),
            listener,
            params,
        }
    }

    #[inline]
    pub fn kind(&self) -> &CommandKind {
        &self.kind
    }

    #[inline]
    pub fn event(&self) -> &str {
        &self.event
    }

    #[inline]
    pub fn params(&self) -> &Params {
        &self.params
    }

    #[inline]
    pub fn has_listener(&self) -> bool {
        self.listener.is_some()
    }

    /// Splits the command into its parts (dispatch loop only).
    pub(crate) fn into_parts(self) -> (CommandKind, Arc<str>, Option<ListenerRef>, Params) {
        (self.kind, self.event, self.listener, self.params)
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Command{{cmd={},event={},listener={},params={}}}",
            self.kind,
            self.event,
            self.listener.as_ref().map(|l| l.name()).unwrap_or("<none>"),
            self.params
        )
    }
}
