//! # Emitter: front-end handle of the dispatcher.
//!
//! Every public operation packages a request and posts it to the dispatch loop's
//! bounded queue. Nothing here touches the registry directly.
//!
//! ## Operations
//! ```text
//! on(event, listener)    ──► Command{on}    ──┐
//! once(event, listener)  ──► Command{once}  ──┤
//! emit(event, params)    ──► Command{emit}  ──┼──► [queue] ──► dispatch loop
//! submit(command)        ──► Command{..}    ──┤
//! wait(event)            ──► Wait{reply}    ──┤      └─► reply: Completion ──► next_round()
//! listeners(event)       ──► Inspect{reply} ──┤
//! close()                ──► Close          ──┘
//! ```
//!
//! ## Rules
//! - Calls suspend only while the queue is full (producer backpressure) or, for
//!   `wait`, until a round drains.
//! - Commands are processed in submission order across all event names.
//! - After `close()` every call fails with [`EmitterError::Closed`]; a second
//!   `close()` fails with [`EmitterError::AlreadyClosed`].
//! - Handles are cheap to clone; every listener receives one.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicI64, Ordering};
//! use eventvisor::{Emitter, ListenerFn, Params, params};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), eventvisor::EmitterError> {
//!     let em = Emitter::new();
//!     let sum = Arc::new(AtomicI64::new(0));
//!
//!     let acc = sum.clone();
//!     em.on("add", ListenerFn::arc("sum", move |_em: Emitter, p: Params| {
//!         let acc = acc.clone();
//!         async move {
//!             acc.fetch_add(p.sum_ints().unwrap_or(0), Ordering::SeqCst);
//!         }
//!     }))
//!     .await?;
//!
//!     em.emit("add", params![1, 2, 3]).await?;
//!     em.wait("add").await?;
//!     assert_eq!(sum.load(Ordering::SeqCst), 6);
//!
//!     em.close().await
//! }
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use super::builder::EmitterBuilder;
use super::completion::Completion;
use super::config::EmitterConfig;
use super::registry::ListenerCounts;
use crate::error::EmitterError;
use crate::events::{Command, Params};
use crate::listeners::{DiagnosticSink, ListenerRef};

/// Requests understood by the dispatch loop.
pub(crate) enum Message {
    Command(Command),
    Wait {
        event: Arc<str>,
        reply: oneshot::Sender<Result<Arc<Completion>, EmitterError>>,
    },
    Inspect {
        event: Arc<str>,
        reply: oneshot::Sender<Option<ListenerCounts>>,
    },
    Events {
        reply: oneshot::Sender<Vec<Arc<str>>>,
    },
    Close,
}

/// State shared by the handles and the dispatch loop.
pub(crate) struct Shared {
    pub(crate) cfg: EmitterConfig,
    pub(crate) sink: Arc<dyn DiagnosticSink>,
    closed: AtomicBool,
    /// Cancelled once every command queued before `close` was processed.
    pub(crate) drained: CancellationToken,
    /// Cancelled once in-flight invocations finished and trackers are closed.
    pub(crate) stopped: CancellationToken,
}

impl Shared {
    pub(crate) fn new(cfg: EmitterConfig, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            cfg,
            sink,
            closed: AtomicBool::new(false),
            drained: CancellationToken::new(),
            stopped: CancellationToken::new(),
        }
    }
}

/// Owned by the handles only; the dispatch loop keeps a `Weak`.
pub(crate) struct Inner {
    pub(crate) tx: mpsc::Sender<Message>,
    pub(crate) shared: Arc<Shared>,
}

/// Handle to an event emitter.
///
/// Created with [`Emitter::new`] or [`Emitter::builder`] inside a Tokio runtime;
/// construction spawns the dispatch loop immediately.
#[derive(Clone)]
pub struct Emitter {
    inner: Arc<Inner>,
}

impl Emitter {
    /// Creates an emitter with default configuration and a stderr error sink.
    ///
    /// # Panics
    /// Panics if called outside a Tokio runtime.
    pub fn new() -> Self {
        EmitterBuilder::new(EmitterConfig::default()).build()
    }

    /// Returns a builder for a customized emitter.
    pub fn builder(cfg: EmitterConfig) -> EmitterBuilder {
        EmitterBuilder::new(cfg)
    }

    pub(crate) fn from_inner(inner: Arc<Inner>) -> Self {
        Self { inner }
    }

    /// Registers a persistent listener for `event`.
    ///
    /// A `None` listener is not registered; the dispatch loop fires
    /// `error` with `expected 'on' msg to have listener` instead.
    pub async fn on(
        &self,
        event: impl Into<Arc<str>>,
        listener: impl Into<Option<ListenerRef>>,
    ) -> Result<(), EmitterError> {
        self.submit(Command::on(event, listener.into())).await
    }

    /// Registers a one-shot listener for `event`.
    ///
    /// The listener is included in exactly one round: the next `emit` of `event`
    /// processed after this registration.
    pub async fn once(
        &self,
        event: impl Into<Arc<str>>,
        listener: impl Into<Option<ListenerRef>>,
    ) -> Result<(), EmitterError> {
        self.submit(Command::once(event, listener.into())).await
    }

    /// Fires `event` with `params`.
    ///
    /// Returns once the command is queued; listeners run afterwards.
    /// Emitting an event nobody registered fires `error` with `unexpected event: <name>`.
    pub async fn emit(
        &self,
        event: impl Into<Arc<str>>,
        params: impl Into<Params>,
    ) -> Result<(), EmitterError> {
        self.submit(Command::emit(event, params)).await
    }

    /// Posts a raw command, waiting for queue capacity.
    pub async fn submit(&self, cmd: Command) -> Result<(), EmitterError> {
        self.send(Message::Command(cmd)).await
    }

    /// Posts a raw command without waiting (fails with `QueueFull` if the queue is full).
    pub fn try_submit(&self, cmd: Command) -> Result<(), EmitterError> {
        self.ensure_open()?;
        self.inner
            .tx
            .try_send(Message::Command(cmd))
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => EmitterError::QueueFull,
                mpsc::error::TrySendError::Closed(_) => EmitterError::Closed,
            })
    }

    /// Blocks until one firing round of `event` has fully drained.
    ///
    /// Rounds and waits pair up in order: a round that finished before this call
    /// and was not yet waited on satisfies it immediately.
    ///
    /// ### Errors
    /// - `UnexpectedEvent` if `event` was never registered (also fired on `error`)
    /// - `Untracked` under [`CompletionPolicy::FireAndForget`](crate::CompletionPolicy::FireAndForget)
    /// - `WaitTimeout` if [`EmitterConfig::wait_timeout`] elapses
    /// - `Closed` if the emitter is (or becomes) closed
    pub async fn wait(&self, event: impl Into<Arc<str>>) -> Result<(), EmitterError> {
        if !self.config().is_tracked() {
            return Err(EmitterError::Untracked);
        }

        let event = event.into();
        let (reply, rx) = oneshot::channel();
        self.send(Message::Wait {
            event: Arc::clone(&event),
            reply,
        })
        .await?;
        let completion = rx.await.map_err(|_| EmitterError::Closed)??;

        match self.config().wait_timeout() {
            None => completion.next_round().await,
            Some(timeout) => tokio::time::timeout(timeout, completion.next_round())
                .await
                .map_err(|_| EmitterError::WaitTimeout { event, timeout })?,
        }
    }

    /// Returns the current list lengths of `event`, or `None` if it has no entry.
    ///
    /// Answered by the dispatch loop, so every command submitted earlier is reflected.
    pub async fn listeners(
        &self,
        event: impl Into<Arc<str>>,
    ) -> Result<Option<ListenerCounts>, EmitterError> {
        let (reply, rx) = oneshot::channel();
        self.send(Message::Inspect {
            event: event.into(),
            reply,
        })
        .await?;
        rx.await.map_err(|_| EmitterError::Closed)
    }

    /// Returns the sorted names of every registered event.
    pub async fn events(&self) -> Result<Vec<Arc<str>>, EmitterError> {
        let (reply, rx) = oneshot::channel();
        self.send(Message::Events { reply }).await?;
        rx.await.map_err(|_| EmitterError::Closed)
    }

    /// Closes the emitter.
    ///
    /// Returns once every command submitted before the call has been processed.
    /// Listener invocations still running are not awaited; use [`Emitter::closed`].
    ///
    /// ### Errors
    /// `AlreadyClosed` on the second call.
    pub async fn close(&self) -> Result<(), EmitterError> {
        let shared = &self.inner.shared;
        if shared.closed.swap(true, Ordering::AcqRel) {
            return Err(EmitterError::AlreadyClosed);
        }

        // The marker queues behind everything already submitted.
        if self.inner.tx.send(Message::Close).await.is_err() {
            tracing::debug!("dispatch loop already stopped");
        }
        shared.drained.cancelled().await;
        Ok(())
    }

    /// Resolves once the dispatch loop stopped and every invocation finished.
    ///
    /// Must not be awaited from inside a listener.
    pub async fn closed(&self) {
        self.inner.shared.stopped.cancelled().await;
    }

    /// True once `close` has been called.
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.inner.shared.closed.load(Ordering::Acquire)
    }

    #[inline]
    pub fn config(&self) -> &EmitterConfig {
        &self.inner.shared.cfg
    }

    pub(crate) fn sink(&self) -> &dyn DiagnosticSink {
        self.inner.shared.sink.as_ref()
    }

    #[cfg(test)]
    pub(crate) fn shared(&self) -> &Arc<Shared> {
        &self.inner.shared
    }

    async fn send(&self, msg: Message) -> Result<(), EmitterError> {
        self.ensure_open()?;
        self.inner
            .tx
            .send(msg)
            .await
            .map_err(|_| EmitterError::Closed)
    }

    fn ensure_open(&self) -> Result<(), EmitterError> {
        if self.is_closed() {
            Err(EmitterError::Closed)
        } else {
            Ok(())
        }
    }
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Emitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("policy", &self.config().policy)
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicI64, AtomicUsize};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use super::*;
    use crate::core::testkit::{adder, collecting, counter, recorder};
    use crate::{EmitterError, ListenerFn, ListenerRef, Value, params};

    #[tokio::test]
    async fn test_sum_round_trip_and_error_rounds() -> anyhow::Result<()> {
        let (builder, sink) = collecting(EmitterConfig::default());
        let em = builder.build();
        let sum = Arc::new(AtomicI64::new(0));

        em.on("add", adder(sum.clone())).await?;
        em.emit("add", params![1, 2, 3]).await?;
        em.wait("add").await?;
        assert_eq!(sum.load(Ordering::SeqCst), 6);
        assert_eq!(
            em.listeners("add").await?,
            Some(ListenerCounts { persistent: 1, once: 0 })
        );
        assert_eq!(
            em.listeners("error").await?,
            Some(ListenerCounts { persistent: 1, once: 0 })
        );

        // type mismatch: the listener reports on `error`
        let seen = Arc::new(Mutex::new(Vec::new()));
        em.once("error", recorder("first", seen.clone())).await?;
        em.emit("add", params!["foo", "bar"]).await?;
        em.wait("error").await?;
        assert_eq!(
            *seen.lock().unwrap(),
            vec![params![EmitterError::custom("invalid params: [foo bar]")]]
        );
        assert_eq!(sum.load(Ordering::SeqCst), 6);
        assert_eq!(em.listeners("error").await?.map(|c| c.once), Some(0));

        // unknown event
        let seen_sub = Arc::new(Mutex::new(Vec::new()));
        em.once("error", recorder("sub", seen_sub.clone())).await?;
        em.emit("sub", ()).await?;
        em.wait("error").await?;
        assert_eq!(
            *seen_sub.lock().unwrap(),
            vec![params![EmitterError::UnexpectedEvent { event: "sub".into() }]]
        );

        // missing listeners
        em.on("blah", None::<ListenerRef>).await?;
        em.wait("error").await?;
        em.once("bleh", None::<ListenerRef>).await?;
        em.wait("error").await?;
        assert_eq!(em.listeners("blah").await?, None);
        assert_eq!(em.listeners("bleh").await?, None);

        // the one-shot recorders never saw the later errors
        assert_eq!(seen.lock().unwrap().len(), 1);
        assert_eq!(seen_sub.lock().unwrap().len(), 1);

        assert_eq!(
            sink.lines(),
            vec![
                "error: invalid params: [foo bar]",
                "error: unexpected event: sub",
                "error: expected 'on' msg to have listener",
                "error: expected 'once' msg to have listener",
            ]
        );
        em.close().await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_wait_on_unknown_event_reports_once() -> anyhow::Result<()> {
        let (builder, sink) = collecting(EmitterConfig::default());
        let em = builder.build();

        let err = em.wait("nope").await.unwrap_err();
        assert_eq!(err, EmitterError::UnexpectedEvent { event: "nope".into() });

        // the error round triggered by the failed wait
        em.wait("error").await?;
        assert_eq!(sink.lines(), vec!["error: unexpected event: nope"]);
        assert!(em.listeners("nope").await?.is_none());

        em.close().await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_once_fires_on_next_round_only() -> anyhow::Result<()> {
        let em = Emitter::new();
        let persistent = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let one_shot = Arc::new(AtomicUsize::new(0));

        em.on("tick", counter("p", persistent.clone())).await?;
        em.once("tick", counter("o", one_shot.clone())).await?;
        em.on("tick", counter("p2", second.clone())).await?;

        for _ in 0..3 {
            em.emit("tick", ()).await?;
            em.wait("tick").await?;
        }

        assert_eq!(persistent.load(Ordering::SeqCst), 3);
        assert_eq!(second.load(Ordering::SeqCst), 3);
        assert_eq!(one_shot.load(Ordering::SeqCst), 1);
        em.close().await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_once_registered_during_round_waits_for_next_round() -> anyhow::Result<()> {
        let em = Emitter::new();
        let late = Arc::new(AtomicUsize::new(0));
        let armed = Arc::new(AtomicBool::new(false));

        let registrar: ListenerRef = {
            let late = late.clone();
            let armed = armed.clone();
            ListenerFn::arc("registrar", move |em: Emitter, _p: Params| {
                let late = late.clone();
                let armed = armed.clone();
                async move {
                    if !armed.swap(true, Ordering::SeqCst) {
                        let _ = em.once("tick", counter("late", late)).await;
                    }
                }
            })
        };
        em.on("tick", registrar).await?;

        em.emit("tick", ()).await?;
        em.wait("tick").await?;
        assert_eq!(late.load(Ordering::SeqCst), 0);
        assert_eq!(em.listeners("tick").await?.map(|c| c.once), Some(1));

        em.emit("tick", ()).await?;
        em.wait("tick").await?;
        em.emit("tick", ()).await?;
        em.wait("tick").await?;
        assert_eq!(late.load(Ordering::SeqCst), 1);

        em.close().await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_entry_round_completes_instantly() -> anyhow::Result<()> {
        let em = Emitter::new();
        let hits = Arc::new(AtomicUsize::new(0));

        em.once("solo", counter("solo", hits.clone())).await?;
        em.emit("solo", ()).await?;
        em.wait("solo").await?;

        assert_eq!(em.listeners("solo").await?, Some(ListenerCounts::default()));
        em.emit("solo", ()).await?;
        tokio::time::timeout(Duration::from_secs(5), em.wait("solo")).await??;
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        em.close().await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_reentrant_emit_from_listener() -> anyhow::Result<()> {
        let em = Emitter::new();
        let pongs = Arc::new(AtomicUsize::new(0));

        em.on("pong", counter("pong", pongs.clone())).await?;
        em.on(
            "ping",
            ListenerFn::arc("ping", |em: Emitter, p: Params| async move {
                let _ = em.emit("pong", p).await;
            }),
        )
        .await?;

        em.emit("ping", params![1]).await?;
        em.wait("ping").await?;
        em.wait("pong").await?;
        assert_eq!(pongs.load(Ordering::SeqCst), 1);

        em.close().await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_close_semantics() -> anyhow::Result<()> {
        let em = Emitter::new();
        let hits = Arc::new(AtomicUsize::new(0));

        em.on("job", counter("job", hits.clone())).await?;
        em.emit("job", ()).await?;
        em.close().await?;
        em.closed().await;

        // queued before close: processed and finished
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(em.is_closed());

        assert_eq!(em.emit("job", ()).await, Err(EmitterError::Closed));
        assert_eq!(em.on("job", None::<ListenerRef>).await, Err(EmitterError::Closed));
        assert_eq!(em.wait("job").await, Err(EmitterError::Closed));
        assert_eq!(em.listeners("job").await, Err(EmitterError::Closed));
        assert_eq!(
            em.try_submit(Command::emit("job", ())),
            Err(EmitterError::Closed)
        );
        assert_eq!(em.close().await, Err(EmitterError::AlreadyClosed));
        Ok(())
    }

    #[tokio::test]
    async fn test_close_releases_pending_wait() -> anyhow::Result<()> {
        let em = Emitter::new();
        em.on("idle", counter("idle", Arc::new(AtomicUsize::new(0))))
            .await?;

        let waiter = {
            let em = em.clone();
            tokio::spawn(async move { em.wait("idle").await })
        };
        // give the wait a chance to reach the dispatch loop
        em.listeners("idle").await?;
        tokio::task::yield_now().await;

        em.close().await?;
        let res = tokio::time::timeout(Duration::from_secs(5), waiter).await??;
        assert_eq!(res, Err(EmitterError::Closed));
        Ok(())
    }

    #[tokio::test]
    async fn test_try_submit_reports_full_queue() -> anyhow::Result<()> {
        let cfg = EmitterConfig {
            queue_capacity: 1,
            ..EmitterConfig::default()
        };
        let em = Emitter::builder(cfg).build();

        // current-thread runtime: the loop cannot run before we yield
        em.try_submit(Command::emit("error", params![EmitterError::custom("a")]))?;
        assert_eq!(
            em.try_submit(Command::emit("error", ())),
            Err(EmitterError::QueueFull)
        );

        em.close().await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_wait_timeout() -> anyhow::Result<()> {
        let cfg = EmitterConfig {
            wait_timeout: Duration::from_millis(20),
            ..EmitterConfig::default()
        };
        let em = Emitter::builder(cfg).build();
        em.on("never", counter("never", Arc::new(AtomicUsize::new(0))))
            .await?;

        assert_eq!(
            em.wait("never").await,
            Err(EmitterError::WaitTimeout {
                event: "never".into(),
                timeout: Duration::from_millis(20),
            })
        );
        em.close().await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_events_listed_sorted() -> anyhow::Result<()> {
        let em = Emitter::new();
        em.on("zeta", counter("z", Arc::new(AtomicUsize::new(0))))
            .await?;
        em.once("alpha", counter("a", Arc::new(AtomicUsize::new(0))))
            .await?;

        let events: Vec<String> = em.events().await?.iter().map(|e| e.to_string()).collect();
        assert_eq!(events, vec!["alpha", "error", "zeta"]);
        em.close().await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_opaque_payload_reaches_listener() -> anyhow::Result<()> {
        #[derive(Debug, PartialEq)]
        struct Order(u32);

        let em = Emitter::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        em.on("order", recorder("order", seen.clone())).await?;

        let order = Value::opaque(Order(7));
        em.emit("order", Params::from(order.clone())).await?;
        em.wait("order").await?;

        let got = seen.lock().unwrap().pop().expect("one round");
        assert_eq!(got.single(), Some(&order));
        assert_eq!(got[0].downcast_ref::<Order>(), Some(&Order(7)));
        em.close().await?;
        Ok(())
    }
}
