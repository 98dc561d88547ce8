//! # Dispatch loop - the single serialization point of an emitter.
//!
//! One spawned task owns the [`Registry`] and the receiving half of the inbound
//! queue. It interprets messages strictly in arrival order, so registry mutation
//! never races: the loop itself is the lock.
//!
//! ## Architecture
//! ```text
//! [queue] ──► Dispatcher::run()
//!               ├─► Command{on}    → registry.on()   | None listener → report(MissingListener)
//!               ├─► Command{once}  → registry.once() | None listener → report(MissingListener)
//!               ├─► Command{emit}  → fire()          | no entry      → report(UnexpectedEvent)
//!               ├─► Command{other} → report(UnexpectedCommand)
//!               ├─► Wait{reply}    → reply(completion) | no entry    → report(UnexpectedEvent)
//!               ├─► Inspect/Events → reply(snapshot)
//!               └─► Close          → stop accepting, drain the rest
//!
//! report(err) ──► fire("error", [err])            (listeners present)
//!             └─► sink.write_error(err)           (no listeners: never re-routed)
//! ```
//!
//! ## Shutdown
//! ```text
//! Close ─► rx.close() ─► drain buffered ─► drained.cancel()
//!                                          ─► tasks.close(); tasks.wait()
//!                                          ─► registry.close_all()
//!                                          ─► stopped.cancel()
//! ```
//! The loop also ends when every emitter handle is dropped (all senders gone).

use std::sync::{Arc, Weak};

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;

use super::completion::Completion;
use super::emitter::{Emitter, Inner, Message, Shared};
use super::firing;
use super::registry::Registry;
use crate::error::EmitterError;
use crate::events::{Command, CommandKind, Params};
use crate::params;

/// State owned by the dispatch loop.
pub(crate) struct Dispatcher {
    emitter: Weak<Inner>,
    shared: Arc<Shared>,
    registry: Registry,
    tasks: TaskTracker,
}

impl Dispatcher {
    pub(crate) fn new(emitter: Weak<Inner>, shared: Arc<Shared>, registry: Registry) -> Self {
        Self {
            emitter,
            shared,
            registry,
            tasks: TaskTracker::new(),
        }
    }

    /// Spawns the loop. Call once per emitter.
    pub(crate) fn spawn(self, rx: mpsc::Receiver<Message>) -> JoinHandle<()> {
        tokio::spawn(self.run(rx))
    }

    async fn run(mut self, mut rx: mpsc::Receiver<Message>) {
        while let Some(msg) = rx.recv().await {
            match msg {
                Message::Command(cmd) => self.handle_command(cmd),
                Message::Wait { event, reply } => self.handle_wait(event, reply),
                Message::Inspect { event, reply } => {
                    let _ = reply.send(self.registry.counts(&event));
                }
                Message::Events { reply } => {
                    let _ = reply.send(self.registry.events());
                }
                Message::Close => {
                    tracing::debug!("close requested; draining queue");
                    rx.close();
                }
            }
        }
        self.shared.drained.cancel();

        self.tasks.close();
        self.tasks.wait().await;
        self.registry.close_all();
        self.shared.stopped.cancel();
        tracing::debug!("dispatch loop stopped");
    }

    fn handle_command(&mut self, cmd: Command) {
        let (kind, event, listener, params) = cmd.into_parts();
        tracing::trace!(cmd = %kind, event = %event, "command");

        match kind {
            CommandKind::On => match listener {
                Some(l) => {
                    tracing::debug!(event = %event, listener = l.name(), "registered listener");
                    self.registry.on(event, l);
                }
                None => self.report(EmitterError::MissingListener { op: "on" }),
            },
            CommandKind::Once => match listener {
                Some(l) => {
                    tracing::debug!(event = %event, listener = l.name(), "registered one-shot listener");
                    self.registry.once(event, l);
                }
                None => self.report(EmitterError::MissingListener { op: "once" }),
            },
            CommandKind::Emit => {
                if self.registry.contains(&event) {
                    self.fire(event, params);
                } else {
                    self.report(EmitterError::UnexpectedEvent { event });
                }
            }
            CommandKind::Other(tag) => self.report(EmitterError::UnexpectedCommand { cmd: tag }),
        }
    }

    fn handle_wait(
        &mut self,
        event: Arc<str>,
        reply: oneshot::Sender<Result<Arc<Completion>, EmitterError>>,
    ) {
        let res = match self.registry.completion(&event) {
            Some(completion) => Ok(completion),
            None => {
                let err = EmitterError::UnexpectedEvent { event };
                self.report(err.clone());
                Err(err)
            }
        };
        let _ = reply.send(res);
    }

    /// Starts a firing round for a registered event.
    fn fire(&mut self, event: Arc<str>, params: Params) {
        let Some(round) = self.registry.take_round(&event) else {
            return;
        };
        let Some(emitter) = self.emitter.upgrade().map(Emitter::from_inner) else {
            tracing::debug!(event = %event, "all emitter handles dropped; round skipped");
            return;
        };
        firing::launch(&emitter, &self.tasks, event, round, params);
    }

    /// Funnels a dispatcher-detected error into the `error` event.
    fn report(&mut self, err: EmitterError) {
        tracing::debug!(error = %err, label = err.as_label(), "dispatch error");
        let error_event = Arc::clone(&self.shared.cfg.error_event);

        match self.registry.counts(&error_event) {
            Some(counts) if !counts.is_empty() => self.fire(error_event, params![err]),
            Some(_) => {
                self.shared.sink.write_error(&err.to_string());
                self.fire(error_event, params![err]);
            }
            None => self.shared.sink.write_error(&err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::{Arc, Mutex};

    use crate::core::testkit::{collecting, counter, recorder};
    use crate::{Command, EmitterConfig, EmitterError, ListenerCounts, ListenerRef, params};

    #[tokio::test]
    async fn test_unknown_command_reported() -> anyhow::Result<()> {
        let em = crate::Emitter::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        em.once("error", recorder("cmd", seen.clone())).await?;

        em.submit(Command::tagged("off", "add")).await?;
        em.wait("error").await?;

        assert_eq!(
            *seen.lock().unwrap(),
            vec![params![EmitterError::UnexpectedCommand { cmd: "off".into() }]]
        );
        assert!(em.listeners("add").await?.is_none());
        em.close().await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_tagged_known_kinds_behave_like_front_end() -> anyhow::Result<()> {
        let (builder, sink) = collecting(EmitterConfig::default());
        let em = builder.build();

        // a tagged `on` has no listener attached
        em.submit(Command::tagged("on", "x")).await?;
        em.wait("error").await?;
        assert_eq!(sink.lines(), vec!["error: expected 'on' msg to have listener"]);
        em.close().await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_listener_never_mutates_registry() -> anyhow::Result<()> {
        let em = crate::Emitter::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        em.on("error", recorder("all", seen.clone())).await?;

        em.on("x", None::<ListenerRef>).await?;
        em.wait("error").await?;
        em.once("x", None::<ListenerRef>).await?;
        em.wait("error").await?;

        assert_eq!(em.listeners("x").await?, None);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                params![EmitterError::MissingListener { op: "on" }],
                params![EmitterError::MissingListener { op: "once" }],
            ]
        );
        em.close().await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_without_error_listener_goes_to_sink() -> anyhow::Result<()> {
        let (builder, sink) = collecting(EmitterConfig::default());
        let em = builder.without_default_error_listener().build();

        em.emit("x", ()).await?;
        assert_eq!(
            em.wait("error").await,
            Err(EmitterError::UnexpectedEvent {
                event: "error".into()
            })
        );
        // the loop answers in order, so both reports are written by now
        assert!(em.listeners("error").await?.is_none());
        assert_eq!(
            sink.lines(),
            vec!["error: unexpected event: x", "error: unexpected event: error"]
        );
        em.close().await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_emptied_error_entry_still_completes_rounds() -> anyhow::Result<()> {
        let (builder, sink) = collecting(EmitterConfig::default());
        let em = builder.without_default_error_listener().build();
        let hits = Arc::new(AtomicUsize::new(0));

        em.once("error", counter("only", hits.clone())).await?;
        em.emit("error", params![EmitterError::custom("first")]).await?;
        em.wait("error").await?;
        assert_eq!(em.listeners("error").await?, Some(ListenerCounts::default()));

        em.emit("nope", ()).await?;
        em.wait("error").await?;

        assert_eq!(hits.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert_eq!(sink.lines(), vec!["error: unexpected event: nope"]);
        em.close().await?;
        Ok(())
    }
}
