//! # Listener registry - per-event listener lists.
//!
//! Maps each event name to an [`Entry`] holding two ordered lists (persistent and
//! one-shot) plus the event's [`Completion`] tracker.
//!
//! ## Rules
//! - Entries are created lazily by the first registration for an event.
//! - There is no removal for persistent listeners.
//! - [`Registry::take_round`] snapshots both lists and empties the one-shot list
//!   in the same step; a `once` processed later belongs to the next round.
//! - The registry is owned by the dispatch loop and is never shared, so it needs
//!   no lock.

use std::collections::HashMap;
use std::sync::Arc;

use super::completion::Completion;
use crate::listeners::ListenerRef;

/// Lengths of an entry's lists at the time of the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListenerCounts {
    /// Persistent (`on`) listeners.
    pub persistent: usize,
    /// One-shot (`once`) listeners not yet fired.
    pub once: usize,
}

impl ListenerCounts {
    #[inline]
    pub fn total(&self) -> usize {
        self.persistent + self.once
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Listeners of one event.
struct Entry {
    on: Vec<ListenerRef>,
    once: Vec<ListenerRef>,
    completion: Arc<Completion>,
}

impl Entry {
    fn new() -> Self {
        Self {
            on: Vec::new(),
            once: Vec::new(),
            completion: Completion::new(),
        }
    }
}

/// Launch set of one firing round.
pub(crate) struct RoundSet {
    /// Persistent listeners first, then one-shots, each in registration order.
    pub(crate) listeners: Vec<ListenerRef>,
    pub(crate) completion: Arc<Completion>,
}

/// Event name → listeners.
#[derive(Default)]
pub(crate) struct Registry {
    entries: HashMap<Arc<str>, Entry>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Appends a persistent listener.
    pub(crate) fn on(&mut self, event: Arc<str>, listener: ListenerRef) {
        self.entries
            .entry(event)
            .or_insert_with(Entry::new)
            .on
            .push(listener);
    }

    /// Appends a one-shot listener.
    pub(crate) fn once(&mut self, event: Arc<str>, listener: ListenerRef) {
        self.entries
            .entry(event)
            .or_insert_with(Entry::new)
            .once
            .push(listener);
    }

    pub(crate) fn contains(&self, event: &str) -> bool {
        self.entries.contains_key(event)
    }

    /// Snapshots the launch set of a round and clears the one-shot list.
    ///
    /// Returns `None` if the event has no entry.
    pub(crate) fn take_round(&mut self, event: &str) -> Option<RoundSet> {
        let entry = self.entries.get_mut(event)?;

        let mut listeners = Vec::with_capacity(entry.on.len() + entry.once.len());
        listeners.extend(entry.on.iter().cloned());
        listeners.append(&mut entry.once);

        Some(RoundSet {
            listeners,
            completion: Arc::clone(&entry.completion),
        })
    }

    pub(crate) fn completion(&self, event: &str) -> Option<Arc<Completion>> {
        self.entries.get(event).map(|e| Arc::clone(&e.completion))
    }

    pub(crate) fn counts(&self, event: &str) -> Option<ListenerCounts> {
        self.entries.get(event).map(|e| ListenerCounts {
            persistent: e.on.len(),
            once: e.once.len(),
        })
    }

    /// Returns sorted list of registered event names.
    pub(crate) fn events(&self) -> Vec<Arc<str>> {
        let mut names: Vec<Arc<str>> = self.entries.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Closes every completion tracker (pending waits fail with `Closed`).
    pub(crate) fn close_all(&self) {
        for entry in self.entries.values() {
            entry.completion.close();
        }
    }
}
