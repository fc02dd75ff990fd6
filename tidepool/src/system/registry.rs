//! Pid → mailbox address registry.

use crate::actor::Pid;
use crate::mailbox::Mailbox;
use dashmap::DashMap;
use std::sync::Arc;

/// Maps live pids to their mailbox handles.
///
/// The leaf dependency of the runtime: sends, requests and stops all go
/// through a lookup here. Entries are fully constructed before insertion
/// (a pid is never observable half-initialized) and removed exactly once
/// on stop. Sharded per entry so concurrent spawns (children spawning
/// children) do not serialize on a single lock.
pub(crate) struct Registry {
    entries: DashMap<Pid, Arc<Mailbox>>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    pub fn insert(&self, pid: Pid, mailbox: Arc<Mailbox>) {
        self.entries.insert(pid, mailbox);
    }

    pub fn lookup(&self, pid: Pid) -> Option<Arc<Mailbox>> {
        self.entries.get(&pid).map(|entry| entry.value().clone())
    }

    /// Remove and return the mailbox for `pid`; `None` when already
    /// removed, making stop idempotent.
    pub fn remove(&self, pid: Pid) -> Option<Arc<Mailbox>> {
        self.entries.remove(&pid).map(|(_, mailbox)| mailbox)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
