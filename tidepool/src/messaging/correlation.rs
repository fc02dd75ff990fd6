//! Pending-request table for request/response correlation.
//!
//! A request parks a oneshot sender here under a fresh token; the token
//! travels in the outgoing envelope and is echoed by `respond`. Completion
//! removes the entry *before* firing the oneshot, so a racing timeout and a
//! racing reply resolve to whichever removes the entry first; the other
//! observes an empty slot and is discarded.

use crate::actor::{CorrelationId, Pid};
use crate::messaging::DynMessage;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::oneshot;

/// A reply delivered to a pending request.
pub(crate) struct Reply {
    /// The response payload.
    pub payload: DynMessage,
    /// The actor that issued the respond.
    pub responder: Pid,
}

/// Table of requests awaiting replies, keyed by correlation token.
///
/// Touched concurrently by every requesting and responding actor, so the
/// map is sharded per entry rather than guarded by one lock.
pub(crate) struct Correlator {
    pending: DashMap<CorrelationId, oneshot::Sender<Reply>>,
    next_token: AtomicU64,
}

impl Correlator {
    pub fn new() -> Self {
        Self {
            pending: DashMap::new(),
            next_token: AtomicU64::new(1),
        }
    }

    /// Issue a fresh token and park a oneshot for its reply.
    pub fn register(&self) -> (CorrelationId, oneshot::Receiver<Reply>) {
        let token = CorrelationId::new(self.next_token.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = oneshot::channel();
        self.pending.insert(token, tx);
        (token, rx)
    }

    /// Complete the pending request for `token`, if one is still live.
    ///
    /// Exactly-once: the entry is removed before the send, so a second
    /// completion (or a late reply) gets the payload back in `Err` for the
    /// caller to dead-letter.
    pub fn complete(&self, token: CorrelationId, reply: Reply) -> Result<(), Reply> {
        match self.pending.remove(&token) {
            Some((_, tx)) => tx.send(reply),
            None => Err(reply),
        }
    }

    /// Drop the pending entry for `token` (timeout or cancellation).
    /// Returns whether an entry was actually removed.
    pub fn abandon(&self, token: CorrelationId) -> bool {
        self.pending.remove(&token).is_some()
    }

    #[cfg(test)]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
