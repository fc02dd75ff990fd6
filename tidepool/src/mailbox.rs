//! Per-actor mailbox and activation cell.
//!
//! A mailbox is an unbounded FIFO of envelopes plus an execution token (an
//! atomic idle/scheduled flag) guaranteeing at most one concurrent
//! processing pass. The claim protocol is lock-light:
//!
//! - a sender that enqueues into an idle mailbox wins the
//!   idle→scheduled compare-and-swap and must dispatch a pass;
//! - the pass drains messages, stores idle, re-checks the queue and
//!   re-claims if messages arrived meanwhile.
//!
//! Either the sender's CAS or the pass's re-check succeeds, never both
//! and never neither, so there are no duplicate claims and no lost
//! wake-ups.

use crate::actor::{Actor, Pid, Props};
use crate::messaging::Envelope;
use crate::supervision::RestartStats;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

const IDLE: u8 = 0;
const SCHEDULED: u8 = 1;

/// The actor instance plus its supervision bookkeeping.
///
/// Owned by the mailbox and taken out for the duration of a processing
/// pass; only the worker holding the execution token ever touches it, so
/// the actor's state needs no further synchronization.
pub(crate) struct ActorCell {
    /// The live behavior instance.
    pub actor: Box<dyn Actor>,
    /// Blueprint used to rebuild the instance on supervised restart.
    pub props: Props,
    /// Spawning actor, for diagnostics.
    pub parent: Option<Pid>,
    /// Restart history consulted by the one-for-one policy.
    pub restarts: RestartStats,
}

/// Ordered, unbounded queue of incoming envelopes plus the execution
/// token for its actor.
pub(crate) struct Mailbox {
    pid: Pid,
    queue: Mutex<VecDeque<Envelope>>,
    state: AtomicU8,
    closed: AtomicBool,
    cell: Mutex<Option<ActorCell>>,
}

impl Mailbox {
    pub fn new(pid: Pid, cell: ActorCell) -> Self {
        Self {
            pid,
            queue: Mutex::new(VecDeque::new()),
            state: AtomicU8::new(IDLE),
            closed: AtomicBool::new(false),
            cell: Mutex::new(Some(cell)),
        }
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    /// Append an envelope in arrival order.
    ///
    /// Returns `Ok(true)` when the mailbox was idle and the caller now
    /// holds the execution token (and must dispatch a processing pass), or
    /// `Err(envelope)` when the mailbox is closed so the caller can
    /// dead-letter the message.
    pub fn enqueue(&self, envelope: Envelope) -> Result<bool, Envelope> {
        {
            let mut queue = self.queue.lock();
            // Checked under the queue lock so no envelope can slip in
            // after close() drained the backlog.
            if self.closed.load(Ordering::Acquire) {
                return Err(envelope);
            }
            queue.push_back(envelope);
        }
        Ok(self.try_claim())
    }

    /// Pop the next envelope. Only the worker holding the token calls this.
    pub fn pop(&self) -> Option<Envelope> {
        self.queue.lock().pop_front()
    }

    /// Release the execution token after a pass.
    ///
    /// Returns `true` when messages arrived during the pass and the caller
    /// re-won the token, in which case it must dispatch another pass.
    pub fn release(&self) -> bool {
        self.state.store(IDLE, Ordering::Release);
        if self.closed.load(Ordering::Acquire) || self.queue.lock().is_empty() {
            return false;
        }
        self.try_claim()
    }

    /// Mark the mailbox closed and drain the undelivered backlog.
    pub fn close(&self) -> Vec<Envelope> {
        let mut queue = self.queue.lock();
        self.closed.store(true, Ordering::Release);
        queue.drain(..).collect()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Take the cell for a processing pass. `None` while another pass holds
    /// it or after the actor stopped.
    pub fn take_cell(&self) -> Option<ActorCell> {
        self.cell.lock().take()
    }

    /// Return the cell at the end of a pass.
    pub fn put_cell(&self, cell: ActorCell) {
        *self.cell.lock() = Some(cell);
    }

    fn try_claim(&self) -> bool {
        self.state
            .compare_exchange(IDLE, SCHEDULED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}
