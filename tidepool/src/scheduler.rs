//! Mailbox dispatch: processing passes on the shared worker pool.
//!
//! A processing pass is a task on the multi-threaded tokio runtime. The
//! mailbox's execution token guarantees at most one pass per actor at any
//! instant, which is the sole serialization primitive protecting actor
//! state. A pass drains up to the configured throughput of envelopes,
//! then releases the token and re-dispatches itself when messages arrived
//! during the pass.
//!
//! Failures (handler errors and panics) are caught here, at the
//! per-message boundary, and fed to the one-for-one supervision policy.
//! They never escape into the worker pool and never affect siblings.

use crate::actor::{Context, Pid};
use crate::error::ActorError;
use crate::mailbox::{ActorCell, Mailbox};
use crate::supervision::Directive;
use crate::system::ActorSystem;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// Dispatch one processing pass for a mailbox whose execution token the
/// caller just claimed.
pub(crate) fn dispatch(system: ActorSystem, mailbox: Arc<Mailbox>) {
    tokio::spawn(process_pass(system, mailbox));
}

async fn process_pass(system: ActorSystem, mailbox: Arc<Mailbox>) {
    let pid = mailbox.pid();
    let Some(mut cell) = mailbox.take_cell() else {
        // The actor stopped between claim and dispatch; the token dies
        // with the mailbox.
        return;
    };

    let throughput = system.config().throughput;
    let mut stopped = false;

    for _ in 0..throughput {
        if mailbox.is_closed() {
            stopped = true;
            break;
        }
        let Some(envelope) = mailbox.pop() else { break };

        tracing::debug!(pid = %pid, sender = ?envelope.sender, "processing message");
        let mut ctx = Context::new(system.clone(), pid, envelope.sender, envelope.reply_to);
        let outcome = AssertUnwindSafe(cell.actor.handle(&mut ctx, envelope.payload))
            .catch_unwind()
            .await;

        let failure = match outcome {
            Ok(Ok(())) => None,
            Ok(Err(err)) => Some(err),
            Err(panic) => Some(ActorError::HandlerPanicked(panic_message(panic))),
        };

        if let Some(err) = failure {
            tracing::error!(pid = %pid, error = %err, "actor failure");
            if !supervise(&system, pid, &mut cell) {
                stopped = true;
                break;
            }
        }
    }

    if stopped || mailbox.is_closed() {
        // The registry entry is already gone; drop the instance with the
        // pass instead of returning it to the mailbox.
        return;
    }

    mailbox.put_cell(cell);
    if mailbox.release() {
        dispatch(system, mailbox);
    }
}

/// Apply the one-for-one policy to a failed child. The failed message is
/// discarded; on restart, draining resumes from the next message with a
/// fresh instance built from the same `Props`, bound to the same pid.
/// Returns `false` when the child must stop.
fn supervise(system: &ActorSystem, pid: Pid, cell: &mut ActorCell) -> bool {
    let strategy = *cell.props.strategy();
    match strategy.directive {
        Directive::Stop => {
            tracing::info!(pid = %pid, "supervision directive is Stop; stopping child");
            system.stop(pid);
            false
        }
        Directive::Restart => {
            if cell.restarts.record(&strategy) {
                tracing::error!(
                    pid = %pid,
                    max_restarts = strategy.max_restarts,
                    "restart limit exceeded; stopping child permanently"
                );
                system.stop(pid);
                false
            } else {
                tracing::info!(pid = %pid, parent = ?cell.parent, "restarting failed child");
                cell.actor = cell.props.produce();
                true
            }
        }
    }
}

fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "opaque panic payload".to_string()
    }
}
