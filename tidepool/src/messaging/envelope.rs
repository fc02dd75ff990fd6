//! Envelopes and dead letters.

use crate::actor::{CorrelationId, Pid};
use std::any::Any;
use std::fmt;

/// Type-erased in-memory message payload.
///
/// The runtime is single-process with in-memory message passing only, so
/// payloads are boxed values rather than serialized bytes; handlers
/// downcast to the concrete types they understand.
pub type DynMessage = Box<dyn Any + Send>;

/// Unit of delivery placed in a mailbox: the payload plus the metadata a
/// handler's [`Context`](crate::actor::Context) exposes.
pub(crate) struct Envelope {
    /// The message itself.
    pub payload: DynMessage,
    /// Originating actor, when sent from within a handler.
    pub sender: Option<Pid>,
    /// Reply token, present only for requests.
    pub reply_to: Option<CorrelationId>,
}

/// Why a message ended up in the dead-letter channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadLetterReason {
    /// The target pid is not (or no longer) registered.
    UnknownPid,
    /// The target mailbox closed while the send was in flight.
    Closed,
    /// The message was still queued when its actor stopped.
    Discarded,
    /// A reply arrived after its request had timed out or was cancelled.
    OrphanedReply,
}

/// Diagnostic record for a message that could not be delivered.
///
/// Dead letters are an observability side channel, never an error to the
/// original sender. Subscribe via
/// [`ActorSystem::dead_letters`](crate::system::ActorSystem::dead_letters).
pub struct DeadLetter {
    /// Intended target, if the message was addressed to one.
    pub target: Option<Pid>,
    /// Originating actor, when sent from within a handler.
    pub sender: Option<Pid>,
    /// Why delivery failed.
    pub reason: DeadLetterReason,
    /// The undelivered payload.
    pub payload: DynMessage,
}

impl fmt::Debug for DeadLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeadLetter")
            .field("target", &self.target)
            .field("sender", &self.sender)
            .field("reason", &self.reason)
            .finish_non_exhaustive()
    }
}
