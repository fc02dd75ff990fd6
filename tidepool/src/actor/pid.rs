//! Identifier types for actors and pending requests.

use std::fmt;

/// Opaque, process-local identity of a spawned actor.
///
/// A `Pid` is allocated at spawn from a monotonically increasing counter
/// and stays a valid registry key until the actor is stopped. It decouples
/// the logical actor from its mailbox: holders of a `Pid` can send to it
/// without knowing whether the actor is alive, restarting, or gone;
/// messages to a stopped pid are routed to the dead-letter channel.
///
/// Equality and hashing are by value; `Pid` is `Copy` and cheap to pass
/// around or embed in messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pid(u64);

impl Pid {
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw numeric value, for logging and diagnostics.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pid#{}", self.0)
    }
}

/// Opaque token linking a request to its eventual reply.
///
/// Issued by the correlator when a request is made and echoed by
/// [`respond`](crate::actor::Context::respond); matching is on token
/// identity, never on message type.
///
/// # Invariants
///
/// - Unique per pending request within the process.
/// - A single token completes exactly one pending request, at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CorrelationId(u64);

impl CorrelationId {
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw numeric value, for logging and diagnostics.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "corr#{}", self.0)
    }
}
