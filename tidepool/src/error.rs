//! Error types for the tidepool actor runtime.

use thiserror::Error;

/// Errors surfaced by actor behaviors and request/response calls.
///
/// Behavior failures (`HandlerFailed`, `HandlerPanicked`) are caught at the
/// per-message boundary and routed to the failing actor's supervision
/// policy; they never cross a mailbox boundary. `Timeout` and `Cancelled`
/// are reported only to the requester that issued the call.
#[derive(Debug, Error)]
pub enum ActorError {
    /// An actor's message handler returned an error while processing a
    /// message.
    #[error("handler failed: {0}")]
    HandlerFailed(String),

    /// An actor's message handler panicked while processing a message.
    #[error("handler panicked: {0}")]
    HandlerPanicked(String),

    /// No reply arrived within the request timeout.
    #[error("request timed out")]
    Timeout,

    /// The pending request was torn down before a reply could arrive.
    #[error("request cancelled")]
    Cancelled,

    /// A reply arrived but could not be downcast to the requested type.
    #[error("unexpected reply type")]
    UnexpectedReply,
}
