//! The actor behavior trait.

use crate::actor::Context;
use crate::error::ActorError;
use crate::messaging::DynMessage;
use async_trait::async_trait;

/// A unit of sequential, mutable-state computation reachable only via
/// message passing.
///
/// `handle` is invoked once per dequeued message, in arrival order, and is
/// never executed concurrently for the same instance. The mailbox's
/// execution token is the sole serialization primitive, so actor state
/// needs no internal locking.
///
/// Returning an error (or panicking) routes a failure to the actor's
/// supervision policy; the actor may be rebuilt from its `Props` or
/// stopped, but siblings and the worker pool are unaffected.
///
/// # Example
///
/// ```rust,ignore
/// use tidepool::prelude::*;
///
/// struct Counter {
///     count: u64,
/// }
///
/// #[async_trait]
/// impl Actor for Counter {
///     async fn handle(&mut self, ctx: &mut Context, msg: DynMessage) -> Result<(), ActorError> {
///         if msg.downcast_ref::<Increment>().is_some() {
///             self.count += 1;
///             ctx.respond(self.count);
///         }
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Actor: Send + 'static {
    /// Process one message under the given per-message context.
    async fn handle(&mut self, ctx: &mut Context, msg: DynMessage) -> Result<(), ActorError>;
}
