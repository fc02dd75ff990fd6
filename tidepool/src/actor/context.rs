//! Per-message capability object handed to actor behaviors.

use crate::actor::{CorrelationId, Pid, Props};
use crate::error::ActorError;
use crate::system::ActorSystem;
use std::time::Duration;

/// Capabilities available to an actor while it processes one message.
///
/// A fresh `Context` is built per envelope. It carries the identity of the
/// current actor, the sender of the message being processed and, for
/// requests, the reply token consumed by [`Context::respond`].
///
/// # Example
///
/// ```rust,ignore
/// async fn handle(&mut self, ctx: &mut Context, msg: DynMessage) -> Result<(), ActorError> {
///     if msg.downcast_ref::<Ping>().is_some() {
///         self.count += 1;
///         ctx.respond(Pong { count: self.count });
///     }
///     Ok(())
/// }
/// ```
pub struct Context {
    system: ActorSystem,
    pid: Pid,
    sender: Option<Pid>,
    reply_to: Option<CorrelationId>,
}

impl Context {
    pub(crate) fn new(
        system: ActorSystem,
        pid: Pid,
        sender: Option<Pid>,
        reply_to: Option<CorrelationId>,
    ) -> Self {
        Self {
            system,
            pid,
            sender,
            reply_to,
        }
    }

    /// Identity of the actor processing the current message.
    pub fn pid(&self) -> Pid {
        self.pid
    }

    /// Identity of the current message's sender, when it was sent from
    /// within another actor's handler.
    pub fn sender(&self) -> Option<Pid> {
        self.sender
    }

    /// Handle to the actor system, for passing to collaborators.
    pub fn system(&self) -> &ActorSystem {
        &self.system
    }

    /// Fire-and-forget send carrying this actor's pid as the sender.
    ///
    /// No acknowledgment and no ordering guarantee relative to other
    /// senders; messages from this actor to one target are delivered in
    /// send order.
    pub fn send<M: Send + 'static>(&self, target: Pid, msg: M) {
        self.system
            .deliver(target, Box::new(msg), Some(self.pid), None);
    }

    /// Correlated request with the system's default timeout.
    ///
    /// Suspends this actor's logical continuation until the reply arrives
    /// or the timeout elapses; the worker is free to service other actors
    /// meanwhile. The reply is downcast to `R`;
    /// [`ActorError::UnexpectedReply`] is reported on a type mismatch.
    pub async fn request<R, M>(&self, target: Pid, msg: M) -> Result<R, ActorError>
    where
        R: Send + 'static,
        M: Send + 'static,
    {
        let timeout = self.system.config().default_request_timeout;
        self.request_with_timeout(target, msg, timeout).await
    }

    /// Correlated request with an explicit timeout.
    pub async fn request_with_timeout<R, M>(
        &self,
        target: Pid,
        msg: M,
        timeout: Duration,
    ) -> Result<R, ActorError>
    where
        R: Send + 'static,
        M: Send + 'static,
    {
        let reply = self
            .system
            .request_from(Some(self.pid), target, Box::new(msg), timeout)
            .await?;
        reply
            .downcast::<R>()
            .map(|boxed| *boxed)
            .map_err(|_| ActorError::UnexpectedReply)
    }

    /// Reply to the request currently being processed.
    ///
    /// Consumes the reply token: the first call completes the pending
    /// request exactly once; a second call, or a call while processing a
    /// plain send, is a no-op logged at warn level.
    pub fn respond<M: Send + 'static>(&mut self, msg: M) {
        match self.reply_to.take() {
            Some(token) => self.system.respond(self.pid, token, Box::new(msg)),
            None => {
                tracing::warn!(pid = %self.pid, "respond without an active reply token; dropped")
            }
        }
    }

    /// Spawn a child actor; the new pid is recorded as a child of this
    /// actor for diagnostics, and its supervision policy comes from its
    /// own `Props`.
    pub fn spawn(&self, props: Props) -> Pid {
        self.system.spawn_child(props, Some(self.pid))
    }

    /// Request termination of `target`. Stopping self takes effect after
    /// the current message finishes.
    pub fn stop(&self, target: Pid) {
        self.system.stop(target);
    }
}
