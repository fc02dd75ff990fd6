//! The actor system: spawning, routing and lifecycle.

mod registry;

use crate::actor::{CorrelationId, Pid, Props};
use crate::error::ActorError;
use crate::mailbox::{ActorCell, Mailbox};
use crate::messaging::{
    Correlator, DeadLetter, DeadLetterReason, DynMessage, Envelope, Reply,
};
use crate::scheduler;
use crate::supervision::RestartStats;
use parking_lot::Mutex;
use registry::Registry;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Runtime configuration, passed by value into [`ActorSystem::new`].
#[derive(Debug, Clone)]
pub struct SystemConfig {
    /// Timeout applied to requests that do not specify one.
    pub default_request_timeout: Duration,
    /// Envelopes drained per processing pass before a mailbox yields its
    /// worker back to the pool.
    pub throughput: usize,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            default_request_timeout: Duration::from_secs(30),
            throughput: 16,
        }
    }
}

/// Handle to a running actor system.
///
/// Constructed once at startup and passed explicitly (it is cheap to
/// clone) to every component that needs to spawn or route messages; there
/// is no process-wide singleton. Processing passes run as tasks on the
/// multi-threaded tokio runtime the system lives on, so the worker thread
/// count is fixed at runtime construction and independent of actor count.
///
/// # Example
///
/// ```rust,ignore
/// let system = ActorSystem::new(SystemConfig::default());
/// let pid = system.spawn(Props::from_producer(|| Worker::new()));
/// let pong: Pong = system.request(pid, Ping, Duration::from_secs(1)).await?;
/// ```
#[derive(Clone)]
pub struct ActorSystem {
    inner: Arc<SystemInner>,
}

struct SystemInner {
    registry: Registry,
    correlator: Correlator,
    next_pid: AtomicU64,
    config: SystemConfig,
    dead_letters: Mutex<Option<mpsc::UnboundedSender<DeadLetter>>>,
}

impl ActorSystem {
    /// Create a system with the given configuration.
    pub fn new(config: SystemConfig) -> Self {
        Self {
            inner: Arc::new(SystemInner {
                registry: Registry::new(),
                correlator: Correlator::new(),
                next_pid: AtomicU64::new(1),
                config,
                dead_letters: Mutex::new(None),
            }),
        }
    }

    /// Spawn a top-level actor from `props` and return its pid.
    ///
    /// The pid is registered before this returns and before any message is
    /// processed; safe to call concurrently from many actors.
    pub fn spawn(&self, props: Props) -> Pid {
        self.spawn_child(props, None)
    }

    pub(crate) fn spawn_child(&self, props: Props, parent: Option<Pid>) -> Pid {
        let pid = Pid::new(self.inner.next_pid.fetch_add(1, Ordering::Relaxed));
        let cell = ActorCell {
            actor: props.produce(),
            props,
            parent,
            restarts: RestartStats::default(),
        };
        let mailbox = Arc::new(Mailbox::new(pid, cell));
        self.inner.registry.insert(pid, mailbox);
        tracing::info!(pid = %pid, ?parent, "spawned actor");
        pid
    }

    /// Fire-and-forget send from outside any actor.
    pub fn send<M: Send + 'static>(&self, target: Pid, msg: M) {
        self.deliver(target, Box::new(msg), None, None);
    }

    /// Correlated request from outside any actor.
    ///
    /// Completes with the reply, [`ActorError::Timeout`] when none arrives
    /// in time, or [`ActorError::Cancelled`] when the pending request is
    /// torn down under the caller. Dropping the returned future cancels
    /// the request: the pending entry is removed and a late reply is
    /// dead-lettered as orphaned. A message already delivered to the
    /// target's mailbox is not retracted.
    pub async fn request<R, M>(
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
            .request_from(None, target, Box::new(msg), timeout)
            .await?;
        reply
            .downcast::<R>()
            .map(|boxed| *boxed)
            .map_err(|_| ActorError::UnexpectedReply)
    }

    /// Stop `target`: close its mailbox, dead-letter the queued backlog
    /// and remove the registry entry. Idempotent: stopping an
    /// already-stopped pid is a no-op.
    pub fn stop(&self, target: Pid) {
        let Some(mailbox) = self.inner.registry.remove(target) else {
            tracing::debug!(pid = %target, "stop of unknown or already-stopped pid");
            return;
        };
        let backlog = mailbox.close();
        tracing::info!(pid = %target, discarded = backlog.len(), "stopped actor");
        for envelope in backlog {
            self.dead_letter(DeadLetter {
                target: Some(target),
                sender: envelope.sender,
                reason: DeadLetterReason::Discarded,
                payload: envelope.payload,
            });
        }
    }

    /// Subscribe to the dead-letter side channel.
    ///
    /// Receives envelopes addressed to unknown or stopped pids, messages
    /// discarded at stop, and orphaned replies. Diagnostics only; dead
    /// letters are never surfaced as errors to the original sender.
    /// A new subscription replaces any previous one.
    pub fn dead_letters(&self) -> mpsc::UnboundedReceiver<DeadLetter> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.inner.dead_letters.lock() = Some(tx);
        rx
    }

    pub(crate) fn config(&self) -> &SystemConfig {
        &self.inner.config
    }

    /// Route an envelope to `target`, claiming and dispatching the
    /// mailbox when it was idle.
    pub(crate) fn deliver(
        &self,
        target: Pid,
        payload: DynMessage,
        sender: Option<Pid>,
        reply_to: Option<CorrelationId>,
    ) {
        let Some(mailbox) = self.inner.registry.lookup(target) else {
            self.dead_letter(DeadLetter {
                target: Some(target),
                sender,
                reason: DeadLetterReason::UnknownPid,
                payload,
            });
            return;
        };
        let envelope = Envelope {
            payload,
            sender,
            reply_to,
        };
        match mailbox.enqueue(envelope) {
            Ok(true) => scheduler::dispatch(self.clone(), mailbox),
            Ok(false) => {}
            Err(envelope) => self.dead_letter(DeadLetter {
                target: Some(target),
                sender: envelope.sender,
                reason: DeadLetterReason::Closed,
                payload: envelope.payload,
            }),
        }
    }

    /// Issue a correlated request on behalf of `sender` and await the
    /// reply, the timeout, or cancellation. Exactly one of the three
    /// terminates the pending record.
    pub(crate) async fn request_from(
        &self,
        sender: Option<Pid>,
        target: Pid,
        payload: DynMessage,
        timeout: Duration,
    ) -> Result<DynMessage, ActorError> {
        let (token, rx) = self.inner.correlator.register();
        let guard = PendingGuard {
            system: self,
            token,
            armed: true,
        };
        self.deliver(target, payload, sender, Some(token));

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(reply)) => {
                guard.disarm();
                Ok(reply.payload)
            }
            Ok(Err(_closed)) => {
                guard.disarm();
                Err(ActorError::Cancelled)
            }
            Err(_elapsed) => {
                // Guard removes the pending entry; a reply arriving later
                // finds no record and is dead-lettered as orphaned.
                drop(guard);
                tracing::debug!(token = %token, target = %target, "request timed out");
                Err(ActorError::Timeout)
            }
        }
    }

    /// Complete the pending request for `token` with a reply from
    /// `responder`, or dead-letter the reply when the request is gone.
    pub(crate) fn respond(&self, responder: Pid, token: CorrelationId, payload: DynMessage) {
        let reply = Reply { payload, responder };
        if let Err(reply) = self.inner.correlator.complete(token, reply) {
            tracing::warn!(token = %token, responder = %responder, "orphaned reply dropped");
            self.dead_letter(DeadLetter {
                target: None,
                sender: Some(responder),
                reason: DeadLetterReason::OrphanedReply,
                payload: reply.payload,
            });
        }
    }

    pub(crate) fn dead_letter(&self, letter: DeadLetter) {
        tracing::debug!(letter = ?letter, "dead letter");
        let mut slot = self.inner.dead_letters.lock();
        if let Some(tx) = slot.as_ref() {
            if tx.send(letter).is_err() {
                // Subscriber went away; stop buffering.
                *slot = None;
            }
        }
    }
}

impl Default for ActorSystem {
    fn default() -> Self {
        Self::new(SystemConfig::default())
    }
}

/// Removes the pending-request entry when the request future is dropped
/// before completion (timeout or caller-side cancellation).
struct PendingGuard<'a> {
    system: &'a ActorSystem,
    token: CorrelationId,
    armed: bool,
}

impl PendingGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.system.inner.correlator.abandon(self.token);
        }
    }
}
