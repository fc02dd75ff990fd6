//! Spawn blueprints.

use crate::actor::Actor;
use crate::supervision::SupervisorStrategy;
use std::fmt;
use std::sync::Arc;

/// Immutable blueprint describing how to construct an actor instance and
/// which supervision policy applies to it.
///
/// `Props` is a factory, not a running entity: many pids may be spawned
/// from one blueprint, and supervision reuses the same blueprint to build
/// a fresh instance bound to the same pid after a failure.
///
/// # Example
///
/// ```rust,ignore
/// let props = Props::from_producer(|| Worker::new())
///     .with_supervisor_strategy(SupervisorStrategy::restart(3, Some(Duration::from_secs(1))));
/// let pid = system.spawn(props);
/// ```
#[derive(Clone)]
pub struct Props {
    producer: Arc<dyn Fn() -> Box<dyn Actor> + Send + Sync>,
    strategy: SupervisorStrategy,
}

impl Props {
    /// Build `Props` from a producer closure.
    ///
    /// The closure is called once per spawn and once per supervised
    /// restart; captured values it needs across instances should be owned
    /// or `Arc`-shared.
    pub fn from_producer<F, A>(producer: F) -> Self
    where
        F: Fn() -> A + Send + Sync + 'static,
        A: Actor,
    {
        Self {
            producer: Arc::new(move || Box::new(producer())),
            strategy: SupervisorStrategy::default(),
        }
    }

    /// Attach a supervision policy, applied one-for-one to every actor
    /// spawned from this blueprint.
    pub fn with_supervisor_strategy(mut self, strategy: SupervisorStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Construct a fresh actor instance.
    pub(crate) fn produce(&self) -> Box<dyn Actor> {
        (self.producer)()
    }

    pub(crate) fn strategy(&self) -> &SupervisorStrategy {
        &self.strategy
    }
}

impl fmt::Debug for Props {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Props")
            .field("strategy", &self.strategy)
            .finish_non_exhaustive()
    }
}
