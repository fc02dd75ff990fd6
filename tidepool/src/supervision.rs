//! One-for-one supervision policy and restart accounting.
//!
//! A strategy is plain configuration attached to [`Props`](crate::actor::Props)
//! and passed by value into spawn; there is no shared supervisor object.
//! Failures are handled per child: a crashed actor is rebuilt from its own
//! blueprint (same pid, same mailbox) and siblings are never touched.

use std::time::{Duration, Instant};

/// What to do with a child that failed while processing a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// Rebuild a fresh instance from the same `Props`, bound to the same
    /// pid, and resume draining the mailbox from the next message.
    Restart,
    /// Stop the child on its first failure.
    Stop,
}

/// Restart policy for actors spawned from a given `Props`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupervisorStrategy {
    /// Maximum restarts tolerated within `window` before the child is
    /// stopped permanently.
    pub max_restarts: u32,
    /// Sliding window for counting restarts. `None` means an unlimited
    /// time window: the counter never decays, so the child gets at most
    /// `max_restarts` restarts over its whole lifetime.
    pub window: Option<Duration>,
    /// Directive applied when a child fails.
    pub directive: Directive,
}

impl Default for SupervisorStrategy {
    fn default() -> Self {
        Self {
            max_restarts: 10,
            window: Some(Duration::from_secs(10)),
            directive: Directive::Restart,
        }
    }
}

impl SupervisorStrategy {
    /// One-for-one restart with the given limits.
    pub fn restart(max_restarts: u32, window: Option<Duration>) -> Self {
        Self {
            max_restarts,
            window,
            directive: Directive::Restart,
        }
    }

    /// Stop the child on its first failure.
    pub fn stop() -> Self {
        Self {
            max_restarts: 0,
            window: None,
            directive: Directive::Stop,
        }
    }
}

/// Per-child restart history.
#[derive(Debug, Default)]
pub(crate) struct RestartStats {
    history: Vec<Instant>,
}

impl RestartStats {
    /// Record a restart attempt. Returns `true` when the attempt exceeds
    /// the strategy's limit and the child must be stopped instead of
    /// restarted.
    pub fn record(&mut self, strategy: &SupervisorStrategy) -> bool {
        let now = Instant::now();
        if let Some(window) = strategy.window {
            self.history.retain(|t| now.duration_since(*t) < window);
        }
        self.history.push(now);
        self.history.len() as u32 > strategy.max_restarts
    }
}
