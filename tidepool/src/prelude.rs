//! Convenience re-exports for actor implementations.
//!
//! ```ignore
//! use tidepool::prelude::*;
//! ```

pub use crate::actor::{Actor, Context, Pid, Props};
pub use crate::error::ActorError;
pub use crate::messaging::{DeadLetter, DeadLetterReason, DynMessage};
pub use crate::supervision::{Directive, SupervisorStrategy};
pub use crate::system::{ActorSystem, SystemConfig};

pub use async_trait::async_trait;
pub use std::sync::Arc;
pub use std::time::Duration;

/// Handler result alias used throughout actor implementations.
pub type Result<T> = std::result::Result<T, ActorError>;
