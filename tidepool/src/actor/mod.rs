//! Actor identity, behavior trait, spawn blueprint and per-message context.

pub mod context;
pub mod pid;
pub mod props;
pub mod traits;

pub use context::Context;
pub use pid::{CorrelationId, Pid};
pub use props::Props;
pub use traits::Actor;
