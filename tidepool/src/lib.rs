//! # Tidepool
//!
//! An in-process request/response actor runtime with one-for-one
//! supervision.
//!
//! Actors are addressed by opaque [`actor::Pid`]s, own a private mailbox
//! and process one message at a time on a shared multi-threaded tokio
//! runtime. On top of fire-and-forget sends the runtime provides
//! correlated request/response with timeouts, supervised restart of
//! failed children and a dead-letter side channel for undeliverable
//! messages.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                     ActorSystem                         │
//! │   spawn / send / request / stop / dead_letters          │
//! ├──────────────┬──────────────────┬───────────────────────┤
//! │  registry    │   correlator     │   scheduler           │
//! │  pid→mailbox │   pending        │   processing passes   │
//! │              │   requests       │   on the tokio pool   │
//! ├──────────────┴──────────────────┴───────────────────────┤
//! │           mailbox (FIFO + execution token)              │
//! │           supervision (one-for-one restart)             │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use tidepool::prelude::*;
//!
//! struct Counter { count: u64 }
//!
//! #[async_trait]
//! impl Actor for Counter {
//!     async fn handle(&mut self, ctx: &mut Context, msg: DynMessage) -> Result<()> {
//!         if msg.downcast_ref::<Ping>().is_some() {
//!             self.count += 1;
//!             ctx.respond(Pong { count: self.count });
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let system = ActorSystem::new(SystemConfig::default());
//! let pid = system.spawn(Props::from_producer(|| Counter { count: 0 }));
//! let pong: Pong = system.request(pid, Ping, Duration::from_secs(1)).await?;
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]

pub mod actor;
pub mod error;
pub mod messaging;
pub mod prelude;
pub mod supervision;
pub mod system;

pub(crate) mod mailbox;
pub(crate) mod scheduler;
