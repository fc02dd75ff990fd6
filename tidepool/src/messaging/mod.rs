//! Message envelopes, request correlation and dead letters.

pub mod correlation;
pub mod envelope;

pub use envelope::{DeadLetter, DeadLetterReason, DynMessage};

pub(crate) use correlation::{Correlator, Reply};
pub(crate) use envelope::Envelope;
