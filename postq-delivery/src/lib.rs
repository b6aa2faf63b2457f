//! Retry and requeue core of the postq outbound delivery queue
//!
//! This crate decides what happens to a message after a delivery attempt:
//! - Classifying raw protocol failures by their leading status code
//! - Resetting the worker's session so it can carry the next message
//! - Publishing exactly one verdict back to the dispatcher
//! - Routing the returned message up the backoff ladder, to the error
//!   report, or off the end of the ladder

pub mod classify;
mod error;
mod event;
pub mod queue;
mod resolver;
pub mod session;

pub use error::DeliveryError;
pub use event::{PendingSend, Returned, SendEvent, SendEventResult};
pub use postq_common::{DelayedBinding, MailError, MailMessage};
pub use queue::{DelayedQueues, Route};
pub use resolver::{complete_mail, return_mail};
pub use session::{CommandSequence, Phase, Session};
