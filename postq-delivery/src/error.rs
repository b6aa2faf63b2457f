//! Error types for the delivery core.
//!
//! Failed delivery attempts are not errors here: they are classified and
//! turned into a verdict. These cover misuse of the surrounding contracts.

use thiserror::Error;
use ulid::Ulid;

use crate::session::Phase;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// The send event was dropped without a verdict being published.
    #[error("Send event for message {0} was dropped without a verdict")]
    Abandoned(Ulid),

    /// A command was issued out of order on a session.
    #[error("{command} is not valid after {phase}")]
    OutOfSequence { phase: Phase, command: Phase },
}

impl DeliveryError {
    /// `true` if the dispatcher lost track of the message.
    #[must_use]
    pub const fn is_abandoned(&self) -> bool {
        matches!(self, Self::Abandoned(_))
    }
}
