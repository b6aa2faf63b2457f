//! The handoff between the code that dispatches a delivery attempt and the
//! worker that performs it.
//!
//! The dispatcher creates a [`SendEvent`] together with a [`PendingSend`],
//! hands the event to a worker and waits on the pending half. The worker
//! attaches its session, makes the attempt and publishes exactly one
//! [`Returned`] verdict through [`crate::return_mail`] or
//! [`crate::complete_mail`]. Both halves are consumed by use, so a verdict
//! can be neither published nor received twice.

use postq_common::MailMessage;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use ulid::Ulid;

use crate::{error::DeliveryError, session::Session};

/// The verdict published for a delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SendEventResult {
    /// The message was accepted by the remote exchanger.
    Success,

    /// A transient failure: the message moves one rung up the backoff ladder.
    Delay,

    /// A classified failure: the message leaves the ladder for the error path.
    Error,
}

/// A verdict together with the message it concerns. Ownership of the
/// message passes back to the dispatcher with it.
#[derive(Debug)]
pub struct Returned {
    pub result: SendEventResult,
    pub message: MailMessage,
}

/// A single delivery attempt, owned by the worker performing it.
pub struct SendEvent<'a> {
    pub(crate) message: MailMessage,
    pub(crate) session: Option<&'a mut dyn Session>,
    pub(crate) result: oneshot::Sender<Returned>,
}

impl SendEvent<'static> {
    /// Create an event for `message` and the handle on which its verdict
    /// will arrive.
    #[must_use]
    pub fn new(message: MailMessage) -> (Self, PendingSend) {
        let (result, receiver) = oneshot::channel();
        let pending = PendingSend {
            id: message.id(),
            receiver,
        };

        (
            Self {
                message,
                session: None,
                result,
            },
            pending,
        )
    }
}

impl SendEvent<'_> {
    /// Attach the session the attempt runs on. It will be reset if the
    /// attempt fails.
    #[must_use]
    pub fn with_session<'s>(self, session: &'s mut dyn Session) -> SendEvent<'s> {
        SendEvent {
            message: self.message,
            session: Some(session),
            result: self.result,
        }
    }

    #[must_use]
    pub const fn message(&self) -> &MailMessage {
        &self.message
    }

    #[must_use]
    pub const fn has_session(&self) -> bool {
        self.session.is_some()
    }
}

impl std::fmt::Debug for SendEvent<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SendEvent")
            .field("message", &self.message.id())
            .field("session", &self.session.is_some())
            .finish_non_exhaustive()
    }
}

/// The dispatcher's side of a [`SendEvent`].
#[derive(Debug)]
pub struct PendingSend {
    id: Ulid,
    receiver: oneshot::Receiver<Returned>,
}

impl PendingSend {
    /// Identifier of the message this verdict is for.
    #[must_use]
    pub const fn id(&self) -> Ulid {
        self.id
    }

    /// Wait for the verdict.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::Abandoned`] if the event was dropped without
    /// a verdict being published.
    pub async fn wait(self) -> Result<Returned, DeliveryError> {
        self.receiver
            .await
            .map_err(|_| DeliveryError::Abandoned(self.id))
    }

    /// Block the current thread until the verdict arrives. For dispatchers
    /// running outside an async runtime; panics if called within one.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::Abandoned`] if the event was dropped without
    /// a verdict being published.
    pub fn blocking_wait(self) -> Result<Returned, DeliveryError> {
        self.receiver
            .blocking_recv()
            .map_err(|_| DeliveryError::Abandoned(self.id))
    }
}
