//! The unit of work moved through the delivery queues.

use std::{
    fmt::{self, Display},
    time::SystemTime,
};

use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::{Domain, address::domain_of, binding::DelayedBinding, internal};

/// A delivery failure whose text began with a numeric status code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailError {
    /// The full error text as reported by the remote exchanger.
    pub message: String,

    /// The leading status code of [`Self::message`].
    pub code: i64,
}

impl MailError {
    #[must_use]
    pub fn new(message: impl Into<String>, code: i64) -> Self {
        Self {
            message: message.into(),
            code,
        }
    }

    /// `true` for 4xx codes, which the remote end considers worth retrying.
    #[must_use]
    pub const fn is_temporary(&self) -> bool {
        self.code >= 400 && self.code < 500
    }

    /// `true` for 5xx codes.
    #[must_use]
    pub const fn is_permanent(&self) -> bool {
        self.code >= 500 && self.code < 600
    }
}

impl Display for MailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// An outbound message and its retry state.
///
/// The serialised form is what the queue backend stores: the envelope,
/// recipient and body, the current [`DelayedBinding`] and the last classified
/// error. The identifier, creation time and hostname tags are local
/// diagnostics and are rebuilt by [`MailMessage::init`] whenever a message is
/// taken off a queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailMessage {
    #[serde(skip)]
    id: Ulid,

    envelope: String,
    recipient: String,
    body: String,

    #[serde(skip)]
    hostname_from: Option<Domain>,
    #[serde(skip)]
    hostname_to: Option<Domain>,

    #[serde(skip)]
    created_at: Option<SystemTime>,

    #[serde(default, rename = "bindingType")]
    binding: DelayedBinding,

    #[serde(default)]
    error: Option<MailError>,
}

impl MailMessage {
    /// Create and initialise a new message.
    #[must_use]
    pub fn new(
        envelope: impl Into<String>,
        recipient: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        let mut message = Self {
            id: Ulid::nil(),
            envelope: envelope.into(),
            recipient: recipient.into(),
            body: body.into(),
            hostname_from: None,
            hostname_to: None,
            created_at: None,
            binding: DelayedBinding::Unknown,
            error: None,
        };
        message.init();
        message
    }

    /// Assign a fresh identifier and creation time, and derive the hostname
    /// tags from the envelope and recipient.
    ///
    /// A message deserialised from a queue has none of these and must be
    /// initialised once before it is handed to a worker. Calling this on an
    /// already initialised message re-initialises it: the identifier and
    /// creation time are replaced.
    ///
    /// An address that fails to parse leaves its hostname unset; it never
    /// fails the initialisation.
    pub fn init(&mut self) {
        let previous = self.is_initialized().then_some(self.id);

        self.id = Ulid::new();
        self.created_at = Some(SystemTime::now());
        self.hostname_from = domain_of(&self.envelope).ok();
        self.hostname_to = domain_of(&self.recipient).ok();

        if let Some(previous) = previous {
            internal!("Re-initialised message {previous} as {}", self.id);
        }
    }

    /// `true` once [`Self::init`] has run.
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.created_at.is_some()
    }

    #[must_use]
    pub const fn id(&self) -> Ulid {
        self.id
    }

    #[must_use]
    pub fn envelope(&self) -> &str {
        &self.envelope
    }

    #[must_use]
    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    #[must_use]
    pub const fn hostname_from(&self) -> Option<&Domain> {
        self.hostname_from.as_ref()
    }

    #[must_use]
    pub const fn hostname_to(&self) -> Option<&Domain> {
        self.hostname_to.as_ref()
    }

    #[must_use]
    pub const fn created_at(&self) -> Option<SystemTime> {
        self.created_at
    }

    #[must_use]
    pub const fn binding(&self) -> DelayedBinding {
        self.binding
    }

    #[must_use]
    pub const fn error(&self) -> Option<&MailError> {
        self.error.as_ref()
    }

    /// Record the classified outcome of the latest attempt. Only the most
    /// recent attempt counts, so `None` clears an earlier classification.
    pub fn set_error(&mut self, error: Option<MailError>) {
        self.error = error;
    }

    /// Move one rung up the backoff ladder.
    ///
    /// Returns the new binding, or `None` if the message is already at
    /// [`DelayedBinding::NotSend`], in which case it is left there.
    pub fn advance_binding(&mut self) -> Option<DelayedBinding> {
        let next = self.binding.successor()?;
        self.binding = next;
        Some(next)
    }
}
