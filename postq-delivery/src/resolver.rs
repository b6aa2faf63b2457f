//! Turning the outcome of a delivery attempt into a verdict.

use std::fmt::Display;

use postq_common::{MailMessage, delivery, internal};
use tokio::sync::oneshot;

use crate::{
    classify::{Classification, classify},
    event::{Returned, SendEvent, SendEventResult},
};

/// Return a message after a failed delivery attempt.
///
/// `err` is the raw failure, or `None` when the attempt failed without one
/// (for example the connection was already closed). The steps are:
///
/// 1. The failure is classified and the result recorded on the message. A
///    leading status code yields a [`postq_common::MailError`], anything
///    else clears the message's error.
/// 2. The session, if the event carries one, is reset. This happens whatever
///    the classification was.
/// 3. [`SendEventResult::Error`] is published if the message now carries an
///    error, and [`SendEventResult::Delay`] otherwise.
///
/// This never fails. If the dispatcher has stopped waiting, the verdict and
/// message are dropped with a warning.
#[tracing::instrument(level = "debug", skip_all, fields(message_id = %event.message.id()))]
pub fn return_mail(event: SendEvent<'_>, err: Option<&dyn Display>) {
    let SendEvent {
        mut message,
        session,
        result,
    } = event;

    let error = err.and_then(|err| {
        let text = err.to_string();
        let classification = classify(&text);

        match classification {
            Classification::Classified { code, .. } => {
                delivery!("Attempt failed with status {code}: {text}");
            }
            Classification::Unclassified { .. } => {
                delivery!("Attempt failed without a status code: {text}");
            }
        }

        classification.into_mail_error()
    });
    message.set_error(error);

    if let Some(session) = session {
        session.reset();
        internal!("Reset session after failed attempt");
    }

    let verdict = if message.error().is_some() {
        SendEventResult::Error
    } else {
        SendEventResult::Delay
    };

    publish(result, verdict, message);
}

/// Report a successful delivery attempt. The session is left as is, ready
/// for the next message.
#[tracing::instrument(level = "debug", skip_all, fields(message_id = %event.message.id()))]
pub fn complete_mail(event: SendEvent<'_>) {
    publish(event.result, SendEventResult::Success, event.message);
}

fn publish(result: oneshot::Sender<Returned>, verdict: SendEventResult, message: MailMessage) {
    internal!("Publishing {verdict:?}");

    if result
        .send(Returned {
            result: verdict,
            message,
        })
        .is_err()
    {
        tracing::warn!(?verdict, "Dispatcher stopped waiting before the verdict was published");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use postq_common::{DelayedBinding, MailError};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        error::DeliveryError,
        session::{CommandSequence, Phase, Session},
    };

    #[derive(Default)]
    struct CountingSession {
        resets: usize,
    }

    impl Session for CountingSession {
        fn reset(&mut self) {
            self.resets += 1;
        }
    }

    fn message() -> MailMessage {
        MailMessage::new("sender@example.com", "rcpt@example.org", "Subject: test\r\n\r\nbody")
    }

    #[test]
    fn test_classified_failure_is_a_hard_error() {
        let (event, pending) = SendEvent::new(message());
        return_mail(event, Some(&"421 try again later"));

        let returned = pending.blocking_wait().unwrap();
        assert_eq!(returned.result, SendEventResult::Error);
        assert_eq!(
            returned.message.error(),
            Some(&MailError::new("421 try again later", 421))
        );
        assert_eq!(returned.message.binding(), DelayedBinding::Unknown);
    }

    #[test]
    fn test_unclassified_failure_is_delayed() {
        let (event, pending) = SendEvent::new(message());
        return_mail(event, Some(&"timeout"));

        let returned = pending.blocking_wait().unwrap();
        assert_eq!(returned.result, SendEventResult::Delay);
        assert_eq!(returned.message.error(), None);
    }

    #[test]
    fn test_missing_error_is_delayed() {
        let (event, pending) = SendEvent::new(message());
        return_mail(event, None);

        assert_eq!(
            pending.blocking_wait().unwrap().result,
            SendEventResult::Delay
        );
    }

    #[test]
    fn test_accepts_error_values() {
        let err = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "connection reset");
        let (event, pending) = SendEvent::new(message());
        return_mail(event, Some(&err));

        assert_eq!(
            pending.blocking_wait().unwrap().result,
            SendEventResult::Delay
        );
    }

    #[test]
    fn test_latest_attempt_replaces_earlier_error() {
        let mut message = message();
        message.set_error(Some(MailError::new("550 rejected", 550)));

        let (event, pending) = SendEvent::new(message);
        return_mail(event, Some(&"452 mailbox full"));
        let returned = pending.blocking_wait().unwrap();
        assert_eq!(returned.message.error().map(|err| err.code), Some(452));

        let (event, pending) = SendEvent::new(returned.message);
        return_mail(event, Some(&"connection refused"));
        let returned = pending.blocking_wait().unwrap();
        assert_eq!(returned.result, SendEventResult::Delay);
        assert_eq!(returned.message.error(), None);
    }

    #[test]
    fn test_session_reset_once_per_failure() {
        let mut session = CountingSession::default();

        for (n, err) in ["550 rejected", "timeout", ""].into_iter().enumerate() {
            let (event, pending) = SendEvent::new(message());
            return_mail(event.with_session(&mut session), Some(&err));
            pending.blocking_wait().unwrap();
            assert_eq!(session.resets, n + 1);
        }

        let (event, pending) = SendEvent::new(message());
        return_mail(event.with_session(&mut session), None);
        pending.blocking_wait().unwrap();
        assert_eq!(session.resets, 4);
    }

    #[test]
    fn test_session_rewound_for_next_message() {
        let mut session = CommandSequence::new();
        session.advance(Phase::Ehlo).unwrap();
        session.advance(Phase::MailFrom).unwrap();
        session.advance(Phase::RcptTo).unwrap();

        let (event, pending) = SendEvent::new(message());
        return_mail(event.with_session(&mut session), Some(&"554 transaction failed"));
        pending.blocking_wait().unwrap();

        assert_eq!(session.phase(), Phase::Ehlo);
        assert!(session.advance(Phase::MailFrom).is_ok());
    }

    #[test]
    fn test_success_leaves_session_alone() {
        let mut session = CountingSession::default();
        let (event, pending) = SendEvent::new(message());
        complete_mail(event.with_session(&mut session));

        assert_eq!(
            pending.blocking_wait().unwrap().result,
            SendEventResult::Success
        );
        assert_eq!(session.resets, 0);
    }

    #[test]
    fn test_dispatcher_gone() {
        let mut session = CountingSession::default();
        let (event, pending) = SendEvent::new(message());
        drop(pending);

        return_mail(event.with_session(&mut session), Some(&"550 rejected"));
        assert_eq!(session.resets, 1);
    }

    #[test]
    fn test_dropped_event_is_abandoned() {
        let message = message();
        let id = message.id();
        let (event, pending) = SendEvent::new(message);
        drop(event);

        assert_eq!(
            pending.blocking_wait().unwrap_err(),
            DeliveryError::Abandoned(id)
        );
    }
}
