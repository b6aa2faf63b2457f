//! The protocol session a worker holds open against a remote exchanger.
//!
//! Sessions are reused across messages. After a failed attempt the command
//! sequence has to be rewound before the next message goes out, otherwise
//! the half-finished transaction bleeds into it.

use std::fmt::{Display, Formatter};

use crate::error::DeliveryError;

/// A reusable protocol session.
pub trait Session: Send {
    /// Discard any partially completed transaction so the session can carry
    /// the next message.
    fn reset(&mut self);
}

#[derive(PartialEq, PartialOrd, Eq, Hash, Debug, Clone, Copy)]
pub enum Phase {
    Connect,
    Ehlo,
    MailFrom,
    RcptTo,
    Data,
    Quit,
}

impl Display for Phase {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        fmt.write_str(match self {
            Self::Connect => "Connect",
            Self::Ehlo => "EHLO",
            Self::MailFrom => "MAIL",
            Self::RcptTo => "RCPT",
            Self::Data => "DATA",
            Self::Quit => "QUIT",
        })
    }
}

/// Tracks where an outbound session is in the SMTP command sequence.
#[derive(Debug, Clone)]
pub struct CommandSequence {
    phase: Phase,
    resets: u64,
}

impl Default for CommandSequence {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandSequence {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: Phase::Connect,
            resets: 0,
        }
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Number of times this session has been reset.
    #[must_use]
    pub const fn resets(&self) -> u64 {
        self.resets
    }

    /// Record that `command` was sent.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::OutOfSequence`] if `command` cannot follow the
    /// current phase. The phase is left unchanged.
    pub fn advance(&mut self, command: Phase) -> Result<(), DeliveryError> {
        let valid = self.phase != Phase::Quit
            && matches!(
                (self.phase, command),
                (_, Phase::Quit)
                    | (Phase::Connect, Phase::Ehlo)
                    | (Phase::Ehlo | Phase::Data, Phase::MailFrom)
                    | (Phase::MailFrom | Phase::RcptTo, Phase::RcptTo)
                    | (Phase::RcptTo, Phase::Data)
            );

        if valid {
            self.phase = command;
            Ok(())
        } else {
            Err(DeliveryError::OutOfSequence {
                phase: self.phase,
                command,
            })
        }
    }
}

impl Session for CommandSequence {
    /// Equivalent of `RSET`: back to just after the greeting, or to the start
    /// if the session never got that far. A closed session stays closed.
    fn reset(&mut self) {
        self.phase = match self.phase {
            Phase::Connect => Phase::Connect,
            Phase::Quit => Phase::Quit,
            Phase::Ehlo | Phase::MailFrom | Phase::RcptTo | Phase::Data => Phase::Ehlo,
        };
        self.resets += 1;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn transaction(session: &mut CommandSequence) -> Result<(), DeliveryError> {
        session.advance(Phase::MailFrom)?;
        session.advance(Phase::RcptTo)?;
        session.advance(Phase::RcptTo)?;
        session.advance(Phase::Data)
    }

    #[test]
    fn test_full_sequence() {
        let mut session = CommandSequence::new();
        session.advance(Phase::Ehlo).unwrap();
        transaction(&mut session).unwrap();

        // The next message on the same connection starts with MAIL again
        transaction(&mut session).unwrap();
        session.advance(Phase::Quit).unwrap();
        assert_eq!(session.phase(), Phase::Quit);
    }

    #[test]
    fn test_out_of_sequence() {
        let mut session = CommandSequence::new();
        assert_eq!(
            session.advance(Phase::MailFrom),
            Err(DeliveryError::OutOfSequence {
                phase: Phase::Connect,
                command: Phase::MailFrom,
            })
        );
        assert_eq!(session.phase(), Phase::Connect);

        session.advance(Phase::Ehlo).unwrap();
        session.advance(Phase::MailFrom).unwrap();
        assert!(session.advance(Phase::Data).is_err());
    }

    #[test]
    fn test_reset_mid_transaction() {
        let mut session = CommandSequence::new();
        session.advance(Phase::Ehlo).unwrap();
        session.advance(Phase::MailFrom).unwrap();
        session.advance(Phase::RcptTo).unwrap();

        session.reset();
        assert_eq!(session.phase(), Phase::Ehlo);
        assert_eq!(session.resets(), 1);

        // Without the reset this would be rejected after RCPT
        transaction(&mut session).unwrap();
    }

    #[test]
    fn test_reset_before_greeting_and_after_quit() {
        let mut session = CommandSequence::new();
        session.reset();
        assert_eq!(session.phase(), Phase::Connect);

        session.advance(Phase::Quit).unwrap();
        session.reset();
        assert_eq!(session.phase(), Phase::Quit);
        assert!(session.advance(Phase::Ehlo).is_err());
        assert_eq!(session.resets(), 2);
    }
}
