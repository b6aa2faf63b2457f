//! Classification of raw delivery errors.
//!
//! Remote exchangers report failures as text that usually starts with a
//! numeric reply code (`550 mailbox unavailable`). Only that leading token is
//! inspected: the text is split on single spaces, the first piece is trimmed
//! and parsed as an integer. Anything else, including bracketed or enhanced
//! status codes such as `[550]` or `550-5.1.1`, is left unclassified.
//! Deciding what a code means is left to whoever consumes the result.

use postq_common::MailError;

/// Outcome of inspecting a raw error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification<'a> {
    /// The text began with a numeric code.
    Classified { code: i64, text: &'a str },

    /// No leading code could be found.
    Unclassified { text: &'a str },
}

impl Classification<'_> {
    #[must_use]
    pub const fn code(&self) -> Option<i64> {
        match self {
            Self::Classified { code, .. } => Some(*code),
            Self::Unclassified { .. } => None,
        }
    }

    #[must_use]
    pub const fn text(&self) -> &str {
        match self {
            Self::Classified { text, .. } | Self::Unclassified { text } => *text,
        }
    }

    /// The error to record on the message, if any.
    #[must_use]
    pub fn into_mail_error(self) -> Option<MailError> {
        match self {
            Self::Classified { code, text } => Some(MailError::new(text, code)),
            Self::Unclassified { .. } => None,
        }
    }
}

/// Classify the raw text of a failed delivery attempt.
///
/// ```
/// use postq_delivery::classify::{Classification, classify};
///
/// assert_eq!(
///     classify("550 mailbox unavailable"),
///     Classification::Classified { code: 550, text: "550 mailbox unavailable" }
/// );
/// assert_eq!(
///     classify("connection reset"),
///     Classification::Unclassified { text: "connection reset" }
/// );
/// ```
#[must_use]
pub fn classify(text: &str) -> Classification<'_> {
    let leading = text.split(' ').next().unwrap_or_default();

    match leading.trim().parse::<i64>() {
        Ok(code) => Classification::Classified { code, text },
        Err(_) => Classification::Unclassified { text },
    }
}
