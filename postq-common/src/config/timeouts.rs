//! Timeout budgets for each phase of an outbound delivery attempt.
//!
//! Values are configured in whole seconds. Any field left unset (or set to
//! zero) is filled in by [`Timeout::init`], which must run once after the
//! configuration is loaded and before any worker reads the profile. Once
//! initialised the profile is read-only and may be shared between workers
//! without synchronisation.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Per-phase timeout profile for delivery workers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeout {
    /// Pause between two attempts on the same connection.
    ///
    /// Default: 1 second
    #[serde(default)]
    pub sleep_secs: u64,

    /// How long a worker waits on an empty queue before polling again.
    ///
    /// Default: 30 seconds
    #[serde(default)]
    pub waiting_secs: u64,

    /// Timeout for establishing the connection to the remote exchanger.
    ///
    /// Default: 300 seconds (5 minutes)
    #[serde(default)]
    pub connection_secs: u64,

    /// Timeout for the greeting and EHLO/HELO exchange.
    ///
    /// Default: 300 seconds (5 minutes)
    #[serde(default)]
    pub hello_secs: u64,

    /// Timeout for MAIL FROM.
    ///
    /// Default: 300 seconds (5 minutes)
    #[serde(default)]
    pub mail_secs: u64,

    /// Timeout for RCPT TO.
    ///
    /// Default: 300 seconds (5 minutes)
    #[serde(default)]
    pub rcpt_secs: u64,

    /// Timeout for DATA and the message transfer.
    ///
    /// Default: 600 seconds (10 minutes)
    #[serde(default)]
    pub data_secs: u64,
}

impl Timeout {
    /// Fill every zero field with its default, leaving configured values
    /// untouched. Calling this again on an initialised profile is a no-op.
    pub const fn init(&mut self) {
        if self.sleep_secs == 0 {
            self.sleep_secs = defaults::sleep_secs();
        }
        if self.waiting_secs == 0 {
            self.waiting_secs = defaults::waiting_secs();
        }
        if self.connection_secs == 0 {
            self.connection_secs = defaults::connection_secs();
        }
        if self.hello_secs == 0 {
            self.hello_secs = defaults::hello_secs();
        }
        if self.mail_secs == 0 {
            self.mail_secs = defaults::mail_secs();
        }
        if self.rcpt_secs == 0 {
            self.rcpt_secs = defaults::rcpt_secs();
        }
        if self.data_secs == 0 {
            self.data_secs = defaults::data_secs();
        }
    }

    /// A profile with every field at its default.
    #[must_use]
    pub const fn initialized() -> Self {
        let mut timeout = Self {
            sleep_secs: 0,
            waiting_secs: 0,
            connection_secs: 0,
            hello_secs: 0,
            mail_secs: 0,
            rcpt_secs: 0,
            data_secs: 0,
        };
        timeout.init();
        timeout
    }

    /// `true` once every budget is non-zero.
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.sleep_secs != 0
            && self.waiting_secs != 0
            && self.connection_secs != 0
            && self.hello_secs != 0
            && self.mail_secs != 0
            && self.rcpt_secs != 0
            && self.data_secs != 0
    }

    #[must_use]
    pub const fn sleep(&self) -> Duration {
        Duration::from_secs(self.sleep_secs)
    }

    #[must_use]
    pub const fn waiting(&self) -> Duration {
        Duration::from_secs(self.waiting_secs)
    }

    #[must_use]
    pub const fn connection(&self) -> Duration {
        Duration::from_secs(self.connection_secs)
    }

    #[must_use]
    pub const fn hello(&self) -> Duration {
        Duration::from_secs(self.hello_secs)
    }

    #[must_use]
    pub const fn mail(&self) -> Duration {
        Duration::from_secs(self.mail_secs)
    }

    #[must_use]
    pub const fn rcpt(&self) -> Duration {
        Duration::from_secs(self.rcpt_secs)
    }

    #[must_use]
    pub const fn data(&self) -> Duration {
        Duration::from_secs(self.data_secs)
    }
}

mod defaults {
    pub const fn sleep_secs() -> u64 {
        1
    }
    pub const fn waiting_secs() -> u64 {
        30
    }
    pub const fn connection_secs() -> u64 {
        300 // 5 minutes
    }
    pub const fn hello_secs() -> u64 {
        300 // 5 minutes
    }
    pub const fn mail_secs() -> u64 {
        300 // 5 minutes
    }
    pub const fn rcpt_secs() -> u64 {
        300 // 5 minutes
    }
    pub const fn data_secs() -> u64 {
        600 // 10 minutes
    }
}
