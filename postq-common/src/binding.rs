//! The backoff ladder of delayed queues.
//!
//! A message that fails transiently climbs this ladder one rung per failure,
//! waiting longer each time. [`DelayedBinding::Unknown`] is only ever the
//! starting point of a fresh message and [`DelayedBinding::NotSend`] is the
//! end of the line: nothing there is attempted again.
//!
//! Bindings are persisted as their ladder index (`0` for `Unknown` through
//! `13` for `NotSend`) so that queue backends and report consumers agree on
//! the representation.

use std::{
    fmt::{self, Display},
    time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::error::UnknownBinding;

#[repr(u8)]
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(into = "u8", try_from = "u8")]
pub enum DelayedBinding {
    #[default]
    Unknown,
    Second,
    ThirtySecond,
    Minute,
    FiveMinutes,
    TenMinutes,
    TwentyMinutes,
    ThirtyMinutes,
    FortyMinutes,
    FiftyMinutes,
    Hour,
    SixHours,
    Day,
    NotSend,
}

impl DelayedBinding {
    /// Every tier, in ladder order.
    pub const ALL: [Self; 14] = [
        Self::Unknown,
        Self::Second,
        Self::ThirtySecond,
        Self::Minute,
        Self::FiveMinutes,
        Self::TenMinutes,
        Self::TwentyMinutes,
        Self::ThirtyMinutes,
        Self::FortyMinutes,
        Self::FiftyMinutes,
        Self::Hour,
        Self::SixHours,
        Self::Day,
        Self::NotSend,
    ];

    /// The next rung of the ladder, or `None` from the terminal tier.
    ///
    /// ```
    /// use postq_common::DelayedBinding;
    ///
    /// assert_eq!(DelayedBinding::Unknown.successor(), Some(DelayedBinding::Second));
    /// assert_eq!(DelayedBinding::Day.successor(), Some(DelayedBinding::NotSend));
    /// assert_eq!(DelayedBinding::NotSend.successor(), None);
    /// ```
    #[must_use]
    pub const fn successor(self) -> Option<Self> {
        Some(match self {
            Self::Unknown => Self::Second,
            Self::Second => Self::ThirtySecond,
            Self::ThirtySecond => Self::Minute,
            Self::Minute => Self::FiveMinutes,
            Self::FiveMinutes => Self::TenMinutes,
            Self::TenMinutes => Self::TwentyMinutes,
            Self::TwentyMinutes => Self::ThirtyMinutes,
            Self::ThirtyMinutes => Self::FortyMinutes,
            Self::FortyMinutes => Self::FiftyMinutes,
            Self::FiftyMinutes => Self::Hour,
            Self::Hour => Self::SixHours,
            Self::SixHours => Self::Day,
            Self::Day => Self::NotSend,
            Self::NotSend => return None,
        })
    }

    /// How long a message waits in this tier before it is attempted again.
    ///
    /// `Unknown` and `NotSend` have no delayed queue.
    #[must_use]
    pub const fn delay(self) -> Option<Duration> {
        const MINUTE: u64 = 60;
        const HOUR: u64 = 60 * MINUTE;

        let secs = match self {
            Self::Unknown | Self::NotSend => return None,
            Self::Second => 1,
            Self::ThirtySecond => 30,
            Self::Minute => MINUTE,
            Self::FiveMinutes => 5 * MINUTE,
            Self::TenMinutes => 10 * MINUTE,
            Self::TwentyMinutes => 20 * MINUTE,
            Self::ThirtyMinutes => 30 * MINUTE,
            Self::FortyMinutes => 40 * MINUTE,
            Self::FiftyMinutes => 50 * MINUTE,
            Self::Hour => HOUR,
            Self::SixHours => 6 * HOUR,
            Self::Day => 24 * HOUR,
        };

        Some(Duration::from_secs(secs))
    }

    /// Name of the delayed queue backing this tier.
    #[must_use]
    pub const fn queue_name(self) -> Option<&'static str> {
        Some(match self {
            Self::Unknown | Self::NotSend => return None,
            Self::Second => "postq.delay.1s",
            Self::ThirtySecond => "postq.delay.30s",
            Self::Minute => "postq.delay.1m",
            Self::FiveMinutes => "postq.delay.5m",
            Self::TenMinutes => "postq.delay.10m",
            Self::TwentyMinutes => "postq.delay.20m",
            Self::ThirtyMinutes => "postq.delay.30m",
            Self::FortyMinutes => "postq.delay.40m",
            Self::FiftyMinutes => "postq.delay.50m",
            Self::Hour => "postq.delay.1h",
            Self::SixHours => "postq.delay.6h",
            Self::Day => "postq.delay.1d",
        })
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::NotSend)
    }
}

impl Display for DelayedBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unknown => "unknown",
            Self::Second => "second",
            Self::ThirtySecond => "thirty seconds",
            Self::Minute => "minute",
            Self::FiveMinutes => "five minutes",
            Self::TenMinutes => "ten minutes",
            Self::TwentyMinutes => "twenty minutes",
            Self::ThirtyMinutes => "thirty minutes",
            Self::FortyMinutes => "forty minutes",
            Self::FiftyMinutes => "fifty minutes",
            Self::Hour => "hour",
            Self::SixHours => "six hours",
            Self::Day => "day",
            Self::NotSend => "not send",
        })
    }
}

impl From<DelayedBinding> for u8 {
    fn from(binding: DelayedBinding) -> Self {
        binding as Self
    }
}

impl TryFrom<u8> for DelayedBinding {
    type Error = UnknownBinding;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(usize::from(index))
            .copied()
            .ok_or(UnknownBinding(index))
    }
}
