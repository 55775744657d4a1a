//! Monotonic time base shared by the relay and rate controllers.
//!
//! [`Timestamp`] is a nanosecond count since an arbitrary epoch (boot on
//! ESP-IDF, adapter construction on host).  It only ever moves forward;
//! callers that observe it moving backwards report a
//! [`PreconditionError::NonMonotonicClock`](crate::error::PreconditionError).

use core::fmt;
use core::ops::Add;
use core::time::Duration;

const NANOS_PER_MICRO: u64 = 1_000;
const NANOS_PER_MILLI: u64 = 1_000_000;
const NANOS_PER_SEC: f64 = 1_000_000_000.0;

/// A point on the monotonic clock, nanosecond resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    nanos: u64,
}

impl Timestamp {
    pub const ZERO: Self = Self { nanos: 0 };

    pub const fn from_nanos(nanos: u64) -> Self {
        Self { nanos }
    }

    pub const fn from_micros(micros: u64) -> Self {
        Self {
            nanos: micros.saturating_mul(NANOS_PER_MICRO),
        }
    }

    pub const fn from_millis(millis: u64) -> Self {
        Self {
            nanos: millis.saturating_mul(NANOS_PER_MILLI),
        }
    }

    /// Build from fractional seconds.  Negative or non-finite input maps to
    /// [`Timestamp::ZERO`].
    pub fn from_secs_f32(secs: f32) -> Self {
        if secs.is_finite() && secs > 0.0 {
            Self {
                nanos: (f64::from(secs) * NANOS_PER_SEC).round() as u64,
            }
        } else {
            Self::ZERO
        }
    }

    pub const fn as_nanos(self) -> u64 {
        self.nanos
    }

    pub const fn as_micros(self) -> u64 {
        self.nanos / NANOS_PER_MICRO
    }

    pub fn as_secs_f32(self) -> f32 {
        (self.nanos as f64 / NANOS_PER_SEC) as f32
    }

    /// Time elapsed since `earlier`, or `None` if `earlier` is in the future.
    pub fn checked_duration_since(self, earlier: Self) -> Option<Duration> {
        self.nanos
            .checked_sub(earlier.nanos)
            .map(Duration::from_nanos)
    }

    /// Time elapsed since `earlier`, zero if `earlier` is in the future.
    pub fn saturating_duration_since(self, earlier: Self) -> Duration {
        self.checked_duration_since(earlier).unwrap_or(Duration::ZERO)
    }
}

impl Add<Duration> for Timestamp {
    type Output = Self;

    /// Saturates at the end of the clock range.
    fn add(self, rhs: Duration) -> Self {
        let rhs = u64::try_from(rhs.as_nanos()).unwrap_or(u64::MAX);
        Self {
            nanos: self.nanos.saturating_add(rhs),
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s", self.nanos as f64 / NANOS_PER_SEC)
    }
}
