//! Unified error types for the MoodRelay firmware.
//!
//! A single `Error` enum that every subsystem converts into, so the frame
//! loop handles failures uniformly.  All variants are `Copy` so they can be
//! passed through the service and logged without allocation.

use core::fmt;

use embedded_hal::digital::ErrorKind;

use crate::control::relay::Output;
use crate::time::Timestamp;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The caller broke an input contract (clock, duration, pin id).
    Precondition(PreconditionError),
    /// A relay output could not be written.
    Actuator(ActuatorError),
    /// The external classifier failed to deliver a verdict.
    Classifier(ClassifierError),
    /// Configuration is invalid or could not be parsed.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Precondition(e) => write!(f, "precondition: {e}"),
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::Classifier(e) => write!(f, "classifier: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Precondition violations
// ---------------------------------------------------------------------------

/// Inputs the controllers refuse to correct silently.  A clamped clock or
/// duration would hide a failing sensor and poison the hold timer or the
/// rolling average.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreconditionError {
    /// `now` is earlier than a timestamp already observed.
    NonMonotonicClock { last: Timestamp, now: Timestamp },
    /// A processing duration of zero was recorded.
    NonPositiveDuration,
    /// GPIO number outside the range the target supports.
    UnsupportedPin(i32),
}

impl fmt::Display for PreconditionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonMonotonicClock { last, now } => {
                write!(f, "clock went backwards ({last} -> {now})")
            }
            Self::NonPositiveDuration => write!(f, "processing duration must be positive"),
            Self::UnsupportedPin(pin) => write!(f, "unsupported GPIO {pin}"),
        }
    }
}

impl From<PreconditionError> for Error {
    fn from(e: PreconditionError) -> Self {
        Self::Precondition(e)
    }
}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// Writing the physical level of `output` failed.
    OutputWriteFailed { output: Output, kind: ErrorKind },
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutputWriteFailed { output, kind } => {
                write!(f, "{output} output write failed: {kind}")
            }
        }
    }
}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

// ---------------------------------------------------------------------------
// Classifier errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierError {
    /// The verdict source has closed; no further frames will be classified.
    SourceClosed,
    /// Reading from the verdict source failed.
    Io(std::io::ErrorKind),
    /// The verdict source produced something that is not a verdict.
    Malformed,
}

impl fmt::Display for ClassifierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceClosed => write!(f, "verdict source closed"),
            Self::Io(kind) => write!(f, "verdict source I/O: {kind}"),
            Self::Malformed => write!(f, "malformed verdict"),
        }
    }
}

impl From<ClassifierError> for Error {
    fn from(e: ClassifierError) -> Self {
        Self::Classifier(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Serialized config could not be parsed.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// A relay pin is not a usable output on this target.
    Pin(PreconditionError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::Pin(e) => write!(f, "{e}"),
        }
    }
}

impl core::error::Error for ConfigError {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
