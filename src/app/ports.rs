//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (clock, relay outputs, verdict source, event sink)
//! implement these traits.  The [`AppService`](super::service::AppService)
//! consumes them via generics, so the controllers never touch hardware
//! and run against synthetic clocks in tests.

use core::time::Duration;

use crate::control::relay::{ClassificationEvent, Level, Output};
use crate::error::{ActuatorError, ClassifierError};
use crate::time::Timestamp;

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic time source shared by both controllers.
pub trait Clock {
    fn now(&self) -> Timestamp;

    /// Smallest step between two distinct readings.
    fn resolution(&self) -> Duration {
        Duration::from_nanos(1)
    }
}

// ───────────────────────────────────────────────────────────────
// Output port (driven adapter: domain → relays)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the two relay channels.
///
/// The domain only ever speaks in logical [`Level`]s.  Implementations own
/// the wiring polarity and translate `Energized` to the physical level the
/// relay module expects.
pub trait OutputSink {
    fn set_output(&mut self, output: Output, level: Level) -> Result<(), ActuatorError>;
}

// ───────────────────────────────────────────────────────────────
// Classifier port (driven adapter: vision pipeline → domain)
// ───────────────────────────────────────────────────────────────

/// The expensive per-frame classification step.
///
/// Called only for frames the rate controller selects.  `Ok(None)` means a
/// face was seen but no definite verdict could be drawn from it.
pub trait Classifier {
    fn classify(&mut self) -> Result<Option<ClassificationEvent>, ClassifierError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
