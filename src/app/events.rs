//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them.

use crate::control::relay::{Output, ReleaseReason, RelayState};
use crate::error::ActuatorError;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The service has started; both outputs were driven de-energized.
    Started,

    /// A relay output was energized (the other one released first).
    RelayEnergized(Output),

    /// Both outputs were released.
    RelayReleased(ReleaseReason),

    /// The classification skip factor changed.
    SkipChanged { from: u32, to: u32 },

    /// A relay write failed; the logical state will be re-applied.
    OutputFault(ActuatorError),

    /// Periodic snapshot, published with each FPS estimate.
    Telemetry(TelemetryData),

    /// Final statistics after the forced shutdown release.
    Stopped(TelemetryData),
}

/// A point-in-time telemetry snapshot suitable for logging or transmission.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryData {
    /// Frames seen since start.
    pub frames: u64,
    /// Frames that went through the classifier.
    pub processed_frames: u64,
    pub skip_n: u32,
    pub fps: f32,
    pub relay: RelayState,
}
