//! Application service: the per-frame driving loop.
//!
//! [`AppService`] owns the relay hold controller and the adaptive rate
//! controller and runs them once per acquired frame.  All I/O flows
//! through port traits injected at call sites, making the entire loop
//! testable with mock adapters and a synthetic clock.
//!
//! ```text
//!   Classifier ──▶ ┌───────────────────────────┐ ──▶ EventSink
//!        Clock ──▶ │        AppService          │
//!   OutputSink ◀── │  ActuatorController · Rate │
//!                  └───────────────────────────┘
//! ```
//!
//! Per frame:
//! 1. Re-apply the relay state if the previous write failed.
//! 2. If the rate controller selects the frame: classify, time it, feed
//!    the verdict to the relay controller and the duration to the rate
//!    controller.
//! 3. Tick the relay controller so the hold timer can expire.

use core::time::Duration;

use log::{info, warn};

use crate::config::SystemConfig;
use crate::control::rate::AdaptiveRateController;
use crate::control::relay::{
    ActuatorController, ClassificationEvent, OutputCommand, ReleaseReason, RelayState,
};
use crate::error::{ActuatorError, Error, PreconditionError, Result};
use crate::time::Timestamp;

use super::events::{AppEvent, TelemetryData};
use super::ports::{Classifier, Clock, EventSink, OutputSink};

/// What happened during one [`AppService::process_frame`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    pub frame_index: u64,
    /// The frame went through the classifier.
    pub classified: bool,
    /// Verdict returned by the classifier, if any.
    pub verdict: Option<ClassificationEvent>,
}

/// The application service orchestrates both controllers.
pub struct AppService {
    relay: ActuatorController,
    rate: AdaptiveRateController,
    frame_index: u64,
    processed_frames: u64,
    /// A relay write failed; physical outputs may not match `relay.state()`.
    outputs_dirty: bool,
}

impl AppService {
    /// Construct the service.  `now` opens the first FPS window.
    ///
    /// Does **not** touch the outputs; call [`start`](Self::start) next.
    pub fn new(config: &SystemConfig, now: Timestamp) -> Self {
        Self {
            relay: ActuatorController::new(&config.relay),
            rate: AdaptiveRateController::new(&config.rate, now),
            frame_index: 0,
            processed_frames: 0,
            outputs_dirty: false,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Drive both outputs de-energized before the first frame.
    pub fn start(
        &mut self,
        hw: &mut impl OutputSink,
        sink: &mut impl EventSink,
    ) -> core::result::Result<(), ActuatorError> {
        let result = write_command(OutputCommand::Release(ReleaseReason::Resync), hw);
        if let Err(e) = result {
            warn!("Start: initial release failed: {}", e);
            self.outputs_dirty = true;
            sink.emit(&AppEvent::OutputFault(e));
        }
        sink.emit(&AppEvent::Started);
        info!(
            "AppService started (hold={:?}, skip={})",
            self.relay.hold_duration(),
            self.rate.current_skip()
        );
        result
    }

    /// Forced release on shutdown.  Best effort: every output gets a
    /// de-energize attempt and failures are only logged.
    pub fn shutdown(&mut self, hw: &mut impl OutputSink, sink: &mut impl EventSink) {
        let cmd = self.relay.force_release();
        for (output, level) in cmd.writes() {
            if let Err(e) = hw.set_output(output, level) {
                warn!("Shutdown: could not release {}: {}", output, e);
            }
        }
        self.outputs_dirty = false;
        sink.emit(&AppEvent::RelayReleased(ReleaseReason::Shutdown));

        let stats = self.build_telemetry();
        info!(
            "AppService stopped: {} frames, {} classified, fps={:.1}, skip={}",
            stats.frames, stats.processed_frames, stats.fps, stats.skip_n
        );
        sink.emit(&AppEvent::Stopped(stats));
    }

    // ── Per-frame orchestration ───────────────────────────────

    /// Run one frame of the control loop.
    ///
    /// Errors are collected and the rest of the frame still runs, so a
    /// failed classification, write or clock reading never stalls the hold
    /// timer; the first error is returned.  A failed classification feeds
    /// neither controller.
    pub fn process_frame(
        &mut self,
        classifier: &mut impl Classifier,
        clock: &impl Clock,
        hw: &mut impl OutputSink,
        sink: &mut impl EventSink,
    ) -> Result<FrameReport> {
        let frame_index = self.frame_index;
        self.frame_index += 1;
        let mut first_err: Option<Error> = None;

        // 1. Retry the physical state after a failed write.
        if self.outputs_dirty {
            let cmd = self.relay.resync_command();
            if let Err(e) = self.apply(cmd, hw, sink) {
                keep_first(&mut first_err, e);
            }
        }

        // 2. Classification, only on selected frames.
        let classified = self.rate.should_process(frame_index);
        let mut verdict = None;
        if classified {
            self.processed_frames += 1;
            let started = clock.now();
            let outcome = classifier.classify();
            let finished = clock.now();

            match outcome {
                Ok(v) => {
                    verdict = v;
                    if let Some(event) = verdict {
                        match self.relay.update(event, finished) {
                            Ok(cmd) => {
                                if let Err(e) = self.apply(cmd, hw, sink) {
                                    keep_first(&mut first_err, e);
                                }
                            }
                            Err(e) => keep_first(&mut first_err, e),
                        }
                    }
                    if let Err(e) = self.record_timing(started, finished, clock.resolution(), sink)
                    {
                        keep_first(&mut first_err, e);
                    }
                }
                // No verdict and no sample; the hold timer below still runs.
                Err(e) => keep_first(&mut first_err, e),
            }
        }

        // 3. Hold timer.
        match self.relay.tick(clock.now()) {
            Ok(cmd) => {
                if let Err(e) = self.apply(cmd, hw, sink) {
                    keep_first(&mut first_err, e);
                }
            }
            Err(e) => keep_first(&mut first_err, e),
        }

        match first_err {
            Some(e) => Err(e),
            None => Ok(FrameReport {
                frame_index,
                classified,
                verdict,
            }),
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn build_telemetry(&self) -> TelemetryData {
        TelemetryData {
            frames: self.frame_index,
            processed_frames: self.processed_frames,
            skip_n: self.rate.current_skip(),
            fps: self.rate.current_fps(),
            relay: self.relay.state(),
        }
    }

    pub fn relay_state(&self) -> RelayState {
        self.relay.state()
    }

    pub fn current_skip(&self) -> u32 {
        self.rate.current_skip()
    }

    pub fn current_fps(&self) -> f32 {
        self.rate.current_fps()
    }

    /// Frames seen since start.
    pub fn frame_count(&self) -> u64 {
        self.frame_index
    }

    /// `true` while a failed write is waiting to be re-applied.
    pub fn outputs_dirty(&self) -> bool {
        self.outputs_dirty
    }

    // ── Internal ──────────────────────────────────────────────

    fn record_timing(
        &mut self,
        started: Timestamp,
        finished: Timestamp,
        resolution: Duration,
        sink: &mut impl EventSink,
    ) -> core::result::Result<(), PreconditionError> {
        let elapsed = finished
            .checked_duration_since(started)
            .ok_or(PreconditionError::NonMonotonicClock {
                last: started,
                now: finished,
            })?;
        // Faster than the clock can resolve: count it as one tick.
        let elapsed = if elapsed.is_zero() {
            resolution.max(Duration::from_nanos(1))
        } else {
            elapsed
        };
        let update = self.rate.record_duration(elapsed, finished)?;
        if let Some(change) = update.skip {
            sink.emit(&AppEvent::SkipChanged {
                from: change.from,
                to: change.to,
            });
        }
        if update.fps.is_some() {
            sink.emit(&AppEvent::Telemetry(self.build_telemetry()));
        }
        Ok(())
    }

    /// Write `cmd` and track whether the outputs match the logical state.
    fn apply(
        &mut self,
        cmd: OutputCommand,
        hw: &mut impl OutputSink,
        sink: &mut impl EventSink,
    ) -> core::result::Result<(), ActuatorError> {
        if cmd == OutputCommand::NoChange {
            return Ok(());
        }
        match write_command(cmd, hw) {
            Ok(()) => {
                self.outputs_dirty = false;
                match cmd {
                    OutputCommand::Energize(output) => {
                        sink.emit(&AppEvent::RelayEnergized(output));
                    }
                    OutputCommand::Release(reason) => {
                        sink.emit(&AppEvent::RelayReleased(reason));
                    }
                    OutputCommand::NoChange => {}
                }
                Ok(())
            }
            Err(e) => {
                warn!("Relay write failed ({}), will re-apply next frame", e);
                self.outputs_dirty = true;
                sink.emit(&AppEvent::OutputFault(e));
                Err(e)
            }
        }
    }
}

/// Issue the ordered writes of `cmd`, stopping at the first failure: if a
/// release did not land, the other output must not be energized.
fn write_command(
    cmd: OutputCommand,
    hw: &mut impl OutputSink,
) -> core::result::Result<(), ActuatorError> {
    for (output, level) in cmd.writes() {
        hw.set_output(output, level)?;
    }
    Ok(())
}

fn keep_first(slot: &mut Option<Error>, err: impl Into<Error>) {
    if slot.is_none() {
        *slot = Some(err.into());
    }
}
