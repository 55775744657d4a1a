//! Adaptive classification rate (frame-skip) controller.
//!
//! Classification cost depends on scene content and device load.  The
//! controller keeps a rolling window of measured per-frame processing
//! times and picks how many acquired frames to skip between two
//! classifications so the loop keeps up with the camera.
//!
//! ```text
//!   avg(window) ──▶ proposed = max(1, ⌊avg · target_fps⌋)
//!                        │
//!                        ▼ (only if proposed ≠ skip_n)
//!   skip_n ◀── round(0.7 · skip_n + 0.3 · proposed)
//! ```
//!
//! The weighted blend damps single-frame latency spikes.  When the rounded
//! blend lands back on the current value, the skip factor moves one step
//! toward the proposal instead, so a sustained load change is always
//! tracked to its fixed point.

use core::time::Duration;

use heapless::Deque;
use log::debug;

use crate::config::{MAX_ROLLING_WINDOW, MIN_RATE_SAMPLES, RateConfig};
use crate::error::PreconditionError;
use crate::time::Timestamp;

/// Weight kept from the current skip factor.
const SMOOTHING_KEEP: f64 = 0.7;
/// Weight given to the new proposal.
const SMOOTHING_GAIN: f64 = 0.3;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Skip factor transition reported by [`AdaptiveRateController::record_duration`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkipChange {
    pub from: u32,
    pub to: u32,
}

/// Result of recording one processing-time sample.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RateUpdate {
    /// Set when the skip factor changed.
    pub skip: Option<SkipChange>,
    /// Set when a new FPS estimate was published.
    pub fps: Option<f32>,
}

pub struct AdaptiveRateController {
    window: Deque<Duration, MAX_ROLLING_WINDOW>,
    window_size: usize,
    target_fps: u32,
    skip_n: u32,
    fps: f32,
    fps_interval: Duration,
    frames_since_fps_update: u32,
    last_fps_update: Timestamp,
    /// Latest accepted sample time.
    last_seen: Timestamp,
}

impl AdaptiveRateController {
    /// `now` starts the first FPS measurement window.
    pub fn new(config: &RateConfig, now: Timestamp) -> Self {
        Self {
            window: Deque::new(),
            window_size: config.rolling_window_size.clamp(MIN_RATE_SAMPLES, MAX_ROLLING_WINDOW),
            target_fps: config.target_fps.max(1),
            skip_n: config.initial_skip_n.max(1),
            fps: 0.0,
            fps_interval: config.fps_update_interval(),
            frames_since_fps_update: 0,
            last_fps_update: now,
            last_seen: now,
        }
    }

    /// `true` if frame `frame_index` should be classified.
    pub fn should_process(&self, frame_index: u64) -> bool {
        frame_index % u64::from(self.skip_n) == 0
    }

    /// Record how long the last classification took, measured at `now`.
    pub fn record_duration(
        &mut self,
        duration: Duration,
        now: Timestamp,
    ) -> Result<RateUpdate, PreconditionError> {
        if duration.is_zero() {
            return Err(PreconditionError::NonPositiveDuration);
        }
        if now < self.last_seen {
            return Err(PreconditionError::NonMonotonicClock {
                last: self.last_seen,
                now,
            });
        }
        self.last_seen = now;

        while self.window.len() >= self.window_size {
            self.window.pop_front();
        }
        // Room is guaranteed: window_size <= capacity.
        let _ = self.window.push_back(duration);

        let mut update = RateUpdate::default();
        if self.window.len() < MIN_RATE_SAMPLES {
            return Ok(update);
        }

        let proposed = self.proposed_skip();
        if proposed != self.skip_n {
            let from = self.skip_n;
            self.skip_n = smooth(from, proposed);
            debug!(
                "Rate: avg={:?} proposed={} skip {} -> {}",
                self.average_duration(),
                proposed,
                from,
                self.skip_n
            );
            update.skip = Some(SkipChange {
                from,
                to: self.skip_n,
            });
        }

        self.frames_since_fps_update += 1;
        let elapsed = now.saturating_duration_since(self.last_fps_update);
        if elapsed >= self.fps_interval {
            self.fps = self.frames_since_fps_update as f32 / elapsed.as_secs_f32();
            self.frames_since_fps_update = 0;
            self.last_fps_update = now;
            update.fps = Some(self.fps);
        }

        Ok(update)
    }

    pub fn current_skip(&self) -> u32 {
        self.skip_n
    }

    pub fn current_fps(&self) -> f32 {
        self.fps
    }

    /// Mean of the current window, `None` while it is empty.
    pub fn average_duration(&self) -> Option<Duration> {
        let len = self.window.len() as u32;
        if len == 0 {
            return None;
        }
        let total = self
            .window
            .iter()
            .try_fold(Duration::ZERO, |acc, d| acc.checked_add(*d))
            .unwrap_or(Duration::MAX);
        Some(total / len)
    }

    /// Number of samples currently in the window.
    pub fn samples(&self) -> usize {
        self.window.len()
    }

    // ── Internal ──────────────────────────────────────────────

    /// `max(1, ⌊avg / (1 / target_fps)⌋)` in integer nanoseconds, so the
    /// floor is exact (0.3 s at 10 fps is 3, not 2.999…).
    fn proposed_skip(&self) -> u32 {
        let avg = self.average_duration().unwrap_or_default();
        let frames = avg.as_nanos().saturating_mul(u128::from(self.target_fps)) / NANOS_PER_SEC;
        u32::try_from(frames).unwrap_or(u32::MAX).max(1)
    }
}

/// Blend `current` toward `proposed`, rounding half away from zero.
/// Always moves at least one step when `proposed != current`.
fn smooth(current: u32, proposed: u32) -> u32 {
    let blended = SMOOTHING_KEEP * f64::from(current) + SMOOTHING_GAIN * f64::from(proposed);
    let next = blended.round() as u32;
    let next = if next != current {
        next
    } else if proposed > current {
        current + 1
    } else {
        current - 1
    };
    next.max(1)
}
