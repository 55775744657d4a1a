//! System configuration parameters
//!
//! All tunable parameters for the MoodRelay system, read once at
//! construction and never mutated by the controllers.  Each controller
//! receives only its own section so it can be tested in isolation.

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, PreconditionError};
use crate::pins;

/// Largest rolling window the rate controller can hold (fixed capacity).
pub const MAX_ROLLING_WINDOW: usize = 64;

/// Samples required before the rate controller starts adapting.
pub const MIN_RATE_SAMPLES: usize = 5;

const DEFAULT_HOLD: Duration = Duration::from_secs(4);
const DEFAULT_FPS_INTERVAL: Duration = Duration::from_secs(1);

/// What a `NoFace` verdict does to an energized relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FaceLossPolicy {
    /// Release both outputs as soon as the face is lost.
    #[default]
    Immediate,
    /// Keep the hold running; only the timer releases the output.
    HoldThrough,
}

/// Relay outputs and hold timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// GPIO driving the "happy" relay
    pub happy_pin: i32,
    /// GPIO driving the "not happy" relay
    pub not_happy_pin: i32,
    /// Relay inputs energize on a LOW level
    pub active_low: bool,
    /// Minimum time an output stays energized before timed release (seconds)
    pub hold_duration_secs: f32,
    /// Behaviour on face loss while an output is held
    pub face_loss: FaceLossPolicy,
}

/// Adaptive classification rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateConfig {
    /// Frame rate the classification loop tries to sustain
    pub target_fps: u32,
    /// Skip factor used until enough samples have been measured
    pub initial_skip_n: u32,
    /// Number of processing-time samples in the moving average
    pub rolling_window_size: usize,
    /// Minimum time between FPS estimate updates (seconds)
    pub fps_update_interval_secs: f32,
}

/// Verdict thresholds handed to the classifier side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Mouth-open ratio above which the face counts as happy
    pub happy_mouth_ratio: f32,
    /// Mouth-open ratio below which the face counts as not happy
    pub not_happy_mouth_ratio: f32,
    /// Emotion-model "happy" score above which the face counts as happy
    pub happy_score_threshold: f32,
}

/// Core system configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SystemConfig {
    pub relay: RelayConfig,
    pub rate: RateConfig,
    pub detection: DetectionConfig,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            happy_pin: pins::HAPPY_RELAY_GPIO,
            not_happy_pin: pins::NOT_HAPPY_RELAY_GPIO,
            active_low: pins::RELAY_ACTIVE_LOW,
            hold_duration_secs: DEFAULT_HOLD.as_secs_f32(),
            face_loss: FaceLossPolicy::Immediate,
        }
    }
}

impl Default for RateConfig {
    fn default() -> Self {
        Self {
            target_fps: 15,
            initial_skip_n: 1,
            rolling_window_size: 30,
            fps_update_interval_secs: DEFAULT_FPS_INTERVAL.as_secs_f32(),
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            happy_mouth_ratio: 0.05,
            not_happy_mouth_ratio: 0.01,
            happy_score_threshold: 0.5,
        }
    }
}

/// Seconds as a non-zero [`Duration`], `None` if not representable.
fn positive_duration(secs: f32) -> Option<Duration> {
    Duration::try_from_secs_f32(secs).ok().filter(|d| !d.is_zero())
}

impl RelayConfig {
    /// Hold duration as a [`Duration`].  Only meaningful after
    /// [`SystemConfig::validate`] has passed; an invalid value falls back
    /// to the 4 s default.
    pub fn hold_duration(&self) -> Duration {
        positive_duration(self.hold_duration_secs).unwrap_or(DEFAULT_HOLD)
    }
}

impl RateConfig {
    /// Falls back to 1 s for values [`SystemConfig::validate`] rejects.
    pub fn fps_update_interval(&self) -> Duration {
        positive_duration(self.fps_update_interval_secs).unwrap_or(DEFAULT_FPS_INTERVAL)
    }
}

impl SystemConfig {
    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|_| ConfigError::Corrupted)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject out-of-range values.  Nothing is clamped: a bad value is a
    /// deployment mistake and must surface before the relays are touched.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let relay = &self.relay;
        for pin in [relay.happy_pin, relay.not_happy_pin] {
            if !pins::is_output_capable(pin) {
                return Err(ConfigError::Pin(PreconditionError::UnsupportedPin(pin)));
            }
        }
        if relay.happy_pin == relay.not_happy_pin {
            return Err(ConfigError::ValidationFailed(
                "relay.happy_pin and relay.not_happy_pin must differ",
            ));
        }
        if positive_duration(relay.hold_duration_secs).is_none() {
            return Err(ConfigError::ValidationFailed(
                "relay.hold_duration_secs must be a positive, representable duration",
            ));
        }

        let rate = &self.rate;
        if rate.target_fps == 0 {
            return Err(ConfigError::ValidationFailed("rate.target_fps must be >= 1"));
        }
        if rate.initial_skip_n == 0 {
            return Err(ConfigError::ValidationFailed(
                "rate.initial_skip_n must be >= 1",
            ));
        }
        if !(MIN_RATE_SAMPLES..=MAX_ROLLING_WINDOW).contains(&rate.rolling_window_size) {
            return Err(ConfigError::ValidationFailed(
                "rate.rolling_window_size must be within 5..=64",
            ));
        }
        if positive_duration(rate.fps_update_interval_secs).is_none() {
            return Err(ConfigError::ValidationFailed(
                "rate.fps_update_interval_secs must be a positive, representable duration",
            ));
        }

        let det = &self.detection;
        if !(det.happy_mouth_ratio.is_finite() && det.not_happy_mouth_ratio.is_finite())
            || det.happy_mouth_ratio < det.not_happy_mouth_ratio
        {
            return Err(ConfigError::ValidationFailed(
                "detection.happy_mouth_ratio must be >= not_happy_mouth_ratio",
            ));
        }
        if !(0.0..=1.0).contains(&det.happy_score_threshold) {
            return Err(ConfigError::ValidationFailed(
                "detection.happy_score_threshold must be within 0..=1",
            ));
        }
        Ok(())
    }
}
