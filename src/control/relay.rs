//! Exclusive-pair relay hold controller.
//!
//! Converts the per-frame verdict stream into relay commands with a
//! minimum hold time.
//!
//! ```text
//!            Happy / NotHappy
//!   IDLE ─────────────────────▶ HOLDING(target, since=now)
//!    ▲                              │   │
//!    │     hold expired (tick)      │   │ other verdict
//!    ├──────────────────────────────┘   └──▶ HOLDING(other, since=now)
//!    │     NoFace (Immediate policy)
//!    └──────────────────────────────────
//! ```
//!
//! The controller is pure: it never touches hardware.  Each call returns an
//! [`OutputCommand`] whose [`writes`](OutputCommand::writes) list always
//! de-energizes both outputs before energizing one, so the pair can never
//! be energized together even if the writes are applied slowly.

use core::fmt;
use core::time::Duration;

use heapless::Vec;
use log::{debug, info};

use crate::config::{FaceLossPolicy, RelayConfig};
use crate::error::PreconditionError;
use crate::time::Timestamp;

/// Per-frame verdict from the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationEvent {
    Happy,
    NotHappy,
    /// No usable face this frame.
    NoFace,
}

impl ClassificationEvent {
    /// The output a definite verdict selects; `None` for [`NoFace`](Self::NoFace).
    pub fn target(self) -> Option<Output> {
        match self {
            Self::Happy => Some(Output::Happy),
            Self::NotHappy => Some(Output::NotHappy),
            Self::NoFace => None,
        }
    }
}

/// One of the two relay channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Output {
    Happy,
    NotHappy,
}

impl Output {
    pub const ALL: [Self; 2] = [Self::Happy, Self::NotHappy];
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Happy => write!(f, "happy"),
            Self::NotHappy => write!(f, "not-happy"),
        }
    }
}

/// Logical output level, independent of wiring polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Energized,
    DeEnergized,
}

/// Why both outputs were released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseReason {
    /// The hold duration elapsed without a new verdict.
    HoldExpired,
    /// The face left the frame.
    FaceLost,
    /// Forced release on shutdown.
    Shutdown,
    /// Re-applying the idle state after a failed write.
    Resync,
}

/// What the output sink must do after an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputCommand {
    /// Leave both outputs as they are.
    NoChange,
    /// De-energize both outputs, then energize this one.
    Energize(Output),
    /// De-energize both outputs.
    Release(ReleaseReason),
}

impl OutputCommand {
    /// Ordered physical writes for this command.
    pub fn writes(self) -> Vec<(Output, Level), 3> {
        let mut writes = Vec::new();
        match self {
            Self::NoChange => {}
            Self::Energize(target) => {
                for output in Output::ALL {
                    let _ = writes.push((output, Level::DeEnergized));
                }
                let _ = writes.push((target, Level::Energized));
            }
            Self::Release(_) => {
                for output in Output::ALL {
                    let _ = writes.push((output, Level::DeEnergized));
                }
            }
        }
        writes
    }
}

/// Relay state.  `Idle` means both outputs are de-energized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    Idle,
    Holding { output: Output, since: Timestamp },
}

impl RelayState {
    pub fn is_active(self) -> bool {
        matches!(self, Self::Holding { .. })
    }

    pub fn current_output(self) -> Option<Output> {
        match self {
            Self::Idle => None,
            Self::Holding { output, .. } => Some(output),
        }
    }

    pub fn activated_at(self) -> Option<Timestamp> {
        match self {
            Self::Idle => None,
            Self::Holding { since, .. } => Some(since),
        }
    }
}

/// The two-output exclusive hold state machine.
pub struct ActuatorController {
    state: RelayState,
    hold: Duration,
    face_loss: FaceLossPolicy,
    last_seen: Option<Timestamp>,
}

impl ActuatorController {
    pub fn new(config: &RelayConfig) -> Self {
        Self::with_hold(config.hold_duration(), config.face_loss)
    }

    pub fn with_hold(hold: Duration, face_loss: FaceLossPolicy) -> Self {
        Self {
            state: RelayState::Idle,
            hold,
            face_loss,
            last_seen: None,
        }
    }

    /// Feed a verdict observed at `now`.
    pub fn update(
        &mut self,
        event: ClassificationEvent,
        now: Timestamp,
    ) -> Result<OutputCommand, PreconditionError> {
        self.observe(now)?;

        let cmd = match (event.target(), self.state) {
            (Some(target), RelayState::Holding { output, since }) if output == target => {
                self.expire_if_due(output, since, now)
            }
            (Some(target), _) => self.energize(target, now),
            (None, RelayState::Idle) => OutputCommand::NoChange,
            (None, RelayState::Holding { output, since }) => match self.face_loss {
                FaceLossPolicy::Immediate => {
                    info!("Relay: face lost, releasing {} early", output);
                    self.release(ReleaseReason::FaceLost)
                }
                FaceLossPolicy::HoldThrough => self.expire_if_due(output, since, now),
            },
        };
        Ok(cmd)
    }

    /// Let the hold timer run without a new verdict.
    pub fn tick(&mut self, now: Timestamp) -> Result<OutputCommand, PreconditionError> {
        self.observe(now)?;
        Ok(match self.state {
            RelayState::Idle => OutputCommand::NoChange,
            RelayState::Holding { output, since } => self.expire_if_due(output, since, now),
        })
    }

    /// Unconditional release for shutdown.  Always returns a command that
    /// de-energizes both outputs, even if the controller is already idle.
    pub fn force_release(&mut self) -> OutputCommand {
        self.state = RelayState::Idle;
        OutputCommand::Release(ReleaseReason::Shutdown)
    }

    /// Command that re-establishes the current logical state from scratch.
    pub fn resync_command(&self) -> OutputCommand {
        match self.state {
            RelayState::Idle => OutputCommand::Release(ReleaseReason::Resync),
            RelayState::Holding { output, .. } => OutputCommand::Energize(output),
        }
    }

    pub fn state(&self) -> RelayState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn current_output(&self) -> Option<Output> {
        self.state.current_output()
    }

    pub fn activated_at(&self) -> Option<Timestamp> {
        self.state.activated_at()
    }

    pub fn hold_duration(&self) -> Duration {
        self.hold
    }

    // ── Internal ──────────────────────────────────────────────

    fn observe(&mut self, now: Timestamp) -> Result<(), PreconditionError> {
        match self.last_seen {
            Some(last) if now < last => {
                return Err(PreconditionError::NonMonotonicClock { last, now });
            }
            _ => {}
        }
        self.last_seen = Some(now);
        Ok(())
    }

    fn energize(&mut self, target: Output, now: Timestamp) -> OutputCommand {
        info!("Relay: energize {} at {}", target, now);
        self.state = RelayState::Holding {
            output: target,
            since: now,
        };
        OutputCommand::Energize(target)
    }

    fn expire_if_due(&mut self, output: Output, since: Timestamp, now: Timestamp) -> OutputCommand {
        if now.saturating_duration_since(since) >= self.hold {
            info!("Relay: hold expired on {} at {}", output, now);
            self.release(ReleaseReason::HoldExpired)
        } else {
            OutputCommand::NoChange
        }
    }

    fn release(&mut self, reason: ReleaseReason) -> OutputCommand {
        debug!("Relay: release ({:?})", reason);
        self.state = RelayState::Idle;
        OutputCommand::Release(reason)
    }
}
