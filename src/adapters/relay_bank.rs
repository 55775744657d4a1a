//! Relay output adapter.
//!
//! Implements [`OutputSink`] over two `embedded-hal` output pins.  This is
//! the only place that knows the module's wiring polarity: the domain
//! speaks in [`Level::Energized`] / [`Level::DeEnergized`] and the bank
//! translates that to the physical pin level.

use embedded_hal::digital::{Error as _, OutputPin};
use log::debug;

use crate::app::ports::OutputSink;
use crate::control::relay::{Level, Output};
use crate::error::ActuatorError;

/// Which physical level closes the relay contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    ActiveHigh,
    ActiveLow,
}

impl Polarity {
    pub fn from_active_low(active_low: bool) -> Self {
        if active_low { Self::ActiveLow } else { Self::ActiveHigh }
    }

    /// `true` if the pin must be driven high to reach `level`.
    pub fn pin_high(self, level: Level) -> bool {
        match (self, level) {
            (Self::ActiveHigh, Level::Energized) | (Self::ActiveLow, Level::DeEnergized) => true,
            (Self::ActiveHigh, Level::DeEnergized) | (Self::ActiveLow, Level::Energized) => false,
        }
    }
}

/// Two relay channels behind `embedded-hal` output pins.
pub struct RelayBank<P> {
    happy: P,
    not_happy: P,
    polarity: Polarity,
}

impl<P: OutputPin> RelayBank<P> {
    pub fn new(happy: P, not_happy: P, polarity: Polarity) -> Self {
        Self {
            happy,
            not_happy,
            polarity,
        }
    }

    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// Give the pins back, e.g. to reconfigure them as inputs.
    pub fn into_pins(self) -> (P, P) {
        (self.happy, self.not_happy)
    }
}

impl<P: OutputPin> OutputSink for RelayBank<P> {
    fn set_output(&mut self, output: Output, level: Level) -> Result<(), ActuatorError> {
        let high = self.polarity.pin_high(level);
        let pin = match output {
            Output::Happy => &mut self.happy,
            Output::NotHappy => &mut self.not_happy,
        };
        let result = if high { pin.set_high() } else { pin.set_low() };
        result.map_err(|e| ActuatorError::OutputWriteFailed {
            output,
            kind: e.kind(),
        })?;
        debug!("relay: {} -> {:?} (pin {})", output, level, if high { "HIGH" } else { "LOW" });
        Ok(())
    }
}
