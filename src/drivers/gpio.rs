//! `embedded-hal` output pin over a raw GPIO number.
//!
//! Lets [`RelayBank`](crate::adapters::relay_bank::RelayBank) drive the
//! pins configured by [`hw_init`](super::hw_init) without owning
//! ESP-IDF HAL peripheral singletons.

use embedded_hal::digital::{ErrorKind, ErrorType, OutputPin};

use super::hw_init;
use crate::error::PreconditionError;
use crate::pins;

/// A relay GPIO configured as a push-pull output.
#[derive(Debug)]
pub struct GpioOutput {
    pin: i32,
}

impl GpioOutput {
    pub fn new(pin: i32) -> Result<Self, PreconditionError> {
        if !pins::is_output_capable(pin) {
            return Err(PreconditionError::UnsupportedPin(pin));
        }
        Ok(Self { pin })
    }

    pub fn pin(&self) -> i32 {
        self.pin
    }
}

/// Raw `esp_err_t` from a failed level write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpioError(pub i32);

impl embedded_hal::digital::Error for GpioError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

impl ErrorType for GpioOutput {
    type Error = GpioError;
}

impl OutputPin for GpioOutput {
    fn set_low(&mut self) -> Result<(), GpioError> {
        hw_init::gpio_write(self.pin, false).map_err(GpioError)
    }

    fn set_high(&mut self) -> Result<(), GpioError> {
        hw_init::gpio_write(self.pin, true).map_err(GpioError)
    }
}
