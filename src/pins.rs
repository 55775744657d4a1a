//! GPIO pin assignments for the MoodRelay relay board.
//!
//! Single source of truth for the default wiring.  The live assignment is
//! carried in [`RelayConfig`](crate::config::RelayConfig) so a board
//! variant can remap pins without a rebuild.

// ---------------------------------------------------------------------------
// Relay outputs (2-channel opto-isolated relay module)
// ---------------------------------------------------------------------------

/// Digital output driving the "happy" relay coil.
pub const HAPPY_RELAY_GPIO: i32 = 17;
/// Digital output driving the "not happy" relay coil.
pub const NOT_HAPPY_RELAY_GPIO: i32 = 18;

/// Common relay modules pull the input LOW to close the contact.
pub const RELAY_ACTIVE_LOW: bool = true;

// ---------------------------------------------------------------------------
// Target limits
// ---------------------------------------------------------------------------

/// Highest GPIO number on the ESP32-S3.
pub const MAX_GPIO: i32 = 48;

/// GPIO 26–32 are wired to the in-package SPI flash/PSRAM on ESP32-S3
/// modules and must never be driven.
pub const RESERVED_GPIOS: core::ops::RangeInclusive<i32> = 26..=32;

/// `true` if `pin` can be configured as a relay output on this target.
pub fn is_output_capable(pin: i32) -> bool {
    (0..=MAX_GPIO).contains(&pin) && !RESERVED_GPIOS.contains(&pin)
}
