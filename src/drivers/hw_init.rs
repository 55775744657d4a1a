//! One-shot relay GPIO initialization and raw level writes.
//!
//! Configures the relay pins as push-pull outputs using raw ESP-IDF sys
//! calls and parks them at the idle (de-energized) level.  Called once from
//! `main()` before the frame loop starts.  On the host the pins are
//! simulated by a level bitmask that tests can inspect.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use log::info;

use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    UnsupportedPin(i32),
    GpioConfigFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::UnsupportedPin(pin) => write!(f, "GPIO {} cannot drive a relay", pin),
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
        }
    }
}

impl core::error::Error for HwInitError {}

// ── Relay outputs ─────────────────────────────────────────────

/// Configure `relay_pins` as outputs parked at the idle level.
/// `idle_high` is `true` for active-low relay modules.
#[cfg(target_os = "espidf")]
pub fn init_relay_outputs(relay_pins: &[i32], idle_high: bool) -> Result<(), HwInitError> {
    for &pin in relay_pins {
        if !pins::is_output_capable(pin) {
            return Err(HwInitError::UnsupportedPin(pin));
        }
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_OUTPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        // SAFETY: single-threaded init path; `pin` was range-checked above.
        unsafe {
            // Latch the idle level before the driver is enabled.
            gpio_set_level(pin, u32::from(idle_high));
            let ret = gpio_config(&cfg);
            if ret != ESP_OK as i32 {
                return Err(HwInitError::GpioConfigFailed(ret));
            }
            gpio_set_level(pin, u32::from(idle_high));
        }
    }
    info!("hw_init: relay outputs {:?} configured, idle={}", relay_pins, if idle_high { "HIGH" } else { "LOW" });
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_relay_outputs(relay_pins: &[i32], idle_high: bool) -> Result<(), HwInitError> {
    for &pin in relay_pins {
        if !pins::is_output_capable(pin) {
            return Err(HwInitError::UnsupportedPin(pin));
        }
        sim::set(pin, idle_high);
    }
    info!("hw_init(sim): relay outputs {:?} idle={}", relay_pins, idle_high);
    Ok(())
}

/// Drive an already-configured output.  The error is the raw ESP-IDF code.
#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) -> Result<(), i32> {
    // SAFETY: gpio_set_level writes to an output configured by
    // init_relay_outputs(); main-loop only.
    let ret = unsafe { gpio_set_level(pin, u32::from(high)) };
    if ret == ESP_OK as i32 { Ok(()) } else { Err(ret) }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(pin: i32, high: bool) -> Result<(), i32> {
    sim::set(pin, high);
    Ok(())
}

/// Last level written to `pin` (host simulation only).
#[cfg(not(target_os = "espidf"))]
pub fn gpio_level(pin: i32) -> bool {
    sim::get(pin)
}

#[cfg(not(target_os = "espidf"))]
mod sim {
    use core::sync::atomic::{AtomicU64, Ordering};

    static LEVELS: AtomicU64 = AtomicU64::new(0);

    pub(super) fn set(pin: i32, high: bool) {
        let bit = 1u64 << pin;
        if high {
            LEVELS.fetch_or(bit, Ordering::Relaxed);
        } else {
            LEVELS.fetch_and(!bit, Ordering::Relaxed);
        }
    }

    pub(super) fn get(pin: i32) -> bool {
        LEVELS.load(Ordering::Relaxed) & (1u64 << pin) != 0
    }
}
