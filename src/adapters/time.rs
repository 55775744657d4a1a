//! Monotonic clock adapter.
//!
//! - **`target_os = "espidf"`**: wraps `esp_timer_get_time()` from the
//!   ESP-IDF high-resolution timer (microsecond precision, monotonic since
//!   boot).
//! - **`not(target_os = "espidf")`**: uses `std::time::Instant` for
//!   simulation and tests (nanosecond precision).

use core::time::Duration;

use crate::app::ports::Clock;
use crate::time::Timestamp;

/// System clock behind the [`Clock`] port.
pub struct MonotonicClock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Microseconds since boot.
    #[cfg(target_os = "espidf")]
    pub fn uptime_us(&self) -> u64 {
        // SAFETY: esp_timer_get_time is a read of the free-running system
        // timer and may be called from any task.
        let us = unsafe { esp_idf_svc::sys::esp_timer_get_time() };
        us.max(0) as u64
    }

    /// Microseconds since this clock was created.
    #[cfg(not(target_os = "espidf"))]
    pub fn uptime_us(&self) -> u64 {
        u64::try_from(self.start.elapsed().as_micros()).unwrap_or(u64::MAX)
    }
}

impl Clock for MonotonicClock {
    #[cfg(target_os = "espidf")]
    fn now(&self) -> Timestamp {
        Timestamp::from_micros(self.uptime_us())
    }

    #[cfg(not(target_os = "espidf"))]
    fn now(&self) -> Timestamp {
        Timestamp::from_nanos(u64::try_from(self.start.elapsed().as_nanos()).unwrap_or(u64::MAX))
    }

    #[cfg(target_os = "espidf")]
    fn resolution(&self) -> Duration {
        Duration::from_micros(1)
    }

    #[cfg(not(target_os = "espidf"))]
    fn resolution(&self) -> Duration {
        Duration::from_nanos(1)
    }
}
