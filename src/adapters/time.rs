//! Uptime clock.
//!
//! The millisecond clock every [`IntervalTimer`](crate::timer::IntervalTimer)
//! and the service loop run on.  Truncated to `u32`, so it wraps after
//! ~49.7 days; all timer arithmetic is wrapping.
//!
//! On target this reads the ESP-IDF high-resolution timer.  On host it
//! measures from construction with `std::time::Instant`.

#[derive(Debug)]
pub struct UptimeClock {
    #[cfg(not(target_os = "espidf"))]
    origin: std::time::Instant,
}

impl Default for UptimeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl UptimeClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            origin: std::time::Instant::now(),
        }
    }

    #[cfg(target_os = "espidf")]
    fn micros(&self) -> u64 {
        // SAFETY: plain read of the boot-relative 64-bit timer.
        unsafe { esp_idf_svc::sys::esp_timer_get_time() as u64 }
    }

    #[cfg(not(target_os = "espidf"))]
    fn micros(&self) -> u64 {
        self.origin.elapsed().as_micros() as u64
    }

    /// Milliseconds since boot, wrapping at 2³².
    pub fn uptime_ms(&self) -> u32 {
        (self.micros() / 1_000) as u32
    }
}
