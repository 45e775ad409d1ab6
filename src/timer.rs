//! Non-blocking interval timer.
//!
//! Every periodic behaviour in the firmware (sampling cadence, drift
//! qualification, element cooldown, LED animation frames) is gated by an
//! [`IntervalTimer`].  Nothing ever sleeps: the main loop asks each timer
//! whether it has expired and moves on.
//!
//! Time is a `u32` millisecond counter since boot.  All arithmetic is
//! wrapping, so the counter rolling over after ~49.7 days is harmless as
//! long as a timer is checked at least once per rollover period.

/// A reusable stopwatch with a mutable period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalTimer {
    period_ms: u32,
    started_ms: u32,
    forced: bool,
}

impl IntervalTimer {
    /// Create a timer armed at t = 0 with the given period.
    pub const fn new(period_ms: u32) -> Self {
        Self {
            period_ms,
            started_ms: 0,
            forced: false,
        }
    }

    /// True once `period_ms` has elapsed since the last [`reset`](Self::reset),
    /// or unconditionally after [`force_expire`](Self::force_expire).
    pub fn expired(&self, now_ms: u32) -> bool {
        self.forced || self.elapsed(now_ms) >= self.period_ms
    }

    /// Re-arm for one period starting at `now_ms`.
    pub fn reset(&mut self, now_ms: u32) {
        self.started_ms = now_ms;
        self.forced = false;
    }

    /// Change the cadence without re-arming.
    pub fn modify(&mut self, period_ms: u32) {
        self.period_ms = period_ms;
    }

    /// Make the next `expired()` check return true regardless of period.
    /// Cleared by the next `reset()`.
    pub fn force_expire(&mut self) {
        self.forced = true;
    }

    /// Milliseconds since the last reset.
    pub fn elapsed(&self, now_ms: u32) -> u32 {
        now_ms.wrapping_sub(self.started_ms)
    }

    pub fn period(&self) -> u32 {
        self.period_ms
    }
}
