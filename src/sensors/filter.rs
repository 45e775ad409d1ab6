//! Two-stage median-then-average sample filter.
//!
//! ```text
//!  ADC ──▶ [ stage 1: N raw samples ] ──median──▶ [ stage 2: M medians ] ──▶ average()
//!          drained on every median              write cursor wraps
//! ```
//!
//! The median rejects single-sample spikes (ADC noise, relay switching
//! transients); the average over recent medians smooths what is left
//! without the latency of one large window.

use heapless::Vec;

use crate::app::ports::SensorPort;
use crate::timer::IntervalTimer;

/// Fixed-capacity, drain-on-read sample buffer.
///
/// Held elements grow to `N` and then stay; the fill count tracks how
/// many samples were written since the last drain.  `full` is raised
/// exactly when the fill count reaches `N` and is cleared by
/// [`take_median`](Self::take_median), which also resets the fill count.
#[derive(Debug, Clone)]
pub struct SampleBuffer<const N: usize> {
    slots: Vec<u16, N>,
    fill: usize,
    full: bool,
}

impl<const N: usize> Default for SampleBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> SampleBuffer<N> {
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            fill: 0,
            full: false,
        }
    }

    /// Write one sample.  Once every slot is held, writes overwrite the
    /// oldest slot in order.
    pub fn push(&mut self, sample: u16) {
        if self.fill >= N {
            // Not drained since it filled: keep cycling through the slots.
            self.fill = 0;
        }
        if self.slots.len() < N {
            // Cannot fail: len < N checked above.
            let _ = self.slots.push(sample);
        } else {
            self.slots[self.fill] = sample;
        }
        self.fill += 1;
        if self.fill == N {
            self.full = true;
        }
    }

    /// Set every slot to `sample` and mark the buffer full.
    pub fn seed(&mut self, sample: u16) {
        self.slots.clear();
        for _ in 0..N {
            let _ = self.slots.push(sample);
        }
        self.fill = N;
        self.full = N > 0;
    }

    pub fn is_full(&self) -> bool {
        self.full
    }

    /// Samples written since the last drain.
    pub fn fill_count(&self) -> usize {
        self.fill
    }

    /// Elements currently held (what `median`/`average` are computed over).
    pub fn held(&self) -> &[u16] {
        &self.slots
    }

    /// Median of the held elements, then drain: clears `full` and resets
    /// the fill count.  Even counts average the two middle elements
    /// (truncating).  `None` when nothing is held.
    pub fn take_median(&mut self) -> Option<u16> {
        self.full = false;
        self.fill = 0;
        median(&self.slots)
    }

    /// Arithmetic mean of the held elements.  Non-draining; `None` when
    /// nothing is held.
    pub fn average(&self) -> Option<f32> {
        if self.slots.is_empty() {
            return None;
        }
        let sum: u32 = self.slots.iter().map(|&s| s as u32).sum();
        Some(sum as f32 / self.slots.len() as f32)
    }
}

/// Standard median of a window of samples.
pub fn median<const N: usize>(window: &Vec<u16, N>) -> Option<u16> {
    if window.is_empty() {
        return None;
    }
    let mut sorted = window.clone();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some(((sorted[mid - 1] as u32 + sorted[mid] as u32) / 2) as u16)
    }
}

/// Stage 1 + stage 2 plus the sampling cadence timer.
#[derive(Debug, Clone)]
pub struct FilterPipeline<const N: usize, const M: usize> {
    samples: SampleBuffer<N>,
    medians: SampleBuffer<M>,
    sample_timer: IntervalTimer,
}

impl<const N: usize, const M: usize> FilterPipeline<N, M> {
    pub fn new(sample_interval_ms: u32) -> Self {
        Self {
            samples: SampleBuffer::new(),
            medians: SampleBuffer::new(),
            sample_timer: IntervalTimer::new(sample_interval_ms),
        }
    }

    /// Seed both stages from one real reading so the first average is
    /// defined rather than zero.
    pub fn prime(&mut self, first_reading: u16, now_ms: u32) {
        self.samples.seed(first_reading);
        let m = self.samples.take_median().unwrap_or(first_reading);
        self.medians.seed(m);
        self.sample_timer.reset(now_ms);
    }

    /// One non-blocking service step.
    ///
    /// A full stage 1 is drained into stage 2; otherwise one raw sample is
    /// read if the sampling interval has elapsed.  Both paths restart the
    /// interval.  Returns `true` when a new median was produced.
    pub fn service(&mut self, now_ms: u32, sensor: &mut impl SensorPort) -> bool {
        if self.samples.is_full() {
            if let Some(m) = self.samples.take_median() {
                self.medians.push(m);
            }
            self.sample_timer.reset(now_ms);
            true
        } else if self.sample_timer.expired(now_ms) {
            self.samples.push(sensor.read_raw_sample());
            self.sample_timer.reset(now_ms);
            false
        } else {
            false
        }
    }

    /// Running mean of the held medians; `None` only before priming or the
    /// first median.
    pub fn average(&self) -> Option<f32> {
        self.medians.average()
    }

    pub fn samples(&self) -> &SampleBuffer<N> {
        &self.samples
    }

    pub fn medians(&self) -> &SampleBuffer<M> {
        &self.medians
    }
}
