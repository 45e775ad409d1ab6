//! Water temperature measurement: raw probe → filter pipeline → calibration.
//!
//! [`WaterTemperature`] owns the two-stage filter and the calibration and
//! caches the last computed value, so a stalled probe simply freezes the
//! reported temperature at the last average.

pub mod calibration;
pub mod filter;
pub mod thermistor;

use crate::app::ports::SensorPort;
use crate::config::{MEDIAN_BUFFER_LEN, SAMPLE_BUFFER_LEN};
use calibration::Calibration;
use filter::FilterPipeline;

pub type SpaFilter = FilterPipeline<SAMPLE_BUFFER_LEN, MEDIAN_BUFFER_LEN>;

pub struct WaterTemperature {
    filter: SpaFilter,
    calibration: Calibration,
    current_f: f32,
}

impl WaterTemperature {
    pub fn new(sample_interval_ms: u32, calibration: Calibration) -> Self {
        Self {
            filter: FilterPipeline::new(sample_interval_ms),
            calibration,
            current_f: 0.0,
        }
    }

    /// Seed the filter from one real reading and compute the first value.
    pub fn prime(&mut self, sensor: &mut impl SensorPort, now_ms: u32) -> f32 {
        let first = sensor.read_raw_sample();
        self.filter.prime(first, now_ms);
        self.recompute()
    }

    /// Sampling-cadence step; see [`FilterPipeline::service`].
    pub fn service(&mut self, now_ms: u32, sensor: &mut impl SensorPort) {
        self.filter.service(now_ms, sensor);
    }

    /// Calibrate the current average.  Keeps the previous value if the
    /// filter has never produced one.
    pub fn recompute(&mut self) -> f32 {
        if let Some(avg) = self.filter.average() {
            self.current_f = self.calibration.temperature(avg);
        }
        self.current_f
    }

    /// Last computed temperature (°F).
    pub fn current(&self) -> f32 {
        self.current_f
    }

    pub fn filter(&self) -> &SpaFilter {
        &self.filter
    }
}
