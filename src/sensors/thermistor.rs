//! NTC thermistor probe on ADC1.
//!
//! Target builds take one oneshot conversion per read (the unit is set up
//! in `hw_init`).  Host builds return whatever a test last injected with
//! [`sim_set_probe_adc`].

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU16, Ordering};

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;

/// Mid-scale by default (≈ 70 °F).
#[cfg(not(target_os = "espidf"))]
static SIM_PROBE_ADC: AtomicU16 = AtomicU16::new(2048);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_probe_adc(raw: u16) {
    SIM_PROBE_ADC.store(raw, Ordering::Relaxed);
}

/// Raw-count reader for the water temperature probe.
pub struct Thermistor {
    _adc_gpio: i32,
}

impl Thermistor {
    pub fn new(adc_gpio: i32) -> Self {
        Self {
            _adc_gpio: adc_gpio,
        }
    }

    #[cfg(target_os = "espidf")]
    pub fn read_raw(&self) -> u16 {
        hw_init::adc1_read(hw_init::ADC1_CH_PROBE)
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn read_raw(&self) -> u16 {
        SIM_PROBE_ADC.load(Ordering::Relaxed)
    }
}
