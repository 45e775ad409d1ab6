//! System configuration parameters
//!
//! All tunable parameters for the spa controller.
//! Values can be overridden via NVS (non-volatile storage).

use serde::{Deserialize, Serialize};

// --- Compile-time sizes (fixed-capacity buffers, no heap) ---

/// Raw ADC samples collected per median (stage 1).
pub const SAMPLE_BUFFER_LEN: usize = 11;
/// Medians averaged into the reported temperature (stage 2).
pub const MEDIAN_BUFFER_LEN: usize = 16;
/// Addressable LEDs on the mood strip.
pub const PIXEL_COUNT: usize = 60;

/// Which thermostat state machine drives the heater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThermostatVariant {
    /// Two-point hysteresis, pump follows heat.
    Plain,
    /// Time-qualified drift bands, element cooldown and periodic circulation.
    Extended,
}

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpaConfig {
    // --- Setpoint ---
    /// Lowest selectable setpoint (°F)
    pub min_temp_f: i16,
    /// Highest selectable setpoint (°F)
    pub max_temp_f: i16,
    /// Setpoint used when nothing is stored yet (°F)
    pub default_temp_f: i16,

    // --- Thermostat ---
    pub variant: ThermostatVariant,
    /// Half-width of the drift band (°F)
    pub drift_degrees: i16,
    /// How long the temperature must stay outside the band (extended variant)
    pub drift_time_ms: u32,
    /// Pump keeps running this long after the element switches off
    pub element_cooldown_ms: u32,
    /// Idle time before the pump is cycled for water turnover
    pub circulation_period_ms: u32,

    // --- Timing ---
    /// Raw thermistor sample interval (milliseconds)
    pub sample_interval_ms: u32,
    /// Temperature recompute / thermostat / publish interval (milliseconds)
    pub eval_interval_ms: u32,
    /// Setpoint dial commits and the display sleeps after this much inactivity
    pub dial_idle_timeout_ms: u32,
}

impl Default for SpaConfig {
    fn default() -> Self {
        Self {
            // Setpoint
            min_temp_f: 80,
            max_temp_f: 104,
            default_temp_f: 100,

            // Thermostat
            variant: ThermostatVariant::Extended,
            drift_degrees: 1,
            drift_time_ms: 60_000,            // 1 min
            element_cooldown_ms: 10 * 60_000, // 10 min
            circulation_period_ms: 4 * 3_600_000, // 4 h

            // Timing
            sample_interval_ms: 20,      // 50 Hz
            eval_interval_ms: 1_000,     // 1 Hz
            dial_idle_timeout_ms: 8_000,
        }
    }
}

impl SpaConfig {
    /// Clamp a requested setpoint into the selectable range.
    pub fn clamp_setpoint(&self, value: i16) -> i16 {
        value.clamp(self.min_temp_f, self.max_temp_f)
    }

    /// Range-check every field.  Called before persisting.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.min_temp_f >= self.max_temp_f {
            return Err("min_temp_f must be < max_temp_f");
        }
        if !(40..=110).contains(&self.min_temp_f) || !(40..=110).contains(&self.max_temp_f) {
            return Err("setpoint bounds must be 40–110 °F");
        }
        if !(self.min_temp_f..=self.max_temp_f).contains(&self.default_temp_f) {
            return Err("default_temp_f must lie within the setpoint bounds");
        }
        if !(1..=5).contains(&self.drift_degrees) {
            return Err("drift_degrees must be 1–5");
        }
        if self.element_cooldown_ms < 60_000 {
            return Err("element_cooldown_ms must be at least 1 min");
        }
        // Duty window is 2× the period and must fit the wrapping clock.
        if !(60_000..=24 * 3_600_000).contains(&self.circulation_period_ms) {
            return Err("circulation_period_ms must be 1 min – 24 h");
        }
        if !(1..=1_000).contains(&self.sample_interval_ms) {
            return Err("sample_interval_ms must be 1–1000");
        }
        if self.eval_interval_ms < self.sample_interval_ms || self.eval_interval_ms > 10_000 {
            return Err("eval_interval_ms must be ≥ sample_interval_ms and ≤ 10 s");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let c = SpaConfig::default();
        assert!(c.validate().is_ok());
        assert!(c.min_temp_f < c.default_temp_f && c.default_temp_f <= c.max_temp_f);
        assert!(c.drift_degrees > 0);
    }

    #[test]
    fn timing_ratios_make_sense() {
        let c = SpaConfig::default();
        assert!(
            c.sample_interval_ms < c.eval_interval_ms,
            "sampling should be faster than the control evaluation"
        );
        assert!(
            c.drift_time_ms < c.element_cooldown_ms,
            "drift qualification should be shorter than element cooldown"
        );
    }

    #[test]
    fn clamp_setpoint_respects_bounds() {
        let c = SpaConfig::default();
        assert_eq!(c.clamp_setpoint(200), c.max_temp_f);
        assert_eq!(c.clamp_setpoint(-5), c.min_temp_f);
        assert_eq!(c.clamp_setpoint(99), 99);
    }

    #[test]
    fn validate_rejects_inverted_bounds() {
        let c = SpaConfig {
            min_temp_f: 104,
            max_temp_f: 80,
            ..SpaConfig::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn serde_roundtrip() {
        let c = SpaConfig::default();
        let json = serde_json::to_string(&c).unwrap();
        let c2: SpaConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(c.drift_time_ms, c2.drift_time_ms);
        assert_eq!(c.variant, c2.variant);
    }

    #[test]
    fn postcard_roundtrip() {
        let c = SpaConfig::default();
        let bytes = postcard::to_allocvec(&c).unwrap();
        let c2: SpaConfig = postcard::from_bytes(&bytes).unwrap();
        assert_eq!(c.default_temp_f, c2.default_temp_f);
        assert_eq!(c.circulation_period_ms, c2.circulation_period_ms);
    }
}
