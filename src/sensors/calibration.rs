//! Filtered ADC counts → water temperature (°F).
//!
//! A piecewise cubic fitted to the 10 kΩ @ 25 °C, B = 3950 NTC probe in a
//! divider with a fixed 10 kΩ resistor on the 12-bit ADC.  Counts at or
//! below the cutoff (hot water, low probe resistance) use the lower
//! coefficient set; counts above it use the upper set, which was fitted
//! through the lower branch's value at the cutoff.
//!
//! Outside roughly 700–3400 counts (≈150 °F down to ≈20 °F) the
//! polynomials extrapolate without warning.

/// Coefficients for `A·x³ + B·x² + C·x + D` on each side of `cutoff`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    pub cutoff: f32,
    pub lower: [f32; 4],
    pub upper: [f32; 4],
}

impl Calibration {
    /// Spa thermistor probe.
    pub const SPA_NTC: Self = Self {
        cutoff: 1800.0,
        lower: [
            -1.548_182_2e-8,
            7.729_978e-5,
            -0.173_192_6,
            238.371_36,
        ],
        upper: [
            -4.824_598_6e-9,
            3.365_447_7e-5,
            -0.116_196_95,
            215.037_04,
        ],
    };

    /// Temperature (°F) for an averaged median ADC reading.
    pub fn temperature(&self, avg_median: f32) -> f32 {
        if avg_median <= self.cutoff {
            cubic(&self.lower, avg_median)
        } else {
            cubic(&self.upper, avg_median)
        }
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self::SPA_NTC
    }
}

/// [`Calibration::SPA_NTC`] applied to `avg_median`.
pub fn temperature(avg_median: f32) -> f32 {
    Calibration::SPA_NTC.temperature(avg_median)
}

fn cubic(k: &[f32; 4], x: f32) -> f32 {
    ((k[0] * x + k[1]) * x + k[2]) * x + k[3]
}
