//! GPIO / peripheral pin assignments for the spa controller board
//! (Adafruit Metro ESP32-S3).
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Relays (active HIGH, driven through opto-isolated relay board)
// ---------------------------------------------------------------------------

/// Heating element contactor.
pub const HEAT_RELAY_GPIO: i32 = 5;
/// Circulation pump contactor.  Powers up energised.
pub const PUMP_RELAY_GPIO: i32 = 6;

// ---------------------------------------------------------------------------
// Sensors: Analog (ADC1)
// ---------------------------------------------------------------------------

/// 10 kΩ NTC (B3950) water probe, low side of a 10 kΩ divider.
/// ADC1 channel 0 (GPIO 1 on ESP32-S3).
pub const PROBE_ADC_GPIO: i32 = 1;

// ---------------------------------------------------------------------------
// Rotary encoder (setpoint dial)
// ---------------------------------------------------------------------------

pub const ENCODER_A_GPIO: i32 = 11;
pub const ENCODER_B_GPIO: i32 = 12;
/// Push switch, active-low with internal pull-up.
pub const ENCODER_BUTTON_GPIO: i32 = 13;

// ---------------------------------------------------------------------------
// Addressable LED strip (SK6812 RGBW)
// ---------------------------------------------------------------------------

pub const PIXEL_DATA_GPIO: i32 = 14;
