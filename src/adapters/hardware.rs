//! Hardware adapter: bridges board peripherals to domain port traits.
//!
//! Owns the probe, both relays, the LED strip and the display state, and
//! exposes them through [`SensorPort`], [`ActuatorPort`], [`PixelSink`],
//! [`DialPort`] and [`DisplayPort`].  This is the only module in the system
//! that touches actual hardware.  On non-espidf targets the underlying
//! drivers use cfg-gated simulation stubs.

use log::{info, warn};

use crate::app::ports::{ActuatorPort, DialPort, DisplayPort, PixelSink, SensorPort};
use crate::drivers::encoder::{self, DialInput};
use crate::drivers::led_moods::Rgbw;
use crate::drivers::pixel_strip::PixelStrip;
use crate::drivers::relay::{GpioPin, Relay};
use crate::pins;
use crate::sensors::thermistor::Thermistor;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter {
    probe: Thermistor,
    heat: Relay<GpioPin>,
    pump: Relay<GpioPin>,
    strip: PixelStrip,
    display_awake: bool,
}

impl HardwareAdapter {
    /// Heater relay starts de-energised, pump relay energised.
    pub fn new(strip: PixelStrip) -> Self {
        let Ok(heat) = Relay::new(GpioPin::new(pins::HEAT_RELAY_GPIO), false);
        let Ok(pump) = Relay::new(GpioPin::new(pins::PUMP_RELAY_GPIO), true);
        Self {
            probe: Thermistor::new(pins::PROBE_ADC_GPIO),
            heat,
            pump,
            strip,
            display_awake: false,
        }
    }

    pub fn heat_on(&self) -> bool {
        self.heat.is_on()
    }

    pub fn pump_on(&self) -> bool {
        self.pump.is_on()
    }

    pub fn display_awake(&self) -> bool {
        self.display_awake
    }

    pub fn strip(&self) -> &PixelStrip {
        &self.strip
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl SensorPort for HardwareAdapter {
    fn read_raw_sample(&mut self) -> u16 {
        self.probe.read_raw()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl ActuatorPort for HardwareAdapter {
    fn write_heat(&mut self, on: bool) {
        let Ok(()) = self.heat.set(on);
        info!("Relay: heat {}", if on { "ON" } else { "OFF" });
    }

    fn write_pump(&mut self, on: bool) {
        let Ok(()) = self.pump.set(on);
        info!("Relay: pump {}", if on { "ON" } else { "OFF" });
    }
}

// ── PixelSink implementation ──────────────────────────────────

impl PixelSink for HardwareAdapter {
    fn show(&mut self, pixels: &[Rgbw]) {
        if let Err(e) = self.strip.write(pixels) {
            warn!("PixelStrip: frame dropped: {:?}", e);
        }
    }
}

// ── DialPort implementation ───────────────────────────────────

impl DialPort for HardwareAdapter {
    fn take_dial_input(&mut self) -> DialInput {
        encoder::take_input()
    }
}

// ── DisplayPort implementation ────────────────────────────────

impl DisplayPort for HardwareAdapter {
    fn wake(&mut self) {
        self.display_awake = true;
        info!("Display: on");
    }

    fn sleep(&mut self) {
        self.display_awake = false;
        info!("Display: off");
    }

    fn render(&mut self, temperature_f: f32, setpoint_f: i16) {
        if self.display_awake {
            info!("Display: Temp {:.1}°F | Set {}°F", temperature_f, setpoint_f);
        }
    }
}
