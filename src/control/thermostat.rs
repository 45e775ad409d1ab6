//! Heater / circulation-pump state machines.
//!
//! Two variants share the [`Thermostat`] interface:
//!
//! * [`HysteresisThermostat`]: plain two-point hysteresis, evaluated
//!   level-triggered every control cycle.  The pump follows the heater.
//! * [`CirculatingThermostat`]: drift bands qualified by time, an element
//!   cooldown after every heating run, and periodic circulation.
//!
//! ```text
//!            cold for drift_time                hot for drift_time
//!  HeatOff ─────────────────────▶ HeatOn ─────────────────────▶ Cooldown
//!     ▲       (heat + pump on)                 (heat off)          │
//!     └────────────────────────────────────────────────────────────┘
//!                     cooldown expired (pump off)
//!
//!  Pump axis (HeatOff only): idle for one period ─▶ circulate until
//!  2 × period since the last reset ─▶ pump off.
//! ```
//!
//! Heat-on always implies pump-on; no path turns the pump off while the
//! element is energised or cooling down.  Relay writes go out only when a
//! level actually changes.

use log::info;

use crate::app::ports::ActuatorPort;
use crate::config::{SpaConfig, ThermostatVariant};
use crate::timer::IntervalTimer;

/// Heater axis of the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    HeatOff,
    HeatOn,
    /// Heater off, pump still running to carry heat away from the element.
    Cooldown,
}

/// Common interface of both thermostat variants.
pub trait Thermostat {
    /// Re-arm timers and drive the relays to the boot levels.
    fn start(&mut self, now_ms: u32, out: &mut impl ActuatorPort);

    /// One control cycle.
    fn evaluate(
        &mut self,
        now_ms: u32,
        temperature_f: f32,
        setpoint_f: i16,
        out: &mut impl ActuatorPort,
    );

    /// Honour a new setpoint on the next cycle instead of waiting out a
    /// drift window.
    fn force_reevaluate(&mut self);

    fn phase(&self) -> Phase;
    fn heat_on(&self) -> bool;
    fn pump_on(&self) -> bool;
}

/// Relay levels with write-on-change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Outputs {
    heat: bool,
    pump: bool,
}

impl Outputs {
    fn set_heat(&mut self, on: bool, out: &mut impl ActuatorPort) {
        if self.heat != on {
            self.heat = on;
            out.write_heat(on);
        }
    }

    fn set_pump(&mut self, on: bool, out: &mut impl ActuatorPort) {
        if self.pump != on {
            self.pump = on;
            out.write_pump(on);
        }
    }

    fn sync(&self, out: &mut impl ActuatorPort) {
        out.write_heat(self.heat);
        out.write_pump(self.pump);
    }
}

// ═══════════════════════════════════════════════════════════════
//  Plain two-point hysteresis
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct HysteresisThermostat {
    drift_degrees: f32,
    outputs: Outputs,
}

impl HysteresisThermostat {
    pub fn new(drift_degrees: i16) -> Self {
        Self {
            drift_degrees: drift_degrees as f32,
            outputs: Outputs {
                heat: false,
                pump: false,
            },
        }
    }
}

impl Thermostat for HysteresisThermostat {
    fn start(&mut self, _now_ms: u32, out: &mut impl ActuatorPort) {
        self.outputs.sync(out);
    }

    fn evaluate(
        &mut self,
        _now_ms: u32,
        temperature_f: f32,
        setpoint_f: i16,
        out: &mut impl ActuatorPort,
    ) {
        let set = setpoint_f as f32;
        if !self.outputs.heat && temperature_f <= set - self.drift_degrees {
            info!("Thermostat: {:.1}°F ≤ {}-{} → heat on", temperature_f, setpoint_f, self.drift_degrees);
            self.outputs.set_pump(true, out);
            self.outputs.set_heat(true, out);
        } else if self.outputs.heat && temperature_f >= set + self.drift_degrees {
            info!("Thermostat: {:.1}°F ≥ {}+{} → heat off", temperature_f, setpoint_f, self.drift_degrees);
            self.outputs.set_heat(false, out);
            self.outputs.set_pump(false, out);
        }
    }

    fn force_reevaluate(&mut self) {
        // Level-triggered: every cycle already compares against the current setpoint.
    }

    fn phase(&self) -> Phase {
        if self.outputs.heat {
            Phase::HeatOn
        } else {
            Phase::HeatOff
        }
    }

    fn heat_on(&self) -> bool {
        self.outputs.heat
    }

    fn pump_on(&self) -> bool {
        self.outputs.pump
    }
}

// ═══════════════════════════════════════════════════════════════
//  Time-qualified hysteresis with cooldown and circulation
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct CirculatingThermostat {
    drift_degrees: f32,
    circulation_period_ms: u32,
    cold_timer: IntervalTimer,
    hot_timer: IntervalTimer,
    cooldown_timer: IntervalTimer,
    circulation_timer: IntervalTimer,
    cooling_down: bool,
    circulating: bool,
    outputs: Outputs,
}

impl CirculatingThermostat {
    pub fn new(config: &SpaConfig) -> Self {
        Self {
            drift_degrees: config.drift_degrees as f32,
            circulation_period_ms: config.circulation_period_ms,
            cold_timer: IntervalTimer::new(config.drift_time_ms),
            hot_timer: IntervalTimer::new(config.drift_time_ms),
            cooldown_timer: IntervalTimer::new(config.element_cooldown_ms),
            circulation_timer: IntervalTimer::new(config.circulation_period_ms),
            cooling_down: false,
            circulating: false,
            // The pump relay powers up energised.
            outputs: Outputs {
                heat: false,
                pump: true,
            },
        }
    }

    pub fn is_circulating(&self) -> bool {
        self.circulating
    }

    fn too_cold(&mut self, now_ms: u32, temperature_f: f32, set: f32, out: &mut impl ActuatorPort) {
        if temperature_f > set - self.drift_degrees {
            self.cold_timer.reset(now_ms);
        } else if !self.outputs.heat && self.cold_timer.expired(now_ms) {
            info!("Thermostat: cold for drift window ({:.1}°F) → heat + pump on", temperature_f);
            self.outputs.set_pump(true, out);
            self.outputs.set_heat(true, out);
        }
    }

    fn too_hot(&mut self, now_ms: u32, temperature_f: f32, set: f32, out: &mut impl ActuatorPort) {
        if self.outputs.heat && temperature_f < set + self.drift_degrees {
            self.hot_timer.reset(now_ms);
        } else if self.outputs.heat && self.hot_timer.expired(now_ms) {
            info!("Thermostat: hot for drift window ({:.1}°F) → heat off, element cooldown", temperature_f);
            self.cooldown_timer.reset(now_ms);
            self.cooling_down = true;
            self.outputs.set_heat(false, out);
        } else if self.cooling_down && self.cooldown_timer.expired(now_ms) {
            info!("Thermostat: element cooldown complete → pump off");
            self.cooling_down = false;
            self.circulating = false;
            self.circulation_timer.reset(now_ms);
            self.outputs.set_pump(false, out);
        }
    }

    fn circulate(&mut self, now_ms: u32, out: &mut impl ActuatorPort) {
        let duty_window_ms = self.circulation_period_ms.saturating_mul(2);
        if self.outputs.pump && !self.circulating {
            // Water is already moving.
            self.circulation_timer.reset(now_ms);
        } else if self.circulation_timer.expired(now_ms) && !self.circulating {
            info!("Thermostat: circulation cycle start");
            self.circulating = true;
            self.outputs.set_pump(true, out);
        } else if self.circulation_timer.elapsed(now_ms) >= duty_window_ms
            && !self.outputs.heat
            && !self.cooling_down
        {
            info!("Thermostat: circulation cycle end");
            self.circulating = false;
            self.outputs.set_pump(false, out);
            self.circulation_timer.reset(now_ms);
        }
    }
}

impl Thermostat for CirculatingThermostat {
    fn start(&mut self, now_ms: u32, out: &mut impl ActuatorPort) {
        self.cold_timer.reset(now_ms);
        self.hot_timer.reset(now_ms);
        self.cooldown_timer.reset(now_ms);
        self.circulation_timer.reset(now_ms);
        self.outputs.sync(out);
    }

    fn evaluate(
        &mut self,
        now_ms: u32,
        temperature_f: f32,
        setpoint_f: i16,
        out: &mut impl ActuatorPort,
    ) {
        let set = setpoint_f as f32;
        self.too_cold(now_ms, temperature_f, set, out);
        self.too_hot(now_ms, temperature_f, set, out);
        self.circulate(now_ms, out);
    }

    fn force_reevaluate(&mut self) {
        self.cold_timer.force_expire();
        self.hot_timer.force_expire();
    }

    fn phase(&self) -> Phase {
        if self.outputs.heat {
            Phase::HeatOn
        } else if self.cooling_down {
            Phase::Cooldown
        } else {
            Phase::HeatOff
        }
    }

    fn heat_on(&self) -> bool {
        self.outputs.heat
    }

    fn pump_on(&self) -> bool {
        self.outputs.pump
    }
}

// ═══════════════════════════════════════════════════════════════
//  Variant selected from configuration
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub enum SpaThermostat {
    Plain(HysteresisThermostat),
    Extended(CirculatingThermostat),
}

impl SpaThermostat {
    pub fn from_config(config: &SpaConfig) -> Self {
        match config.variant {
            ThermostatVariant::Plain => Self::Plain(HysteresisThermostat::new(config.drift_degrees)),
            ThermostatVariant::Extended => Self::Extended(CirculatingThermostat::new(config)),
        }
    }
}

impl Thermostat for SpaThermostat {
    fn start(&mut self, now_ms: u32, out: &mut impl ActuatorPort) {
        match self {
            Self::Plain(t) => t.start(now_ms, out),
            Self::Extended(t) => t.start(now_ms, out),
        }
    }

    fn evaluate(
        &mut self,
        now_ms: u32,
        temperature_f: f32,
        setpoint_f: i16,
        out: &mut impl ActuatorPort,
    ) {
        match self {
            Self::Plain(t) => t.evaluate(now_ms, temperature_f, setpoint_f, out),
            Self::Extended(t) => t.evaluate(now_ms, temperature_f, setpoint_f, out),
        }
    }

    fn force_reevaluate(&mut self) {
        match self {
            Self::Plain(t) => t.force_reevaluate(),
            Self::Extended(t) => t.force_reevaluate(),
        }
    }

    fn phase(&self) -> Phase {
        match self {
            Self::Plain(t) => t.phase(),
            Self::Extended(t) => t.phase(),
        }
    }

    fn heat_on(&self) -> bool {
        match self {
            Self::Plain(t) => t.heat_on(),
            Self::Extended(t) => t.heat_on(),
        }
    }

    fn pump_on(&self) -> bool {
        match self {
            Self::Plain(t) => t.pump_on(),
            Self::Extended(t) => t.pump_on(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
