//! Closed-loop control: heater and circulation pump.

pub mod thermostat;
