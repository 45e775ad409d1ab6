//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the control loop of the spa controller: sampling,
//! thermostat evaluation, lighting and setpoint handling.  All interaction
//! with hardware happens through **port traits** defined in [`ports`],
//! keeping this layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
