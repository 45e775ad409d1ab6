//! Spa controller firmware library.
//!
//! Exposes the control core and adapters for integration testing. All
//! ESP-IDF-specific code is guarded by `#[cfg(target_os = "espidf")]`
//! within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod error;
pub mod timer;

mod pins;

pub mod adapters;
pub mod control;
pub mod drivers;
pub mod sensors;
