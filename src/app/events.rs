//! Outbound application events and observer payloads.
//!
//! The [`SpaService`](super::service::SpaService) emits [`AppEvent`]s
//! through the [`EventSink`](super::ports::EventSink) port and hands
//! [`SpaState`] snapshots to the [`StatePublisher`](super::ports::StatePublisher).

use crate::control::thermostat::Phase;
use crate::drivers::led_moods::Mood;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The service has started (carries the boot state).
    Started(SpaState),

    /// Periodic state snapshot at the evaluation cadence.
    Telemetry(SpaState),

    /// Thermostat phase moved.
    PhaseChanged { from: Phase, to: Phase },

    /// Heater relay changed.
    HeatChanged(bool),

    /// Pump relay changed.
    PumpChanged(bool),

    /// Setpoint accepted from the dial or a remote request.
    SetpointChanged { from: i16, to: i16 },

    /// Setpoint accepted but could not be persisted.
    SetpointNotSaved(i16),

    /// Lighting mood changed.
    MoodChanged(Mood),
}

/// Point-in-time controller state, as pushed to observers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpaState {
    pub temperature_f: f32,
    pub setpoint_f: i16,
    pub heat_on: bool,
    pub pump_on: bool,
    pub mood: Mood,
}

/// Selectable setpoint range plus the current setpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetpointLimits {
    pub min: i16,
    pub max: i16,
    pub setpoint_f: i16,
}
