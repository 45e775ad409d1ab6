//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (UART / USB-CDC in production).  A dashboard or MQTT
//! bridge would implement the same trait.

use log::{info, warn};

use crate::app::events::{AppEvent, SpaState};
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

fn on_off(on: bool) -> &'static str {
    if on { "ON" } else { "OFF" }
}

fn log_state(tag: &str, s: &SpaState) {
    info!(
        "{} | T={:.1}\u{00b0}F set={}\u{00b0}F | heat={} pump={} | mood={}",
        tag,
        s.temperature_f,
        s.setpoint_f,
        on_off(s.heat_on),
        on_off(s.pump_on),
        s.mood.label(),
    );
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(s) => log_state("START", s),
            AppEvent::Telemetry(s) => log_state("TELEM", s),
            AppEvent::PhaseChanged { from, to } => {
                info!("STATE | {:?} -> {:?}", from, to);
            }
            AppEvent::HeatChanged(on) => info!("RELAY | heat {}", on_off(*on)),
            AppEvent::PumpChanged(on) => info!("RELAY | pump {}", on_off(*on)),
            AppEvent::SetpointChanged { from, to } => {
                info!("SETPT | {}\u{00b0}F -> {}\u{00b0}F", from, to);
            }
            AppEvent::SetpointNotSaved(value) => {
                warn!("SETPT | {}\u{00b0}F active but not persisted", value);
            }
            AppEvent::MoodChanged(mood) => {
                info!("MOOD  | {} ({})", mood.label(), mood.code());
            }
        }
    }
}
