//! Application service: the cooperative control loop.
//!
//! [`SpaService`] owns every piece of controller state: the filter
//! pipeline, the thermostat, the mood engine, the setpoint dial and the
//! setpoint itself.  Nothing lives in module-level statics; all I/O flows
//! through port traits injected at call sites, so the whole loop is
//! testable with mock adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!    DialPort ──▶ │          SpaService           │ ──▶ StatePublisher
//! ActuatorPort ◀──│ filter · thermostat · moods   │ ◀─▶ SetpointStore
//!   PixelSink ◀── └──────────────────────────────┘
//! ```
//!
//! One [`tick`](SpaService::tick) is one pass: dial → sample → (at the
//! evaluation cadence) temperature → thermostat → push → mood tick.
//! Nothing in a pass blocks.

use log::{info, warn};

use crate::config::{PIXEL_COUNT, SpaConfig};
use crate::control::thermostat::{SpaThermostat, Thermostat};
use crate::drivers::encoder::{DialEvent, SetpointDial};
use crate::drivers::led_moods::{Mood, MoodEngine};
use crate::error::Result;
use crate::sensors::WaterTemperature;
use crate::sensors::calibration::Calibration;
use crate::timer::IntervalTimer;

use super::commands::AppCommand;
use super::events::{AppEvent, SetpointLimits, SpaState};
use super::ports::{
    ActuatorPort, DialPort, DisplayPort, EventSink, PixelSink, SensorPort, SetpointStore,
    StatePublisher,
};

// ───────────────────────────────────────────────────────────────
// SpaService
// ───────────────────────────────────────────────────────────────

pub struct SpaService {
    config: SpaConfig,
    water: WaterTemperature,
    thermostat: SpaThermostat,
    moods: MoodEngine<PIXEL_COUNT>,
    dial: SetpointDial,
    eval_timer: IntervalTimer,
    setpoint_f: i16,
    tick_count: u64,
}

impl SpaService {
    /// Build the service and restore the persisted setpoint.
    ///
    /// A missing or unreadable setpoint falls back to the configured
    /// default; an out-of-range one is clamped.
    pub fn new(config: SpaConfig, store: &impl SetpointStore) -> Self {
        let setpoint_f = match store.read_setpoint() {
            Ok(Some(stored)) => {
                let clamped = config.clamp_setpoint(stored);
                if clamped != stored {
                    warn!("Stored setpoint {}°F out of range, clamped to {}°F", stored, clamped);
                }
                clamped
            }
            Ok(None) => {
                info!("No stored setpoint, using default {}°F", config.default_temp_f);
                config.default_temp_f
            }
            Err(e) => {
                warn!("Setpoint read failed ({}), using default {}°F", e, config.default_temp_f);
                config.default_temp_f
            }
        };

        Self {
            water: WaterTemperature::new(config.sample_interval_ms, Calibration::SPA_NTC),
            thermostat: SpaThermostat::from_config(&config),
            moods: MoodEngine::new(),
            dial: SetpointDial::new(config.min_temp_f, config.max_temp_f, config.dial_idle_timeout_ms),
            eval_timer: IntervalTimer::new(config.eval_interval_ms),
            setpoint_f,
            tick_count: 0,
            config,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Prime the filter from one real reading, drive the relays to their
    /// boot levels and blank the strip.
    pub fn start(
        &mut self,
        now_ms: u32,
        hw: &mut (impl SensorPort + ActuatorPort + PixelSink),
        sink: &mut impl EventSink,
    ) {
        let temp = self.water.prime(hw, now_ms);
        self.thermostat.start(now_ms, hw);
        self.moods.set_mood(Mood::Off, now_ms, hw);
        self.eval_timer.reset(now_ms);

        let state = self.state();
        sink.emit(&AppEvent::Started(state));
        info!(
            "SpaService started: {:.1}°F, setpoint {}°F, {:?} thermostat",
            temp, self.setpoint_f, self.config.variant
        );
    }

    // ── Per-pass orchestration ────────────────────────────────

    /// Run one cooperative pass.
    ///
    /// `hw` carries every board-side port so the relays, probe, strip and
    /// dial can be borrowed together without a double mutable borrow.
    pub fn tick(
        &mut self,
        now_ms: u32,
        hw: &mut (impl SensorPort + ActuatorPort + PixelSink + DialPort + DisplayPort),
        store: &mut impl SetpointStore,
        publisher: &mut impl StatePublisher,
        sink: &mut impl EventSink,
    ) {
        self.tick_count += 1;

        // 1. Dial input staged by the ISRs
        let input = hw.take_dial_input();
        if let Some(event) = self.dial.poll(now_ms, input, self.setpoint_f) {
            self.on_dial(event, hw, store, sink);
        }

        // 2. Sampling cadence
        self.water.service(now_ms, hw);

        // 3. Evaluation cadence: temperature → thermostat → push
        if self.eval_timer.expired(now_ms) {
            self.eval_timer.reset(now_ms);
            self.water.recompute();
            self.evaluate(now_ms, hw, sink);

            let state = self.state();
            sink.emit(&AppEvent::Telemetry(state));
            Self::publish(publisher, &state);
        }

        // 4. Lighting
        self.moods.tick(now_ms, hw);
    }

    // ── Command handling ──────────────────────────────────────

    /// Apply an external request.  Takes effect immediately rather than
    /// at the next scheduled evaluation.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        now_ms: u32,
        hw: &mut (impl ActuatorPort + PixelSink),
        store: &mut impl SetpointStore,
        publisher: &mut impl StatePublisher,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        match cmd {
            AppCommand::SetSetpoint(requested) => {
                self.commit_setpoint(requested, store, sink);
                self.evaluate(now_ms, hw, sink);
                Self::publish(publisher, &self.state());
            }
            AppCommand::SetMood(code) => {
                let mood = Mood::try_from(code)?;
                self.moods.set_mood(mood, now_ms, hw);
                sink.emit(&AppEvent::MoodChanged(mood));
                info!("Mood set to {}", mood.label());
                Self::publish(publisher, &self.state());
            }
            AppCommand::Refresh => {
                publisher.push_defaults(&self.limits());
                publisher.push_state(&self.state());
            }
        }
        Ok(())
    }

    /// A new remote observer connected: send bounds, then live state.
    pub fn on_observer_connected(&self, publisher: &mut impl StatePublisher) {
        publisher.push_defaults(&self.limits());
        publisher.push_state(&self.state());
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> SpaState {
        SpaState {
            temperature_f: self.water.current(),
            setpoint_f: self.setpoint_f,
            heat_on: self.thermostat.heat_on(),
            pump_on: self.thermostat.pump_on(),
            mood: self.moods.mood(),
        }
    }

    pub fn limits(&self) -> SetpointLimits {
        SetpointLimits {
            min: self.config.min_temp_f,
            max: self.config.max_temp_f,
            setpoint_f: self.setpoint_f,
        }
    }

    pub fn setpoint(&self) -> i16 {
        self.setpoint_f
    }

    pub fn thermostat(&self) -> &SpaThermostat {
        &self.thermostat
    }

    pub fn moods(&self) -> &MoodEngine<PIXEL_COUNT> {
        &self.moods
    }

    pub fn water(&self) -> &WaterTemperature {
        &self.water
    }

    pub fn config(&self) -> &SpaConfig {
        &self.config
    }

    /// Passes executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    // ── Internal ──────────────────────────────────────────────

    fn on_dial(
        &mut self,
        event: DialEvent,
        display: &mut impl DisplayPort,
        store: &mut impl SetpointStore,
        sink: &mut impl EventSink,
    ) {
        let temp = self.water.current();
        match event {
            DialEvent::Engaged(pending) => {
                display.wake();
                display.render(temp, pending);
            }
            DialEvent::Adjusted(pending) => display.render(temp, pending),
            DialEvent::Committed(value) => {
                display.render(temp, value);
                self.commit_setpoint(value, store, sink);
            }
            DialEvent::TimedOut(value) => {
                display.sleep();
                self.commit_setpoint(value, store, sink);
            }
            DialEvent::DisplayIdle => display.sleep(),
        }
    }

    /// Clamp, persist and arm the thermostat for the new setpoint.  The
    /// in-memory value is authoritative even if persisting fails.
    fn commit_setpoint(&mut self, requested: i16, store: &mut impl SetpointStore, sink: &mut impl EventSink) {
        let value = self.config.clamp_setpoint(requested);
        let previous = self.setpoint_f;
        self.setpoint_f = value;
        self.thermostat.force_reevaluate();

        if value == previous {
            return;
        }
        sink.emit(&AppEvent::SetpointChanged {
            from: previous,
            to: value,
        });
        if let Err(e) = store.write_setpoint(value) {
            warn!("Setpoint {}°F not persisted: {}", value, e);
            sink.emit(&AppEvent::SetpointNotSaved(value));
        }
    }

    fn evaluate(&mut self, now_ms: u32, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        let phase = self.thermostat.phase();
        let heat = self.thermostat.heat_on();
        let pump = self.thermostat.pump_on();

        self.thermostat
            .evaluate(now_ms, self.water.current(), self.setpoint_f, hw);

        if self.thermostat.phase() != phase {
            sink.emit(&AppEvent::PhaseChanged {
                from: phase,
                to: self.thermostat.phase(),
            });
        }
        if self.thermostat.heat_on() != heat {
            sink.emit(&AppEvent::HeatChanged(self.thermostat.heat_on()));
        }
        if self.thermostat.pump_on() != pump {
            sink.emit(&AppEvent::PumpChanged(self.thermostat.pump_on()));
        }
    }

    fn publish(publisher: &mut impl StatePublisher, state: &SpaState) {
        if publisher.observer_count() > 0 {
            publisher.push_state(state);
        }
    }
}
