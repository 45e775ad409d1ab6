//! Integration tests for the SpaService → thermostat / moods / dial pipeline.
//!
//! These run on the host (x86_64) and drive the full cooperative loop
//! against the recording mocks in `mock_hw.rs`.

use spa_controller::app::commands::AppCommand;
use spa_controller::app::events::{AppEvent, SetpointLimits};
use spa_controller::app::ports::StorageError;
use spa_controller::app::service::SpaService;
use spa_controller::config::{SpaConfig, ThermostatVariant};
use spa_controller::control::thermostat::{Phase, Thermostat};
use spa_controller::drivers::led_moods::{Mood, RED};
use spa_controller::error::Error;
use spa_controller::sensors::calibration;

use super::mock_hw::{DisplayCall, MockHardware, MockPublisher, MockStore, Push, RecordingSink};

/// ≈100 °F on the spa probe.
const RAW_100F: u16 = 1500;
/// Well below 99 °F.
const RAW_COLD: u16 = 1700;
/// Well above 101 °F.
const RAW_HOT: u16 = 1350;

struct Rig {
    app: SpaService,
    hw: MockHardware,
    store: MockStore,
    publisher: MockPublisher,
    sink: RecordingSink,
    now: u32,
}

impl Rig {
    fn new(config: SpaConfig, raw: u16, store: MockStore, observers: usize) -> Self {
        let app = SpaService::new(config, &store);
        let mut rig = Self {
            app,
            hw: MockHardware::new(raw),
            store,
            publisher: MockPublisher::with_observers(observers),
            sink: RecordingSink::new(),
            now: 0,
        };
        rig.app.start(0, &mut rig.hw, &mut rig.sink);
        rig
    }

    fn plain(raw: u16) -> Self {
        let config = SpaConfig {
            variant: ThermostatVariant::Plain,
            ..SpaConfig::default()
        };
        Self::new(config, raw, MockStore::default(), 1)
    }

    fn tick(&mut self) {
        self.app.tick(
            self.now,
            &mut self.hw,
            &mut self.store,
            &mut self.publisher,
            &mut self.sink,
        );
    }

    /// Tick every 10 ms until `until_ms` (inclusive).
    fn run_until(&mut self, until_ms: u32) {
        while self.now < until_ms {
            self.now += 10;
            self.tick();
        }
    }

    fn command(&mut self, cmd: AppCommand) -> Result<(), Error> {
        self.app.handle_command(
            cmd,
            self.now,
            &mut self.hw,
            &mut self.store,
            &mut self.publisher,
            &mut self.sink,
        )
    }
}

// ── Setpoint restore ──────────────────────────────────────────

#[test]
fn stored_setpoint_is_restored() {
    let app = SpaService::new(SpaConfig::default(), &MockStore::with_setpoint(102));
    assert_eq!(app.setpoint(), 102);
}

#[test]
fn out_of_range_stored_setpoint_is_clamped() {
    let app = SpaService::new(SpaConfig::default(), &MockStore::with_setpoint(140));
    assert_eq!(app.setpoint(), 104);
    let app = SpaService::new(SpaConfig::default(), &MockStore::with_setpoint(20));
    assert_eq!(app.setpoint(), 80);
}

#[test]
fn missing_or_unreadable_setpoint_uses_default() {
    let app = SpaService::new(SpaConfig::default(), &MockStore::default());
    assert_eq!(app.setpoint(), 100);
    let app = SpaService::new(SpaConfig::default(), &MockStore::failing(StorageError::IoError));
    assert_eq!(app.setpoint(), 100);
}

// ── Start-up ──────────────────────────────────────────────────

#[test]
fn start_drives_boot_levels_and_blanks_strip() {
    let rig = Rig::new(SpaConfig::default(), RAW_100F, MockStore::default(), 0);

    // Extended variant: heater off, pump energised.
    assert_eq!(rig.hw.heat_writes(), vec![false]);
    assert_eq!(rig.hw.pump_writes(), vec![true]);

    let frame = rig.hw.last_frame().expect("strip blanked on start");
    assert!(frame.iter().all(|p| *p == Default::default()));

    match rig.sink.events.first() {
        Some(AppEvent::Started(state)) => {
            assert!(!state.heat_on);
            assert!(state.pump_on);
            assert_eq!(state.mood, Mood::Off);
            assert_eq!(state.setpoint_f, 100);
            assert!((state.temperature_f - calibration::temperature(f32::from(RAW_100F))).abs() < 0.01);
        }
        other => panic!("expected Started, got {:?}", other),
    }
}

// ── Publishing ────────────────────────────────────────────────

#[test]
fn state_is_pushed_only_with_observers() {
    let mut rig = Rig::new(SpaConfig::default(), RAW_100F, MockStore::default(), 0);
    rig.run_until(3_000);
    assert_eq!(rig.app.tick_count(), 300);
    assert!(rig.publisher.pushes.is_empty());
    // Telemetry is still emitted at the evaluation cadence.
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::Telemetry(_))), 3);

    let mut rig = Rig::new(SpaConfig::default(), RAW_100F, MockStore::default(), 1);
    rig.run_until(3_000);
    assert_eq!(rig.publisher.states().len(), 3);
}

#[test]
fn refresh_sends_defaults_then_state() {
    let mut rig = Rig::plain(RAW_100F);
    rig.command(AppCommand::Refresh).unwrap();

    assert_eq!(rig.publisher.pushes.len(), 2);
    assert_eq!(
        rig.publisher.pushes[0],
        Push::Defaults(SetpointLimits {
            min: 80,
            max: 104,
            setpoint_f: 100,
        })
    );
    assert!(matches!(rig.publisher.pushes[1], Push::State(_)));
}

#[test]
fn observer_connect_sends_defaults_then_state() {
    let mut rig = Rig::plain(RAW_100F);
    rig.app.on_observer_connected(&mut rig.publisher);
    assert!(matches!(rig.publisher.pushes[0], Push::Defaults(_)));
    assert!(matches!(rig.publisher.pushes[1], Push::State(_)));
}

// ── Remote setpoint ───────────────────────────────────────────

#[test]
fn remote_setpoint_applies_immediately_and_persists() {
    let mut rig = Rig::plain(RAW_100F);
    assert!(!rig.app.state().heat_on);

    rig.command(AppCommand::SetSetpoint(103)).unwrap();

    // ≈100 °F ≤ 103 - 1: heater on without waiting for the next evaluation.
    assert_eq!(rig.app.setpoint(), 103);
    assert_eq!(rig.hw.heat_writes().last(), Some(&true));
    assert_eq!(rig.hw.pump_writes().last(), Some(&true));
    assert_eq!(rig.store.writes, vec![103]);

    let pushed = rig.publisher.states();
    assert_eq!(pushed.len(), 1);
    assert_eq!(pushed[0].setpoint_f, 103);
    assert!(pushed[0].heat_on);

    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::SetpointChanged { from: 100, to: 103 })),
        1
    );
}

#[test]
fn remote_setpoint_is_clamped() {
    let mut rig = Rig::plain(RAW_100F);
    rig.command(AppCommand::SetSetpoint(150)).unwrap();
    assert_eq!(rig.app.setpoint(), 104);
    assert_eq!(rig.store.writes, vec![104]);
}

#[test]
fn unchanged_setpoint_is_not_rewritten() {
    let mut rig = Rig::plain(RAW_100F);
    rig.command(AppCommand::SetSetpoint(100)).unwrap();
    assert!(rig.store.writes.is_empty());
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::SetpointChanged { .. })), 0);
}

#[test]
fn storage_failure_keeps_setpoint_in_memory() {
    let config = SpaConfig {
        variant: ThermostatVariant::Plain,
        ..SpaConfig::default()
    };
    let mut rig = Rig::new(config, RAW_100F, MockStore::failing(StorageError::Full), 1);

    rig.command(AppCommand::SetSetpoint(101)).unwrap();

    assert_eq!(rig.app.setpoint(), 101);
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::SetpointNotSaved(101))), 1);
}

// ── Moods ─────────────────────────────────────────────────────

#[test]
fn unknown_mood_code_is_rejected() {
    let mut rig = Rig::plain(RAW_100F);
    let frames = rig.hw.frames.len();

    assert!(matches!(
        rig.command(AppCommand::SetMood(99)),
        Err(Error::UnknownMood(99))
    ));
    assert_eq!(rig.app.state().mood, Mood::Off);
    assert_eq!(rig.hw.frames.len(), frames);
    assert!(rig.publisher.pushes.is_empty());
}

#[test]
fn mood_change_renders_and_pushes() {
    let mut rig = Rig::plain(RAW_100F);
    rig.command(AppCommand::SetMood(1)).unwrap();

    assert_eq!(rig.app.moods().mood(), Mood::Red);
    assert_eq!(rig.hw.last_frame().unwrap()[0], RED);
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::MoodChanged(Mood::Red))), 1);
    assert_eq!(rig.publisher.states().last().unwrap().mood, Mood::Red);
}

#[test]
fn rainbow_animates_from_the_loop() {
    let mut rig = Rig::plain(RAW_100F);
    rig.command(AppCommand::SetMood(Mood::Rainbow.code())).unwrap();
    let before = rig.hw.frames.len();

    rig.run_until(1_000);

    // 100 ms cadence over one second.
    let drawn = rig.hw.frames.len() - before;
    assert!((9..=10).contains(&drawn), "drew {drawn} frames");
}

// ── Setpoint dial ─────────────────────────────────────────────

#[test]
fn dial_click_turn_click_commits() {
    let mut rig = Rig::plain(RAW_100F);

    rig.hw.click();
    rig.hw.turn(2);
    rig.hw.click();
    rig.run_until(30);

    assert_eq!(rig.hw.display[0], DisplayCall::Wake);
    assert!(matches!(rig.hw.display[1], DisplayCall::Render { setpoint_f: 100, .. }));
    assert!(matches!(rig.hw.display[2], DisplayCall::Render { setpoint_f: 102, .. }));
    assert_eq!(rig.app.setpoint(), 102);
    assert_eq!(rig.store.writes, vec![102]);

    // Display lingers until the idle window closes.
    assert!(!rig.hw.display.contains(&DisplayCall::Sleep));
    rig.run_until(8_100);
    assert_eq!(rig.hw.display.last(), Some(&DisplayCall::Sleep));
}

#[test]
fn dial_idle_timeout_commits_and_sleeps() {
    let mut rig = Rig::plain(RAW_100F);

    rig.hw.click();
    rig.hw.turn(-3);
    rig.run_until(20);
    assert_eq!(rig.app.setpoint(), 100);

    rig.run_until(8_100);
    assert_eq!(rig.app.setpoint(), 97);
    assert_eq!(rig.store.writes, vec![97]);
    assert_eq!(rig.hw.display.last(), Some(&DisplayCall::Sleep));
}

#[test]
fn dial_starts_from_remote_setpoint() {
    let mut rig = Rig::plain(RAW_100F);
    rig.command(AppCommand::SetSetpoint(95)).unwrap();

    rig.hw.click();
    rig.run_until(10);

    assert!(matches!(rig.hw.display[1], DisplayCall::Render { setpoint_f: 95, .. }));
}

#[test]
fn rotation_while_idle_is_discarded() {
    let mut rig = Rig::plain(RAW_100F);
    rig.hw.turn(5);
    rig.run_until(100);
    assert!(rig.hw.display.is_empty());
    assert_eq!(rig.app.setpoint(), 100);
}

// ── Sampling and control ──────────────────────────────────────

#[test]
fn sampling_tracks_the_probe_and_heats_when_cold() {
    let mut rig = Rig::plain(RAW_100F);
    assert!(!rig.app.state().heat_on);

    rig.hw.raw_sample = RAW_COLD;
    rig.run_until(10_000);

    let expected = calibration::temperature(f32::from(RAW_COLD));
    assert!((rig.app.water().current() - expected).abs() < 0.01);
    assert!(rig.hw.samples_read > 400);
    assert!(rig.app.state().heat_on);
    assert!(rig.app.state().pump_on);
    assert_eq!(rig.hw.heat_writes(), vec![false, true]);
}

#[test]
fn extended_cycle_through_the_loop() {
    let config = SpaConfig {
        variant: ThermostatVariant::Extended,
        drift_time_ms: 2_000,
        element_cooldown_ms: 3_000,
        circulation_period_ms: 3_600_000,
        ..SpaConfig::default()
    };
    let mut rig = Rig::new(config, RAW_COLD, MockStore::default(), 1);

    // Cold, but not yet for the whole drift window.
    rig.run_until(1_990);
    assert!(!rig.app.state().heat_on);

    rig.run_until(2_010);
    assert!(rig.app.state().heat_on);
    assert_eq!(rig.app.thermostat().phase(), Phase::HeatOn);
    assert_eq!(rig.hw.heat_writes(), vec![false, true]);
    // Pump was already running from boot.
    assert_eq!(rig.hw.pump_writes(), vec![true]);

    rig.hw.raw_sample = RAW_HOT;
    while rig.now < 30_000 {
        rig.now += 10;
        rig.tick();
        let s = rig.app.state();
        assert!(!s.heat_on || s.pump_on, "heat without pump at {} ms", rig.now);
    }

    assert!(!rig.app.state().heat_on);
    assert!(!rig.app.state().pump_on);
    assert_eq!(rig.app.thermostat().phase(), Phase::HeatOff);

    let phases: Vec<(Phase, Phase)> = rig
        .sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::PhaseChanged { from, to } => Some((*from, *to)),
            _ => None,
        })
        .collect();
    assert_eq!(
        phases,
        vec![
            (Phase::HeatOff, Phase::HeatOn),
            (Phase::HeatOn, Phase::Cooldown),
            (Phase::Cooldown, Phase::HeatOff),
        ]
    );
}

#[test]
fn new_setpoint_skips_drift_window() {
    let config = SpaConfig {
        variant: ThermostatVariant::Extended,
        drift_time_ms: 60_000,
        ..SpaConfig::default()
    };
    let mut rig = Rig::new(config, RAW_100F, MockStore::default(), 1);
    rig.run_until(1_000);
    assert!(!rig.app.state().heat_on);

    rig.command(AppCommand::SetSetpoint(104)).unwrap();
    assert!(rig.app.state().heat_on);
}
