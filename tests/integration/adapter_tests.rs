//! Host-side adapters wired to a live SpaService: simulated NVS for
//! setpoint persistence and the dashboard publisher / request parser.

use std::cell::RefCell;

use spa_controller::adapters::dashboard::{DashboardPublisher, parse_request};
use spa_controller::adapters::log_sink::LogEventSink;
use spa_controller::adapters::nvs::NvsAdapter;
use spa_controller::app::ports::{ConfigError, ConfigPort, StatePublisher, StoragePort};
use spa_controller::app::service::SpaService;
use spa_controller::config::{SpaConfig, ThermostatVariant};
use spa_controller::drivers::led_moods::Mood;

use super::mock_hw::MockHardware;

#[test]
fn setpoint_survives_a_restart() {
    let mut nvs = NvsAdapter::new().unwrap();
    let mut hw = MockHardware::new(1500);
    let mut sink = LogEventSink::new();
    let mut publisher = DashboardPublisher::new(|_: &str| {});

    let mut app = SpaService::new(SpaConfig::default(), &nvs);
    assert_eq!(app.setpoint(), 100);
    app.start(0, &mut hw, &mut sink);
    app.handle_command(
        spa_controller::app::commands::AppCommand::SetSetpoint(103),
        0,
        &mut hw,
        &mut nvs,
        &mut publisher,
        &mut sink,
    )
    .unwrap();

    let restarted = SpaService::new(SpaConfig::default(), &nvs);
    assert_eq!(restarted.setpoint(), 103);
}

#[test]
fn config_blob_round_trips_and_rejects_garbage() {
    let mut nvs = NvsAdapter::new().unwrap();

    // Nothing stored yet: defaults.
    assert_eq!(nvs.load().unwrap().variant, ThermostatVariant::Extended);

    let cfg = SpaConfig {
        variant: ThermostatVariant::Plain,
        drift_degrees: 2,
        ..SpaConfig::default()
    };
    nvs.save(&cfg).unwrap();
    let loaded = nvs.load().unwrap();
    assert_eq!(loaded.variant, ThermostatVariant::Plain);
    assert_eq!(loaded.drift_degrees, 2);

    nvs.write("hot-tub", "spacfg", &[0xff; 3]).unwrap();
    assert_eq!(nvs.load().unwrap_err(), ConfigError::Corrupted);
}

#[test]
fn invalid_config_is_not_saved() {
    let nvs = NvsAdapter::new().unwrap();
    let cfg = SpaConfig {
        min_temp_f: 104,
        max_temp_f: 80,
        ..SpaConfig::default()
    };
    assert!(matches!(nvs.save(&cfg), Err(ConfigError::ValidationFailed(_))));
}

#[test]
fn dashboard_requests_drive_the_service() {
    let frames = RefCell::new(Vec::<String>::new());
    let mut nvs = NvsAdapter::new().unwrap();
    let mut hw = MockHardware::new(1500);
    let mut sink = LogEventSink::new();
    let mut publisher = DashboardPublisher::new(|f: &str| frames.borrow_mut().push(f.to_owned()));
    publisher.set_observer_count(1);

    let mut app = SpaService::new(SpaConfig::default(), &nvs);
    app.start(0, &mut hw, &mut sink);

    for cmd in parse_request(r#"{"setTemp":102,"light":11}"#).unwrap() {
        app.handle_command(cmd, 0, &mut hw, &mut nvs, &mut publisher, &mut sink)
            .unwrap();
    }
    assert_eq!(app.setpoint(), 102);
    assert_eq!(app.state().mood, Mood::Rainbow);

    // One state frame per applied request.
    let sent = frames.borrow().clone();
    assert_eq!(sent.len(), 2);
    let last: serde_json::Value = serde_json::from_str(&sent[1]).unwrap();
    assert_eq!(last["type"], "data");
    assert_eq!(last["setTemp"], 102);
    assert_eq!(last["light"], 11);
}

#[test]
fn dashboard_connect_sends_defaults_first() {
    let frames = RefCell::new(Vec::<String>::new());
    let nvs = NvsAdapter::new().unwrap();
    let mut publisher = DashboardPublisher::new(|f: &str| frames.borrow_mut().push(f.to_owned()));
    publisher.set_observer_count(1);
    assert_eq!(publisher.observer_count(), 1);

    let app = SpaService::new(SpaConfig::default(), &nvs);
    app.on_observer_connected(&mut publisher);

    let sent = frames.borrow();
    assert_eq!(sent.len(), 2);
    assert!(sent[0].contains(r#""type":"defaults""#));
    assert!(sent[0].contains(r#""min":80"#));
    let defaults: serde_json::Value = serde_json::from_str(&sent[0]).unwrap();
    assert_eq!(defaults["colors"][11], "Rainbow");
    assert!(sent[1].contains(r#""type":"data""#));
}
