//! Spa Controller Firmware: main entry point
//!
//! Hexagonal architecture with a single cooperative loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter       LogEventSink   NvsAdapter   Esp32Time   │
//! │  (Sensor+Actuator+     (EventSink)    (Config+     (uptime_ms) │
//! │   Pixel+Dial+Display)                  Setpoint)               │
//! │  DashboardPublisher (StatePublisher)                           │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              SpaService (pure logic)                   │    │
//! │  │  Filter · Thermostat · Mood engine · Setpoint dial     │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::{error, info, warn};

use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::peripherals::Peripherals;

use spa_controller::adapters::dashboard::DashboardPublisher;
use spa_controller::adapters::hardware::HardwareAdapter;
use spa_controller::adapters::log_sink::LogEventSink;
use spa_controller::adapters::nvs::NvsAdapter;
use spa_controller::adapters::time::UptimeClock;
use spa_controller::app::ports::ConfigPort;
use spa_controller::app::service::SpaService;
use spa_controller::config::SpaConfig;
use spa_controller::drivers::hw_init;
use spa_controller::drivers::pixel_strip::PixelStrip;
use spa_controller::drivers::watchdog::Watchdog;
use spa_controller::error::Error;

/// Task watchdog budget for one loop pass.
const WATCHDOG_TIMEOUT_MS: u32 = 10_000;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Spa Controller v{}                 ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Initialise hardware peripherals ────────────────────
    if let Err(e) = hw_init::init_peripherals() {
        error!("HAL init failed: {}", e);
        return Err(Error::Init("peripherals").into());
    }
    if let Err(e) = hw_init::init_isr_service() {
        error!("ISR service init failed: {} (setpoint dial disabled)", e);
    }

    let peripherals = Peripherals::take()?;
    // GPIO14 is the strip data line (`pins::PIXEL_DATA_GPIO`).
    let strip = PixelStrip::new(peripherals.rmt.channel0, peripherals.pins.gpio14)?;
    let mut hw = HardwareAdapter::new(strip);

    // ── 3. Load config from NVS (or defaults) ─────────────────
    let mut nvs = NvsAdapter::new().map_err(Error::from)?;
    let config = match nvs.load() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("NVS config load failed ({}), using defaults", e);
            SpaConfig::default()
        }
    };

    let mut watchdog = Watchdog::new(WATCHDOG_TIMEOUT_MS);

    // ── 4. Construct adapters and the app service ─────────────
    let clock = UptimeClock::new();
    let mut log_sink = LogEventSink::new();
    // No network transport on this board revision; the observer count stays
    // at zero, so state pushes are skipped.
    let mut publisher = DashboardPublisher::new(|frame: &str| info!("WS  | {}", frame));

    let mut app = SpaService::new(config, &nvs);
    app.start(clock.uptime_ms(), &mut hw, &mut log_sink);

    info!("System ready. Entering control loop.");

    // ── 5. Control loop ───────────────────────────────────────
    loop {
        app.tick(clock.uptime_ms(), &mut hw, &mut nvs, &mut publisher, &mut log_sink);
        watchdog.feed();
        // Yield one RTOS tick so the idle task can run.
        FreeRtos::delay_ms(1);
    }
}
