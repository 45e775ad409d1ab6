//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ SpaService (domain)
//! ```
//!
//! Driven adapters (probe ADC, relays, LED strip, storage, dashboard
//! socket) implement these traits.  The [`SpaService`](super::service::SpaService)
//! consumes them via generics, so the domain core never touches hardware
//! directly.
//!
//! Everything here is called from the single main-loop context.  None of
//! these methods may block.

use crate::config::SpaConfig;
use crate::drivers::encoder::DialInput;
use crate::drivers::led_moods::Rgbw;

use super::events::{SetpointLimits, SpaState};

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Raw analog sample source for the water temperature probe.
pub trait SensorPort {
    /// One raw ADC reading.  Only called when the sampling interval expired.
    fn read_raw_sample(&mut self) -> u16;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Digital outputs for the heater and circulation pump relays.
///
/// The thermostat calls these only on a state transition, never to
/// re-assert an unchanged level.
pub trait ActuatorPort {
    fn write_heat(&mut self, on: bool);
    fn write_pump(&mut self, on: bool);
}

/// Addressable LED strip.
pub trait PixelSink {
    /// Latch a full frame out to the strip.
    fn show(&mut self, pixels: &[Rgbw]);
}

/// Setpoint dial input staged by the encoder ISRs.
pub trait DialPort {
    /// Rotation and click accumulated since the previous call.
    fn take_dial_input(&mut self) -> DialInput;
}

// ───────────────────────────────────────────────────────────────
// Observer ports (driven adapter: domain → dashboard / display)
// ───────────────────────────────────────────────────────────────

/// Live-state broadcast to remote observers (browser dashboard).
pub trait StatePublisher {
    /// Number of currently connected observers.
    fn observer_count(&self) -> usize;

    fn push_state(&mut self, state: &SpaState);

    /// Setpoint bounds, sent on connect and on refresh requests.
    fn push_defaults(&mut self, limits: &SetpointLimits);
}

/// Local character display next to the encoder.
pub trait DisplayPort {
    fn wake(&mut self);
    fn sleep(&mut self);
    fn render(&mut self, temperature_f: f32, setpoint_f: i16);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Persistence ports (driven adapter: domain ↔ NVS / flash)
// ───────────────────────────────────────────────────────────────

/// Persisted user setpoint.
pub trait SetpointStore {
    /// `Ok(None)` when nothing has been stored yet.
    fn read_setpoint(&self) -> Result<Option<i16>, StorageError>;

    fn write_setpoint(&mut self, value: i16) -> Result<(), StorageError>;
}

/// Loads and persists the [`SpaConfig`](crate::config::SpaConfig) blob.
///
/// Implementations MUST validate before persisting and reject invalid
/// ranges with [`ConfigError::ValidationFailed`] rather than clamp.
pub trait ConfigPort {
    /// Returns [`SpaConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<SpaConfig, ConfigError>;

    fn save(&self, config: &SpaConfig) -> Result<(), ConfigError>;
}

/// Persistent key-value storage.
///
/// Write operations MUST be atomic; no partial writes on power loss.
pub trait StoragePort {
    /// Copy a stored value into `buf`, returning how many bytes were filled.
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError>;

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Remove a key.  Removing an absent key is not an error.
    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError>;

    fn exists(&self, namespace: &str, key: &str) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

/// Errors from [`StoragePort`] / [`SetpointStore`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    NotFound,
    Full,
    IoError,
    /// Stored bytes do not decode to the expected value.
    Corrupted,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "stored config unreadable"),
            Self::ValidationFailed(msg) => write!(f, "config rejected: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "no such key"),
            Self::Full => write!(f, "NVS partition full"),
            Self::IoError => write!(f, "I/O error"),
            Self::Corrupted => write!(f, "stored value corrupted"),
        }
    }
}
