//! Unified error types for the spa controller firmware.
//!
//! The control core itself never fails; these cover the edges where the
//! core meets storage, configuration, and external requests.  All
//! variants are `Copy` so they can be passed around without allocation.

use core::fmt;

use crate::app::ports::{ConfigError, StorageError};

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Persistent storage rejected a read or write.
    Storage(StorageError),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
    /// An external request named a mood code that does not exist.
    UnknownMood(u16),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// An inbound dashboard frame could not be decoded, or an outbound
    /// one could not be encoded.
    Protocol(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage(e) => write!(f, "storage: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::UnknownMood(code) => write!(f, "unknown mood code {code}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Protocol(msg) => write!(f, "protocol: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::Corrupted => Self::Config("stored config corrupted"),
            ConfigError::ValidationFailed(msg) => Self::Config(msg),
            ConfigError::IoError => Self::Config("config storage I/O error"),
        }
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
