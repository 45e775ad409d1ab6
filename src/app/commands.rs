//! Inbound commands to the application service.
//!
//! These represent requests from the outside world (dashboard socket,
//! serial console) that the [`SpaService`](super::service::SpaService)
//! applies before the next scheduled evaluation.

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// New setpoint in °F.  Clamped to the configured bounds, persisted,
    /// and applied immediately.
    SetSetpoint(i16),

    /// Lighting mood by wire code.
    SetMood(u16),

    /// Re-send setpoint bounds and current state.
    Refresh,
}
