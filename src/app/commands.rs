//! Inbound commands to the control loop.
//!
//! These represent actions requested by the outside world (web UI,
//! button, serial) that the [`ControlLoop`](super::service::ControlLoop)
//! interprets and acts upon. Other tasks never call the loop directly;
//! they post one of these into [`channels`](super::channels).

use crate::config::ControlSettings;

/// Commands that external adapters can send into the control core.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlCommand {
    /// Enter (`true`) or leave (`false`) manual override.
    SetManualMode(bool),

    /// Switch the pump directly. Ignored unless in manual mode.
    SetPumpState(bool),

    /// Enter manual mode and switch the pump in one step.
    ManualPump(bool),

    /// Return to automatic control.
    ResetManualMode,

    /// Hot-reload thresholds and pin assignments.
    UpdateSettings(ControlSettings),

    /// Persist the current settings on the next save check.
    SaveSettings,
}
