//! Outbound control events.
//!
//! The [`ControlLoop`](super::service::ControlLoop) emits these through the
//! [`EventSink`](super::ports::EventSink) port. Adapters on the other
//! side decide what to do with them (serial log, web socket push, ...).

use serde::Serialize;

/// Who or what operates the pump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlMode {
    /// Hysteresis controller drives the pump; error supervision active.
    #[default]
    Automatic,
    /// A human drives the pump; error supervision suspended.
    Manual,
}

/// Why the pump changed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchCause {
    Hysteresis,
    FaultLatched,
    Manual,
}

/// Structured events emitted by the control core.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlEvent {
    /// The control loop has started (carries initial mode).
    Started(ControlMode),

    /// The pump relay changed state.
    PumpSwitched {
        on: bool,
        distance_cm: f32,
        cause: SwitchCause,
    },

    /// Filtered reading left the valid envelope; debounce started.
    FaultPending { distance_cm: f32 },

    /// Out-of-range condition outlasted the debounce delay.
    FaultLatched,

    /// Pending or latched fault cleared.
    FaultCleared,

    /// Control mode changed.
    ModeChanged(ControlMode),

    /// Periodic telemetry snapshot.
    Telemetry(LiveData),
}

/// Point-in-time status snapshot, shaped like the web UI's live-data
/// document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LiveData {
    #[serde(rename = "currentDistance")]
    pub current_distance: f32,
    #[serde(rename = "pumpState")]
    pub pump_state: bool,
    #[serde(rename = "isErrorState")]
    pub is_error_state: bool,
    #[serde(rename = "manualMode_pump")]
    pub manual_mode: bool,
}
