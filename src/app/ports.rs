//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ControlLoop (domain)
//! ```
//!
//! Driven adapters (sensor, actuators, clock, event sinks, storage)
//! implement these traits. The [`ControlLoop`](super::service::ControlLoop)
//! consumes them via generics, so the domain core never touches hardware
//! directly.

use crate::config::ControlSettings;
use crate::control::indicator::IndicatorOutput;

use super::events::ControlEvent;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this once per tick.
pub trait SensorPort {
    /// Take one blocking distance reading in centimetres.
    ///
    /// Implementations honour the sensor's settle delay before pinging
    /// and return `0.0` when no echo came back.
    fn sample_distance_cm(&mut self) -> f32;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to command actuators.
pub trait ActuatorPort {
    /// Energise (`true`) or release (`false`) the pump relay.
    fn set_pump(&mut self, on: bool);

    /// Drive the status LED.
    fn set_indicator(&mut self, output: IndicatorOutput);

    /// Pump off, LED off.
    fn all_off(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock used for debounce and blink timing.
pub trait ClockPort {
    fn now_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`ControlEvent`]s through this port.
pub trait EventSink {
    fn emit(&mut self, event: &ControlEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent settings)
// ───────────────────────────────────────────────────────────────

/// Loads and persists [`ControlSettings`].
///
/// Implementations MUST validate before persisting and reject bad values
/// with [`ConfigError::ValidationFailed`] rather than clamping them.
pub trait ConfigPort {
    /// Load settings from persistent storage.
    /// Returns [`ControlSettings::default()`] if nothing is stored yet.
    fn load(&self) -> Result<ControlSettings, ConfigError>;

    /// Validate and persist settings.
    fn save(&self, settings: &ControlSettings) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No settings found in storage (first boot).
    NotFound,
    /// Stored document could not be parsed.
    Corrupted,
    /// A field failed range validation.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "settings not found"),
            Self::Corrupted => write!(f, "settings corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl From<crate::error::Error> for ConfigError {
    fn from(e: crate::error::Error) -> Self {
        match e {
            crate::error::Error::Config(msg) => Self::ValidationFailed(msg),
            _ => Self::IoError,
        }
    }
}
