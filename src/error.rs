//! Unified error types for the WaterPump firmware.
//!
//! Two distinct families live here:
//!
//! - [`Error`] and its per-subsystem enums: driver/init/config failures
//!   that propagate through `Result` in the adapter layer.
//! - [`ControlFault`]: the *domain* fault taxonomy of the control core.
//!   These are never returned as errors; the control loop classifies
//!   them and reacts (pump off, blinking indicator).
//!
//! All variants are `Copy` so they can be passed through the control
//! loop and event sink without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible adapter operation funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The distance sensor could not produce a reading.
    Sensor(SensorError),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

/// Failures of the ultrasonic ranging driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The echo line never went high after the trigger pulse.
    NoEcho,
    /// The echo pulse lasted longer than the maximum range allows.
    EchoTimeout,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoEcho => write!(f, "no echo received"),
            Self::EchoTimeout => write!(f, "echo exceeded maximum range"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Control faults (domain level, not exceptional)
// ---------------------------------------------------------------------------

/// Faults the control core can observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFault {
    /// Filtered distance left the sensor's operating envelope. Transient:
    /// the error supervisor is debouncing it.
    SensorOutOfRange,
    /// The out-of-range condition outlasted the debounce delay. Pump is
    /// forced off until the reading recovers or manual mode is entered.
    Latched,
}

impl fmt::Display for ControlFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SensorOutOfRange => write!(f, "sensor reading out of range"),
            Self::Latched => write!(f, "sensor fault latched"),
        }
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
