//! Pump control settings
//!
//! Tunable parameters for the controller: switching thresholds and pin
//! assignments. Values are loaded through a [`ConfigPort`] and can be
//! replaced at runtime from the web layer.
//!
//! Field names serialise to the keys used by the settings document and
//! the web UI (`minTrigger`, `pin_pump`, ...).
//!
//! [`ConfigPort`]: crate::app::ports::ConfigPort

use serde::{Deserialize, Serialize};

use crate::control::hysteresis::ControlThresholds;
use crate::error::{Error, Result};
use crate::pins;

/// Highest GPIO number accepted for any pin assignment.
pub const MAX_GPIO: i32 = 39;

/// Pump control configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
// Missing keys take the factory pins from `Default`, not the 15/0/2/13
// fallbacks older firmware used when parsing.
#[serde(default)]
pub struct ControlSettings {
    // --- Thresholds ---
    /// Start pumping when the filtered distance (cm) drops to or below this.
    #[serde(rename = "minTrigger")]
    pub on_distance_cm: f32,
    /// Stop pumping when the filtered distance (cm) rises to or above this.
    #[serde(rename = "maxTrigger")]
    pub off_distance_cm: f32,

    // --- Pins ---
    pub pin_pump: i32,
    pub pin_led: i32,
    pub pin_button: i32,
    pub pin_echo: i32,
    pub pin_trig: i32,

    // --- Runtime only (never persisted) ---
    /// Manual override flag. Toggled from the web layer, owned by the
    /// control loop.
    #[serde(skip)]
    pub manual_mode: bool,
    /// Last filtered distance published by the control loop.
    #[serde(skip)]
    pub current_distance_cm: f32,
}

impl Default for ControlSettings {
    fn default() -> Self {
        Self {
            on_distance_cm: 260.0,
            off_distance_cm: 290.0,

            pin_pump: pins::PUMP_RELAY_GPIO,
            pin_led: pins::STATUS_LED_GPIO,
            pin_button: pins::BUTTON_GPIO,
            pin_echo: pins::SONAR_ECHO_GPIO,
            pin_trig: pins::SONAR_TRIG_GPIO,

            manual_mode: false,
            current_distance_cm: 0.0,
        }
    }
}

impl ControlSettings {
    /// Switching thresholds as consumed by the hysteresis controller.
    pub fn thresholds(&self) -> ControlThresholds {
        ControlThresholds {
            on_distance_cm: self.on_distance_cm,
            off_distance_cm: self.off_distance_cm,
        }
    }

    /// Range-check the persistable fields.
    ///
    /// The threshold *ordering* is not checked: an inverted
    /// band makes the pump chatter but is otherwise harmless.
    pub fn validate(&self) -> Result<()> {
        if !self.on_distance_cm.is_finite() || !self.off_distance_cm.is_finite() {
            return Err(Error::Config("trigger distances must be finite"));
        }
        let pins = [
            self.pin_pump,
            self.pin_led,
            self.pin_button,
            self.pin_echo,
            self.pin_trig,
        ];
        if pins.iter().any(|p| !(0..=MAX_GPIO).contains(p)) {
            return Err(Error::Config("pin numbers must be 0-39"));
        }
        Ok(())
    }

    /// True when the band is ordered so that hysteresis can work.
    pub fn band_is_ordered(&self) -> bool {
        self.on_distance_cm < self.off_distance_cm
    }
}
