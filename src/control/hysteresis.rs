//! Two-threshold pump switching
//!
//! The sensor looks down at the water surface, so a *small* distance means
//! a *high* water level:
//!
//! ```text
//!   distance ──▶   0 ........ on ======= off ........ 400 cm
//!                  │  pump ON ◀─┤  hold   ├─▶ pump OFF  │
//! ```
//!
//! Inside the band the previous decision is held, so readings hovering
//! around a single level never toggle the relay.

use crate::safety::ErrorState;

/// Switching thresholds in centimetres.
///
/// `on_distance_cm < off_distance_cm` is expected but not enforced: an
/// inverted band degrades to chattering, never to a crash.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlThresholds {
    /// Start pumping at or below this distance.
    pub on_distance_cm: f32,
    /// Stop pumping at or above this distance.
    pub off_distance_cm: f32,
}

/// Hysteresis decision for the pump relay.
pub struct PumpHysteresisController {
    thresholds: ControlThresholds,
}

impl PumpHysteresisController {
    pub fn new(thresholds: ControlThresholds) -> Self {
        Self { thresholds }
    }

    /// Replace the thresholds (hot settings reload).
    pub fn set_thresholds(&mut self, thresholds: ControlThresholds) {
        self.thresholds = thresholds;
    }

    pub fn thresholds(&self) -> ControlThresholds {
        self.thresholds
    }

    /// Next pump-on state for the given filtered distance.
    ///
    /// A latched sensor fault always yields OFF.
    pub fn decide(&self, filtered_cm: f32, currently_on: bool, error: ErrorState) -> bool {
        if error.is_latched() {
            return false;
        }

        if !currently_on && filtered_cm <= self.thresholds.on_distance_cm {
            true
        } else if currently_on && filtered_cm >= self.thresholds.off_distance_cm {
            false
        } else {
            currently_on
        }
    }
}
