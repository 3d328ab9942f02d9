//! Status indicator pattern selection.
//!
//! The main loop calls [`IndicatorController::tick`] once per control
//! cycle with the current monotonic time; the returned
//! [`IndicatorOutput`] is fed straight into the actuator port.
//!
//! | Condition          | Output                              |
//! |--------------------|-------------------------------------|
//! | Fault latched      | Digital blink, toggles every 150 ms |
//! | Pump running       | Steady PWM 200                      |
//! | Pump stopped       | Steady PWM 80                       |
//!
//! The blink phase is driven by elapsed wall time, not by tick count, so
//! the rate holds regardless of how long a control tick takes.

/// Milliseconds between blink toggles while a fault is latched.
pub const BLINK_INTERVAL_MS: u64 = 150;
/// PWM level while the pump runs.
pub const BRIGHTNESS_PUMP_ON: u8 = 200;
/// PWM level while the pump is stopped.
pub const BRIGHTNESS_PUMP_OFF: u8 = 80;

/// What the status LED should show right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorOutput {
    /// Dimmed steady light at the given PWM duty (0–255).
    Steady(u8),
    /// Blink phase: digital on/off.
    Blink { lit: bool },
}

/// Blink-phase tracker. Stack-allocated, no heap.
#[derive(Debug, Default)]
pub struct IndicatorController {
    last_toggle_ms: u64,
    lit: bool,
}

impl IndicatorController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the indicator output for this tick.
    pub fn tick(&mut self, fault_latched: bool, pump_on: bool, now_ms: u64) -> IndicatorOutput {
        if fault_latched {
            if now_ms.saturating_sub(self.last_toggle_ms) > BLINK_INTERVAL_MS {
                self.last_toggle_ms = now_ms;
                self.lit = !self.lit;
            }
            IndicatorOutput::Blink { lit: self.lit }
        } else if pump_on {
            IndicatorOutput::Steady(BRIGHTNESS_PUMP_ON)
        } else {
            IndicatorOutput::Steady(BRIGHTNESS_PUMP_OFF)
        }
    }
}
