//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the ultrasonic sensor and both actuator drivers, exposing them
//! through [`SensorPort`] and [`ActuatorPort`]. This is the only module
//! in the system that touches actual hardware. On non-espidf targets,
//! the underlying drivers use cfg-gated simulation stubs.

use embedded_hal::delay::DelayNs;
use log::debug;

use crate::app::ports::{ActuatorPort, SensorPort};
use crate::control::indicator::IndicatorOutput;
use crate::drivers::pump::PumpRelay;
use crate::drivers::status_led::StatusLed;
use crate::sensors::UltrasonicSensor;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<D: DelayNs> {
    sensor: UltrasonicSensor<D>,
    pump: PumpRelay,
    led: StatusLed,
}

impl<D: DelayNs> HardwareAdapter<D> {
    pub fn new(sensor: UltrasonicSensor<D>, pump: PumpRelay, led: StatusLed) -> Self {
        Self { sensor, pump, led }
    }

    pub fn pump(&self) -> &PumpRelay {
        &self.pump
    }

    pub fn led(&self) -> &StatusLed {
        &self.led
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<D: DelayNs> SensorPort for HardwareAdapter<D> {
    fn sample_distance_cm(&mut self) -> f32 {
        // A failed ping reads as 0 cm: out of range, so the supervisor
        // debounces it like any other bad reading.
        self.sensor.read_cm().unwrap_or_else(|e| {
            debug!("ultrasonic: {}", e);
            0.0
        })
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<D: DelayNs> ActuatorPort for HardwareAdapter<D> {
    fn set_pump(&mut self, on: bool) {
        self.pump.set(on);
    }

    fn set_indicator(&mut self, output: IndicatorOutput) {
        self.led.show(output);
    }

    fn all_off(&mut self) {
        self.pump.stop();
        self.led.off();
    }
}
