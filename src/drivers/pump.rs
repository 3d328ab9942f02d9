//! Pump relay driver.
//!
//! Single digital output: HIGH closes the relay and runs the pump.
//!
//! ## Safety contract
//!
//! The pump must never run while a sensor fault is latched. Enforced by
//! the hysteresis controller; this driver is a dumb actuator.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the GPIO via hw_init helpers.
//! On host/test: tracks state in-memory only.

use crate::drivers::hw_init;

pub struct PumpRelay {
    pin: i32,
    on: bool,
}

impl PumpRelay {
    pub fn new(pin: i32) -> Self {
        Self { pin, on: false }
    }

    pub fn set(&mut self, on: bool) {
        hw_init::gpio_write(self.pin, on);
        self.on = on;
    }

    pub fn stop(&mut self) {
        self.set(false);
    }

    pub fn is_running(&self) -> bool {
        self.on
    }
}
