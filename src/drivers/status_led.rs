//! Single-colour status LED driver.
//!
//! One LEDC PWM channel. Steady states use a dimmed duty; blinking
//! switches between full duty and off, which is indistinguishable from
//! driving the pin digitally.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the LEDC channel via hw_init.
//! On host/test: tracks state in-memory only.

use crate::control::indicator::IndicatorOutput;
use crate::drivers::hw_init;

pub struct StatusLed {
    channel: u32,
    duty: u8,
}

impl StatusLed {
    pub fn new(channel: u32) -> Self {
        Self { channel, duty: 0 }
    }

    pub fn set_brightness(&mut self, duty: u8) {
        if duty != self.duty {
            hw_init::ledc_set(self.channel, duty);
            self.duty = duty;
        }
    }

    pub fn set_lit(&mut self, lit: bool) {
        self.set_brightness(if lit { hw_init::LEDC_MAX_DUTY } else { 0 });
    }

    pub fn show(&mut self, output: IndicatorOutput) {
        match output {
            IndicatorOutput::Steady(duty) => self.set_brightness(duty),
            IndicatorOutput::Blink { lit } => self.set_lit(lit),
        }
    }

    pub fn off(&mut self) {
        self.set_brightness(0);
    }

    pub fn current_duty(&self) -> u8 {
        self.duty
    }
}
