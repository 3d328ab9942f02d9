//! HC-SR04 / JSN-SR04T ultrasonic distance sensor.
//!
//! A 10 µs HIGH on TRIG fires a burst; ECHO then stays HIGH for the
//! round-trip time of the sound. Each reading waits out the sensor's
//! settle time first so echoes from the previous ping have died away.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: bit-bangs TRIG and times ECHO against `esp_timer`.
//! On host/test: returns a simulated distance set via
//! [`sim_set_distance_cm`].

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU32, Ordering};

use embedded_hal::delay::DelayNs;

use crate::error::SensorError;

/// Minimum quiet time between pings.
pub const SETTLE_DELAY_MS: u32 = 29;
/// Longest distance the driver will report.
pub const MAX_DISTANCE_CM: f32 = 400.0;
/// Echo round-trip microseconds per centimetre of distance.
pub const US_ROUNDTRIP_CM: f32 = 57.0;

#[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
const TRIGGER_PULSE_US: u32 = 10;
/// Longest echo pulse that still lies within [`MAX_DISTANCE_CM`].
#[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
const MAX_ECHO_US: u32 = (MAX_DISTANCE_CM * US_ROUNDTRIP_CM) as u32;
/// How long to wait for ECHO to rise after the trigger.
#[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
const ECHO_START_TIMEOUT_US: u64 = 5_000;

/// Simulated distance as `f32` bits. Starts at 200 cm.
#[cfg(not(target_os = "espidf"))]
static SIM_DISTANCE_BITS: AtomicU32 = AtomicU32::new(200.0f32.to_bits());

/// Set the distance the host build reports. `<= 0.0` simulates a missing
/// echo; anything beyond [`MAX_DISTANCE_CM`] simulates an overlong echo.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_distance_cm(distance_cm: f32) {
    SIM_DISTANCE_BITS.store(distance_cm.to_bits(), Ordering::Relaxed);
}

pub struct UltrasonicSensor<D: DelayNs> {
    #[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
    trig_pin: i32,
    #[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
    echo_pin: i32,
    delay: D,
}

impl<D: DelayNs> UltrasonicSensor<D> {
    pub fn new(trig_pin: i32, echo_pin: i32, delay: D) -> Self {
        Self {
            trig_pin,
            echo_pin,
            delay,
        }
    }

    /// Wait out the settle time, ping once and return centimetres.
    pub fn read_cm(&mut self) -> Result<f32, SensorError> {
        self.delay.delay_ms(SETTLE_DELAY_MS);
        self.ping()
    }

    #[cfg(target_os = "espidf")]
    fn ping(&mut self) -> Result<f32, SensorError> {
        use crate::drivers::hw_init::{gpio_read, gpio_write};

        gpio_write(self.trig_pin, false);
        self.delay.delay_us(2);
        gpio_write(self.trig_pin, true);
        self.delay.delay_us(TRIGGER_PULSE_US);
        gpio_write(self.trig_pin, false);

        // Wait for the echo line to rise.
        let armed = now_us();
        while !gpio_read(self.echo_pin) {
            if now_us().saturating_sub(armed) > ECHO_START_TIMEOUT_US {
                return Err(SensorError::NoEcho);
            }
        }

        // Time the HIGH pulse.
        let rise = now_us();
        while gpio_read(self.echo_pin) {
            if now_us().saturating_sub(rise) > u64::from(MAX_ECHO_US) {
                return Err(SensorError::EchoTimeout);
            }
        }
        let width_us = now_us().saturating_sub(rise);
        Ok(width_us as f32 / US_ROUNDTRIP_CM)
    }

    #[cfg(not(target_os = "espidf"))]
    fn ping(&mut self) -> Result<f32, SensorError> {
        let d = f32::from_bits(SIM_DISTANCE_BITS.load(Ordering::Relaxed));
        if d.is_nan() || d <= 0.0 {
            Err(SensorError::NoEcho)
        } else if d > MAX_DISTANCE_CM {
            Err(SensorError::EchoTimeout)
        } else {
            Ok(d)
        }
    }
}

#[cfg(target_os = "espidf")]
fn now_us() -> u64 {
    // SAFETY: esp_timer_get_time is a monotonic counter read.
    (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64
}
