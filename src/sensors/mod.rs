//! Sensor drivers.
//!
//! The controller has exactly one sensor: the ultrasonic distance probe
//! looking down at the water surface.

pub mod ultrasonic;

pub use ultrasonic::UltrasonicSensor;
