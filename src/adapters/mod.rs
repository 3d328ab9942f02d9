//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements         | Connects to              |
//! |----------------|--------------------|--------------------------|
//! | `hardware`     | SensorPort         | Ultrasonic sensor (GPIO) |
//! |                | ActuatorPort       | Relay GPIO, LEDC PWM     |
//! | `log_sink`     | EventSink          | Serial log output        |
//! | `nvs`          | ConfigPort         | NVS / in-memory store    |
//! | `time`         | ClockPort          | ESP32 system timer       |

pub mod hardware;
pub mod log_sink;
pub mod nvs;
pub mod time;
