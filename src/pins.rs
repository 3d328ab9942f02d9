//! Factory GPIO assignments for the WaterPump controller board.
//!
//! These are the defaults baked into [`ControlSettings`]; the live pin
//! numbers come from the settings document so a board rework does not
//! need a firmware rebuild.
//!
//! [`ControlSettings`]: crate::config::ControlSettings

// ---------------------------------------------------------------------------
// Pump relay
// ---------------------------------------------------------------------------

/// Digital output: HIGH = relay closed = pump running.
pub const PUMP_RELAY_GPIO: i32 = 16;

// ---------------------------------------------------------------------------
// Ultrasonic distance sensor (HC-SR04 / JSN-SR04T)
// ---------------------------------------------------------------------------

/// Digital output: 10 µs HIGH pulse starts a measurement.
pub const SONAR_TRIG_GPIO: i32 = 12;
/// Digital input: HIGH for the round-trip time of the ultrasonic burst.
pub const SONAR_ECHO_GPIO: i32 = 14;

// ---------------------------------------------------------------------------
// Status LED
// ---------------------------------------------------------------------------

/// LEDC PWM output for the single-colour status LED.
pub const STATUS_LED_GPIO: i32 = 5;

// ---------------------------------------------------------------------------
// User button (active-low, internal pull-up)
// ---------------------------------------------------------------------------

pub const BUTTON_GPIO: i32 = 4;

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// LEDC frequency for the status LED (1 kHz).
#[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
pub const LED_PWM_FREQ_HZ: u32 = 1_000;
