//! Pure control algorithms: distance filtering, pump hysteresis, and
//! status indicator patterns. No I/O; everything here is driven by the
//! control loop in [`crate::app::service`].

pub mod filter;
pub mod hysteresis;
pub mod indicator;
