//! WaterPump firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod control;
pub mod error;
pub mod safety;

mod pins;

// Hardware-facing modules compile on the host too; the actual register
// access is guarded by cfg attributes inside.
pub mod adapters;
pub mod drivers;
pub mod sensors;
