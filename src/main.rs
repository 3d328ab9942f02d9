//! WaterPump Firmware: Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter   LogEventSink   NvsAdapter   Esp32Time       │
//! │  (Sensor+Actuator) (EventSink)    (ConfigPort) (ClockPort)     │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              ControlLoop (pure logic)                  │    │
//! │  │  Filter · ErrorSupervisor · Hysteresis · Indicator     │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Command mailbox (web task → control loop)                     │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::{Context, Result, anyhow};
use log::{info, warn};

use waterpump::adapters::hardware::HardwareAdapter;
use waterpump::adapters::log_sink::LogEventSink;
use waterpump::adapters::nvs::NvsAdapter;
use waterpump::adapters::time::{Esp32TimeAdapter, SystemDelay};
use waterpump::app::channels::drain_commands;
use waterpump::app::events::ControlEvent;
use waterpump::app::ports::{ActuatorPort, ClockPort, ConfigPort, EventSink};
use waterpump::app::service::ControlLoop;
use waterpump::config::ControlSettings;
use waterpump::drivers::hw_init::{self, LEDC_CH_LED};
use waterpump::drivers::pump::PumpRelay;
use waterpump::drivers::status_led::StatusLed;
use waterpump::sensors::UltrasonicSensor;

/// Interval between telemetry log lines.
const TELEMETRY_INTERVAL_MS: u64 = 10_000;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  WaterPump v{}                       ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Load settings from NVS (or defaults) ───────────────
    let nvs = NvsAdapter::new().map_err(|e| anyhow!("NVS init failed: {}", e))?;
    let settings = match nvs.load() {
        Ok(s) => {
            info!("Settings loaded from NVS");
            s
        }
        Err(e) => {
            warn!("NVS settings load failed ({}), using defaults", e);
            ControlSettings::default()
        }
    };

    // ── 3. Initialise hardware peripherals ────────────────────
    let settings = match hw_init::init_peripherals(&settings) {
        Ok(()) => settings,
        Err(e) => {
            warn!("Peripheral init with stored pins failed ({}), retrying with factory pins", e);
            let factory = ControlSettings::default();
            hw_init::init_peripherals(&factory).context("peripheral init")?;
            factory
        }
    };

    // ── 4. Construct adapters ─────────────────────────────────
    let clock = Esp32TimeAdapter::new();
    let mut hw = HardwareAdapter::new(
        UltrasonicSensor::new(settings.pin_trig, settings.pin_echo, SystemDelay),
        PumpRelay::new(settings.pin_pump),
        StatusLed::new(LEDC_CH_LED),
    );
    hw.all_off();
    let mut log_sink = LogEventSink::new();

    // ── 5. Construct control loop ─────────────────────────────
    let mut control = ControlLoop::new(settings);
    control.start(&mut log_sink);

    info!("System ready. Entering control loop.");

    // ── 6. Control loop ───────────────────────────────────────
    let mut last_telemetry_ms = clock.now_ms();

    loop {
        // Commands posted by other tasks since the last tick.
        drain_commands(|cmd| control.handle_command(cmd, &mut hw, &mut log_sink));

        // Blocks for the sensor settle delay; the only yield point.
        control.update(&mut hw, &clock, &mut log_sink);

        let now = clock.now_ms();
        if now.saturating_sub(last_telemetry_ms) >= TELEMETRY_INTERVAL_MS {
            log_sink.emit(&ControlEvent::Telemetry(control.live_data()));
            last_telemetry_ms = now;
        }

        // Settings auto-save (5 s debounce after last change).
        control.auto_save_if_needed(&clock, &nvs);
    }
}
