//! Integration tests for the real adapters in their host simulation
//! backends: ultrasonic sensor, relay, LED, NVS store and log sink.

use embedded_hal::delay::DelayNs;

use crate::mock_hw::MockClock;

use waterpump::adapters::hardware::HardwareAdapter;
use waterpump::adapters::log_sink::LogEventSink;
use waterpump::adapters::nvs::NvsAdapter;
use waterpump::app::commands::ControlCommand;
use waterpump::app::ports::{ConfigError, ConfigPort, SensorPort};
use waterpump::app::service::ControlLoop;
use waterpump::config::ControlSettings;
use waterpump::drivers::hw_init::{self, LEDC_CH_LED};
use waterpump::drivers::pump::PumpRelay;
use waterpump::drivers::status_led::StatusLed;
use waterpump::sensors::ultrasonic::sim_set_distance_cm;
use waterpump::sensors::UltrasonicSensor;

struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

fn adapter(settings: &ControlSettings) -> HardwareAdapter<NoDelay> {
    HardwareAdapter::new(
        UltrasonicSensor::new(settings.pin_trig, settings.pin_echo, NoDelay),
        PumpRelay::new(settings.pin_pump),
        StatusLed::new(LEDC_CH_LED),
    )
}

// The simulated distance is a process-wide static; keep every use in
// this one test.
#[test]
fn simulated_sensor_drives_full_loop() {
    let settings = ControlSettings::default();
    hw_init::init_peripherals(&settings).unwrap();
    let mut hw = adapter(&settings);

    // Driver errors surface as a 0 cm reading.
    sim_set_distance_cm(0.0);
    assert_eq!(hw.sample_distance_cm(), 0.0);
    sim_set_distance_cm(450.0);
    assert_eq!(hw.sample_distance_cm(), 0.0);
    sim_set_distance_cm(275.0);
    assert_eq!(hw.sample_distance_cm(), 275.0);

    // High water: pump runs, LED steady bright.
    let clock = MockClock::new(0);
    let mut sink = LogEventSink::new();
    let mut lp = ControlLoop::new(settings);
    lp.start(&mut sink);
    sim_set_distance_cm(150.0);
    for _ in 0..5 {
        clock.advance(100);
        lp.update(&mut hw, &clock, &mut sink);
    }
    assert!(lp.pump_state());
    assert!(hw.pump().is_running());
    assert_eq!(hw.led().current_duty(), 200);

    // Sensor goes silent: after the debounce the pump is forced off.
    sim_set_distance_cm(0.0);
    for _ in 0..40 {
        clock.advance(100);
        lp.update(&mut hw, &clock, &mut sink);
    }
    assert!(lp.is_error_state());
    assert!(!hw.pump().is_running());

    sim_set_distance_cm(200.0);
}

#[test]
fn loop_settings_persist_through_nvs() {
    let nvs = NvsAdapter::new().unwrap();
    let settings = nvs.load().unwrap();
    assert_eq!(settings, ControlSettings::default());

    let clock = MockClock::new(0);
    let mut hw = adapter(&settings);
    let mut sink = LogEventSink::new();
    let mut lp = ControlLoop::new(settings);

    let updated = ControlSettings {
        on_distance_cm: 210.0,
        off_distance_cm: 250.0,
        pin_pump: 17,
        ..Default::default()
    };
    lp.handle_command(ControlCommand::UpdateSettings(updated.clone()), &mut hw, &mut sink);
    lp.handle_command(ControlCommand::SaveSettings, &mut hw, &mut sink);
    assert!(lp.auto_save_if_needed(&clock, &nvs));

    assert_eq!(nvs.load().unwrap(), updated);
}

#[test]
fn invalid_settings_never_reach_flash() {
    let nvs = NvsAdapter::new().unwrap();
    let clock = MockClock::new(0);
    let mut hw = adapter(&ControlSettings::default());
    let mut sink = LogEventSink::new();
    let mut lp = ControlLoop::new(ControlSettings::default());

    let bad = ControlSettings {
        pin_echo: 99,
        ..Default::default()
    };
    lp.handle_command(ControlCommand::UpdateSettings(bad.clone()), &mut hw, &mut sink);
    assert!(!lp.is_config_dirty());
    assert!(!lp.auto_save_if_needed(&clock, &nvs));
    assert!(nvs.raw().is_none());

    // The store rejects the same value on its own.
    assert_eq!(
        nvs.save(&bad),
        Err(ConfigError::ValidationFailed("pin numbers must be 0-39"))
    );
    assert_eq!(nvs.load().unwrap(), ControlSettings::default());
}
