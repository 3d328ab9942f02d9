//! Integration tests for command dispatch, the cross-task mailbox and
//! settings persistence.

use crate::mock_hw::{ActuatorCall, MockClock, MockHardware, MockNvs, RecordingSink};

use waterpump::app::channels::{drain_commands, post_command, CMD_DEPTH};
use waterpump::app::commands::ControlCommand;
use waterpump::app::events::{ControlEvent, ControlMode};
use waterpump::app::service::ControlLoop;
use waterpump::config::ControlSettings;

fn make_loop() -> (ControlLoop, MockHardware, MockClock, RecordingSink) {
    let mut lp = ControlLoop::new(ControlSettings::default());
    let mut sink = RecordingSink::new();
    lp.start(&mut sink);
    (lp, MockHardware::new(), MockClock::new(1_000), sink)
}

// ── Mode and pump commands ───────────────────────────────────

#[test]
fn set_manual_mode_command_switches_mode() {
    let (mut lp, mut hw, _clock, mut sink) = make_loop();
    lp.handle_command(ControlCommand::SetManualMode(true), &mut hw, &mut sink);
    assert_eq!(lp.mode(), ControlMode::Manual);
    assert!(lp.current_settings().manual_mode);

    lp.handle_command(ControlCommand::ResetManualMode, &mut hw, &mut sink);
    assert_eq!(lp.mode(), ControlMode::Automatic);
    assert!(!lp.current_settings().manual_mode);
    assert_eq!(
        sink.events[1..],
        [
            ControlEvent::ModeChanged(ControlMode::Manual),
            ControlEvent::ModeChanged(ControlMode::Automatic)
        ]
    );
}

#[test]
fn repeated_mode_request_emits_nothing() {
    let (mut lp, mut hw, _clock, mut sink) = make_loop();
    lp.handle_command(ControlCommand::SetManualMode(false), &mut hw, &mut sink);
    assert_eq!(sink.events.len(), 1, "only the Started event");
}

#[test]
fn set_pump_state_command_is_ignored_in_automatic() {
    let (mut lp, mut hw, _clock, mut sink) = make_loop();
    lp.handle_command(ControlCommand::SetPumpState(true), &mut hw, &mut sink);
    assert!(!lp.pump_state());
    assert!(hw.calls.is_empty());
}

#[test]
fn manual_pump_command_forces_manual_then_switches() {
    let (mut lp, mut hw, _clock, mut sink) = make_loop();
    lp.handle_command(ControlCommand::ManualPump(true), &mut hw, &mut sink);
    assert_eq!(lp.mode(), ControlMode::Manual);
    assert!(lp.pump_state());
    assert_eq!(hw.calls, vec![ActuatorCall::SetPump(true)]);

    lp.handle_command(ControlCommand::ManualPump(false), &mut hw, &mut sink);
    assert!(!lp.pump_state());
    assert_eq!(hw.calls.last(), Some(&ActuatorCall::SetPump(false)));
}

// ── Settings hot-reload ──────────────────────────────────────

#[test]
fn update_settings_moves_thresholds() {
    let (mut lp, mut hw, clock, mut sink) = make_loop();
    hw.push_readings(&[200.0; 5]);
    for _ in 0..5 {
        clock.advance(100);
        lp.update(&mut hw, &clock, &mut sink);
    }
    assert!(lp.pump_state());

    // With the band lowered, 200 cm is now "low water".
    let lowered = ControlSettings {
        on_distance_cm: 100.0,
        off_distance_cm: 150.0,
        ..Default::default()
    };
    lp.handle_command(ControlCommand::UpdateSettings(lowered), &mut hw, &mut sink);
    assert!(lp.is_config_dirty());
    assert_eq!(lp.current_settings().off_distance_cm, 150.0);

    clock.advance(100);
    lp.update(&mut hw, &clock, &mut sink);
    assert!(!lp.pump_state());
}

#[test]
fn update_settings_ignores_incoming_runtime_fields() {
    let (mut lp, mut hw, _clock, mut sink) = make_loop();
    let incoming = ControlSettings {
        manual_mode: true,
        current_distance_cm: 42.0,
        ..Default::default()
    };
    lp.handle_command(ControlCommand::UpdateSettings(incoming), &mut hw, &mut sink);
    assert_eq!(lp.mode(), ControlMode::Automatic);
    assert!(!lp.current_settings().manual_mode);
    assert_eq!(lp.current_settings().current_distance_cm, 0.0);
}

#[test]
fn out_of_range_pin_update_is_dropped() {
    let (mut lp, mut hw, clock, mut sink) = make_loop();
    let nvs = MockNvs::new();
    let bad = ControlSettings {
        pin_echo: 99,
        on_distance_cm: 100.0,
        ..Default::default()
    };
    lp.handle_command(ControlCommand::UpdateSettings(bad), &mut hw, &mut sink);
    assert_eq!(lp.current_settings(), ControlSettings::default());
    assert!(!lp.is_config_dirty());

    for _ in 0..200 {
        clock.advance(30);
        lp.update(&mut hw, &clock, &mut sink);
        assert!(!lp.auto_save_if_needed(&clock, &nvs));
    }
    assert_eq!(nvs.save_count(), 0);
}

#[test]
fn non_finite_threshold_cannot_keep_pump_running() {
    let (mut lp, mut hw, clock, mut sink) = make_loop();
    hw.push_readings(&[200.0; 5]);
    for _ in 0..5 {
        clock.advance(100);
        lp.update(&mut hw, &clock, &mut sink);
    }
    assert!(lp.pump_state());

    let bad = ControlSettings {
        off_distance_cm: f32::NAN,
        ..Default::default()
    };
    lp.handle_command(ControlCommand::UpdateSettings(bad), &mut hw, &mut sink);
    assert_eq!(lp.current_settings().off_distance_cm, 290.0);

    hw.push_readings(&[370.0; 3]);
    for _ in 0..3 {
        clock.advance(100);
        lp.update(&mut hw, &clock, &mut sink);
    }
    assert_eq!(lp.current_distance(), 370.0);
    assert!(!lp.pump_state());
    assert!(!hw.pump_on());
}

#[test]
fn inverted_band_update_is_accepted() {
    let (mut lp, mut hw, _clock, mut sink) = make_loop();
    let inverted = ControlSettings {
        on_distance_cm: 300.0,
        off_distance_cm: 250.0,
        ..Default::default()
    };
    lp.handle_command(ControlCommand::UpdateSettings(inverted), &mut hw, &mut sink);
    assert_eq!(lp.current_settings().on_distance_cm, 300.0);
    assert!(lp.is_config_dirty());
}

// ── Persistence ──────────────────────────────────────────────

#[test]
fn auto_save_waits_five_seconds_after_change() {
    let (mut lp, mut hw, clock, mut sink) = make_loop();
    let nvs = MockNvs::new();
    lp.update(&mut hw, &clock, &mut sink);

    assert!(!lp.auto_save_if_needed(&clock, &nvs), "nothing dirty yet");

    let s = ControlSettings {
        on_distance_cm: 240.0,
        ..Default::default()
    };
    lp.handle_command(ControlCommand::UpdateSettings(s), &mut hw, &mut sink);

    clock.set(5_999);
    assert!(!lp.auto_save_if_needed(&clock, &nvs));
    assert_eq!(nvs.save_count(), 0);

    clock.set(6_000);
    assert!(lp.auto_save_if_needed(&clock, &nvs));
    assert_eq!(nvs.save_count(), 1);
    assert_eq!(nvs.saved.borrow()[0].on_distance_cm, 240.0);
    assert!(!lp.is_config_dirty());

    assert!(!lp.auto_save_if_needed(&clock, &nvs));
    assert_eq!(nvs.save_count(), 1);
}

#[test]
fn explicit_save_flushes_on_next_check() {
    let (mut lp, mut hw, clock, mut sink) = make_loop();
    let nvs = MockNvs::new();
    lp.update(&mut hw, &clock, &mut sink);

    lp.handle_command(ControlCommand::SaveSettings, &mut hw, &mut sink);
    assert!(lp.is_config_dirty());
    assert!(lp.auto_save_if_needed(&clock, &nvs));
    assert_eq!(nvs.save_count(), 1);
}

#[test]
fn failed_save_stays_dirty_and_retries() {
    let (mut lp, mut hw, clock, mut sink) = make_loop();
    let nvs = MockNvs::new();
    nvs.fail.set(true);

    lp.handle_command(ControlCommand::SaveSettings, &mut hw, &mut sink);
    assert!(!lp.auto_save_if_needed(&clock, &nvs));
    assert!(lp.is_config_dirty());

    nvs.fail.set(false);
    assert!(lp.auto_save_if_needed(&clock, &nvs));
    assert!(!lp.is_config_dirty());
}

#[test]
fn force_save_ignores_debounce() {
    let (mut lp, mut hw, _clock, mut sink) = make_loop();
    let nvs = MockNvs::new();

    lp.force_save_if_dirty(&nvs);
    assert_eq!(nvs.save_count(), 0, "clean settings are not written");

    lp.handle_command(
        ControlCommand::UpdateSettings(ControlSettings::default()),
        &mut hw,
        &mut sink,
    );
    lp.force_save_if_dirty(&nvs);
    assert_eq!(nvs.save_count(), 1);
    assert!(!lp.is_config_dirty());
}

#[test]
fn mode_changes_never_dirty_settings() {
    let (mut lp, mut hw, _clock, mut sink) = make_loop();
    lp.handle_command(ControlCommand::ManualPump(true), &mut hw, &mut sink);
    lp.handle_command(ControlCommand::ResetManualMode, &mut hw, &mut sink);
    assert!(!lp.is_config_dirty());
}

// ── Mailbox ──────────────────────────────────────────────────

// The mailbox is a process-wide static; keep every use in this one test.
#[test]
fn mailbox_commands_apply_in_order_between_ticks() {
    let (mut lp, mut hw, clock, mut sink) = make_loop();
    drain_commands(|_| {});

    assert!(post_command(ControlCommand::SetManualMode(true)));
    assert!(post_command(ControlCommand::SetPumpState(true)));
    assert!(post_command(ControlCommand::SetPumpState(false)));
    assert!(post_command(ControlCommand::SetPumpState(true)));

    let n = drain_commands(|cmd| lp.handle_command(cmd, &mut hw, &mut sink));
    assert_eq!(n, 4);
    assert_eq!(lp.mode(), ControlMode::Manual);
    assert!(lp.pump_state());
    assert_eq!(
        hw.calls,
        vec![
            ActuatorCall::SetPump(true),
            ActuatorCall::SetPump(false),
            ActuatorCall::SetPump(true)
        ]
    );

    clock.advance(100);
    lp.update(&mut hw, &clock, &mut sink);
    assert!(lp.pump_state());

    // A full mailbox refuses further posts instead of blocking.
    for _ in 0..CMD_DEPTH {
        assert!(post_command(ControlCommand::ResetManualMode));
    }
    assert!(!post_command(ControlCommand::ResetManualMode));
    assert_eq!(drain_commands(|cmd| lp.handle_command(cmd, &mut hw, &mut sink)), CMD_DEPTH);
    assert_eq!(lp.mode(), ControlMode::Automatic);
}
