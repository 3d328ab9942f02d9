//! Control loop: the hexagonal core.
//!
//! [`ControlLoop`] owns the median filter, error supervisor, hysteresis
//! controller and indicator state. It exposes a clean, hardware-agnostic
//! API. All I/O flows through port traits injected at call sites, making
//! the entire loop testable with mock adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!   ClockPort ──▶ │          ControlLoop          │
//! ActuatorPort ◀──│ Filter · Supervisor · Hyster. │
//!                 └──────────────────────────────┘
//! ```

use log::{debug, info, warn};

use crate::config::ControlSettings;
use crate::control::filter::DistanceFilter;
use crate::control::hysteresis::PumpHysteresisController;
use crate::control::indicator::IndicatorController;
use crate::safety::{ErrorState, ErrorSupervisor};

use super::commands::ControlCommand;
use super::events::{ControlEvent, ControlMode, LiveData, SwitchCause};
use super::ports::{ActuatorPort, ClockPort, ConfigPort, EventSink, SensorPort};

/// Settings must stay dirty this long before auto-save flushes them.
pub const AUTO_SAVE_DELAY_MS: u64 = 5_000;

// ───────────────────────────────────────────────────────────────
// ControlLoop
// ───────────────────────────────────────────────────────────────

/// The control loop orchestrates all pump-control logic.
pub struct ControlLoop {
    filter: DistanceFilter,
    supervisor: ErrorSupervisor,
    hysteresis: PumpHysteresisController,
    indicator: IndicatorController,
    mode: ControlMode,
    pump_on: bool,
    current_distance_cm: f32,
    /// Live settings. `current_distance_cm` and `manual_mode` mirror the
    /// loop's own state so a read-back shows what the loop sees.
    settings: ControlSettings,
    tick_count: u64,
    /// Clock reading of the most recent tick.
    last_tick_ms: u64,
    config_dirty: bool,
    dirty_since_ms: u64,
    save_requested: bool,
}

impl ControlLoop {
    /// Construct the loop from settings. The pump starts OFF and error
    /// tracking starts Normal; `manual_mode` in `settings` picks the mode.
    pub fn new(settings: ControlSettings) -> Self {
        let mode = if settings.manual_mode {
            ControlMode::Manual
        } else {
            ControlMode::Automatic
        };
        let hysteresis = PumpHysteresisController::new(settings.thresholds());
        if !settings.band_is_ordered() {
            warn!(
                "Trigger band inverted (on {:.1} cm >= off {:.1} cm), pump will chatter",
                settings.on_distance_cm, settings.off_distance_cm
            );
        }

        Self {
            filter: DistanceFilter::new(),
            supervisor: ErrorSupervisor::new(),
            hysteresis,
            indicator: IndicatorController::new(),
            mode,
            pump_on: false,
            current_distance_cm: 0.0,
            settings,
            tick_count: 0,
            last_tick_ms: 0,
            config_dirty: false,
            dirty_since_ms: 0,
            save_requested: false,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Announce the initial mode. Call once before the first [`update`].
    ///
    /// [`update`]: Self::update
    pub fn start(&mut self, sink: &mut impl EventSink) {
        sink.emit(&ControlEvent::Started(self.mode));
        info!(
            "ControlLoop started in {:?} mode (on <= {:.1} cm, off >= {:.1} cm)",
            self.mode, self.settings.on_distance_cm, self.settings.off_distance_cm
        );
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one control cycle: read → filter → supervise → decide → drive.
    ///
    /// The `hw` parameter satisfies **both** [`SensorPort`] and
    /// [`ActuatorPort`]; this avoids a double mutable borrow while
    /// keeping the port boundary explicit.
    pub fn update(
        &mut self,
        hw: &mut (impl SensorPort + ActuatorPort),
        clock: &impl ClockPort,
        sink: &mut impl EventSink,
    ) {
        self.tick_count += 1;

        // 1. Blocking read (settle delay lives in the sensor port), then
        //    take the timestamp so debounce sees post-read time.
        let raw = hw.sample_distance_cm();
        let now = clock.now_ms();
        self.last_tick_ms = now;

        // 2. Filter and publish
        let filtered = self.filter.sample(raw);
        self.current_distance_cm = filtered;
        self.settings.current_distance_cm = filtered;

        // 3/4. Mode-specific control
        match self.mode {
            ControlMode::Automatic => self.run_automatic(filtered, now, hw, sink),
            ControlMode::Manual => self.supervisor.suspend(),
        }

        // 5. Indicator
        let output = self
            .indicator
            .tick(self.supervisor.is_latched(), self.pump_on, now);
        hw.set_indicator(output);
    }

    fn run_automatic(
        &mut self,
        filtered: f32,
        now: u64,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) {
        let prev = self.supervisor.state();
        let state = self.supervisor.observe(filtered, now);
        emit_fault_transition(prev, state, filtered, sink);

        let next = self.hysteresis.decide(filtered, self.pump_on, state);
        if next != self.pump_on {
            let cause = if state.is_latched() {
                warn!("Sensor fault latched, pump forced OFF");
                SwitchCause::FaultLatched
            } else {
                info!(
                    "Water level {} ({:.1} cm), pump {}",
                    if next { "high" } else { "low" },
                    filtered,
                    if next { "ON" } else { "OFF" }
                );
                SwitchCause::Hysteresis
            };
            sink.emit(&ControlEvent::PumpSwitched {
                on: next,
                distance_cm: filtered,
                cause,
            });
        }
        self.pump_on = next;
        hw.set_pump(next);
    }

    // ── Commands ──────────────────────────────────────────────

    /// Enter or leave manual override.
    ///
    /// Entering manual clears any pending or latched fault immediately.
    /// Leaving it re-arms error tracking from Normal; the pump keeps its
    /// current state until the next hysteresis decision.
    pub fn set_manual_mode(&mut self, enabled: bool, sink: &mut impl EventSink) {
        let mode = if enabled {
            ControlMode::Manual
        } else {
            ControlMode::Automatic
        };

        let had_fault = self.supervisor.state() != ErrorState::Normal;
        self.supervisor.suspend();
        if had_fault {
            sink.emit(&ControlEvent::FaultCleared);
        }

        self.settings.manual_mode = enabled;
        if mode != self.mode {
            self.mode = mode;
            info!("Switched to {:?} mode", mode);
            sink.emit(&ControlEvent::ModeChanged(mode));
        }
    }

    /// Drive the pump directly. Only honoured in manual mode.
    pub fn set_pump_state(
        &mut self,
        on: bool,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) {
        if self.mode != ControlMode::Manual {
            debug!("Ignoring pump {} request in automatic mode", if on { "ON" } else { "OFF" });
            return;
        }
        if on != self.pump_on {
            sink.emit(&ControlEvent::PumpSwitched {
                on,
                distance_cm: self.current_distance_cm,
                cause: SwitchCause::Manual,
            });
        }
        self.pump_on = on;
        hw.set_pump(on);
        info!("Manual pump state set to {}", if on { "ON" } else { "OFF" });
    }

    /// Process an external command (web task, button, serial).
    ///
    /// `UpdateSettings` values that fail [`ControlSettings::validate`] are
    /// dropped and the live settings stay as they were.
    pub fn handle_command(
        &mut self,
        cmd: ControlCommand,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) {
        match cmd {
            ControlCommand::SetManualMode(enabled) => self.set_manual_mode(enabled, sink),
            ControlCommand::SetPumpState(on) => self.set_pump_state(on, hw, sink),
            ControlCommand::ManualPump(on) => {
                self.set_manual_mode(true, sink);
                self.set_pump_state(on, hw, sink);
            }
            ControlCommand::ResetManualMode => self.set_manual_mode(false, sink),
            ControlCommand::UpdateSettings(new_settings) => self.apply_settings(new_settings),
            ControlCommand::SaveSettings => {
                self.mark_config_dirty();
                self.save_requested = true;
                info!("Explicit settings save requested (will flush on next auto-save check)");
            }
        }
    }

    fn apply_settings(&mut self, mut incoming: ControlSettings) {
        // Runtime fields are owned by the loop, not by the sender.
        incoming.manual_mode = self.settings.manual_mode;
        incoming.current_distance_cm = self.current_distance_cm;

        if let Err(e) = incoming.validate() {
            warn!("Rejected settings update ({}), keeping previous settings", e);
            return;
        }
        if !incoming.band_is_ordered() {
            warn!(
                "Trigger band inverted (on {:.1} cm >= off {:.1} cm), pump will chatter",
                incoming.on_distance_cm, incoming.off_distance_cm
            );
        }
        self.hysteresis.set_thresholds(incoming.thresholds());
        self.settings = incoming;
        self.mark_config_dirty();
        info!(
            "Settings updated at runtime (on <= {:.1} cm, off >= {:.1} cm)",
            self.settings.on_distance_cm, self.settings.off_distance_cm
        );
    }

    // ── Queries ───────────────────────────────────────────────

    /// Latest filtered distance in centimetres.
    pub fn current_distance(&self) -> f32 {
        self.current_distance_cm
    }

    pub fn pump_state(&self) -> bool {
        self.pump_on
    }

    /// True only while a sensor fault is latched.
    pub fn is_error_state(&self) -> bool {
        self.supervisor.is_latched()
    }

    pub fn error_state(&self) -> ErrorState {
        self.supervisor.state()
    }

    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Snapshot for the live-data report.
    pub fn live_data(&self) -> LiveData {
        LiveData {
            current_distance: self.current_distance_cm,
            pump_state: self.pump_on,
            is_error_state: self.is_error_state(),
            manual_mode: self.mode == ControlMode::Manual,
        }
    }

    /// Clone of the live settings (for read-back or delta updates).
    pub fn current_settings(&self) -> ControlSettings {
        self.settings.clone()
    }

    // ── Settings dirty-flag management ────────────────────────

    /// Mark the settings as modified.
    pub fn mark_config_dirty(&mut self) {
        if !self.config_dirty {
            self.config_dirty = true;
            self.dirty_since_ms = self.last_tick_ms;
        }
    }

    /// Flush settings once they have been dirty for [`AUTO_SAVE_DELAY_MS`],
    /// or straight away after an explicit save request.
    /// Returns `true` if the settings were saved.
    pub fn auto_save_if_needed(&mut self, clock: &impl ClockPort, store: &impl ConfigPort) -> bool {
        if !self.config_dirty {
            return false;
        }
        let waited = clock.now_ms().saturating_sub(self.dirty_since_ms);
        if !self.save_requested && waited < AUTO_SAVE_DELAY_MS {
            return false;
        }
        match store.save(&self.settings) {
            Ok(()) => {
                self.config_dirty = false;
                self.save_requested = false;
                info!("Settings auto-saved");
                true
            }
            Err(e) => {
                warn!("Settings auto-save failed: {}", e);
                false
            }
        }
    }

    /// Force-save if dirty (call before a reboot).
    pub fn force_save_if_dirty(&mut self, store: &impl ConfigPort) {
        if !self.config_dirty {
            return;
        }
        match store.save(&self.settings) {
            Ok(()) => {
                self.config_dirty = false;
                self.save_requested = false;
                info!("Settings force-saved");
            }
            Err(e) => {
                warn!("Settings force-save failed: {}", e);
            }
        }
    }

    /// Whether the settings have unsaved changes.
    pub fn is_config_dirty(&self) -> bool {
        self.config_dirty
    }
}

fn emit_fault_transition(
    prev: ErrorState,
    next: ErrorState,
    distance_cm: f32,
    sink: &mut impl EventSink,
) {
    match (prev, next) {
        (ErrorState::Normal, ErrorState::PendingError { .. }) => {
            sink.emit(&ControlEvent::FaultPending { distance_cm });
        }
        (ErrorState::PendingError { .. }, ErrorState::Latched) => {
            sink.emit(&ControlEvent::FaultLatched);
        }
        (ErrorState::PendingError { .. } | ErrorState::Latched, ErrorState::Normal) => {
            sink.emit(&ControlEvent::FaultCleared);
        }
        _ => {}
    }
}
