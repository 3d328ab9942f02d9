//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured control events to the
//! ESP-IDF logger (UART / USB-CDC in production). A web-socket push
//! adapter would implement the same trait.

use log::{info, warn};

use crate::app::events::ControlEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`ControlEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &ControlEvent) {
        match event {
            ControlEvent::Telemetry(t) => {
                info!(
                    "TELEM | distance={:.1}cm | pump={} | error={} | manual={}",
                    t.current_distance,
                    if t.pump_state { "ON" } else { "OFF" },
                    t.is_error_state,
                    t.manual_mode,
                );
            }
            ControlEvent::PumpSwitched {
                on,
                distance_cm,
                cause,
            } => {
                info!(
                    "PUMP | {} at {:.1}cm | cause={:?}",
                    if *on { "ON" } else { "OFF" },
                    distance_cm,
                    cause
                );
            }
            ControlEvent::FaultPending { distance_cm } => {
                warn!("FAULT | pending, distance={:.1}cm", distance_cm);
            }
            ControlEvent::FaultLatched => {
                warn!("FAULT | latched, pump forced OFF");
            }
            ControlEvent::FaultCleared => {
                info!("FAULT | cleared");
            }
            ControlEvent::ModeChanged(mode) => {
                info!("MODE | {:?}", mode);
            }
            ControlEvent::Started(mode) => {
                info!("START | mode={:?}", mode);
            }
        }
    }
}
