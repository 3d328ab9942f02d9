//! Sensor-fault supervisor.
//!
//! Runs **every automatic tick before the pump decision** and classifies
//! the filtered distance into an [`ErrorState`].
//!
//! ## Fault lifecycle
//!
//! ```text
//!   NORMAL ──[out of range]──▶ PENDING(since) ──[> 3 s, still out]──▶ LATCHED
//!     ▲                            │                                    │
//!     └──────────[in range]────────┴────────────[in range]──────────────┘
//!
//!   any state ──[manual override]──▶ NORMAL
//! ```
//!
//! Tripping is slow (debounced) and recovery is immediate. While latched
//! the hysteresis controller forces the pump off.

use log::{error, info, warn};

use crate::error::ControlFault;

/// Shortest distance (cm) the sensor reports reliably.
pub const MIN_VALID_DISTANCE_CM: f32 = 30.0;
/// Longest distance (cm) treated as a real water level.
pub const MAX_VALID_DISTANCE_CM: f32 = 380.0;
/// How long an out-of-range condition must persist before latching.
pub const DEBOUNCE_DELAY_MS: u64 = 3_000;

/// Sensor-fault classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorState {
    /// Readings are within the sensor envelope.
    Normal,
    /// Out of range since `since_ms`; debounce timer running.
    PendingError { since_ms: u64 },
    /// Out of range for longer than the debounce delay.
    Latched,
}

impl ErrorState {
    pub fn is_latched(self) -> bool {
        matches!(self, Self::Latched)
    }

    /// The domain fault this state represents, if any.
    pub fn fault(self) -> Option<ControlFault> {
        match self {
            Self::Normal => None,
            Self::PendingError { .. } => Some(ControlFault::SensorOutOfRange),
            Self::Latched => Some(ControlFault::Latched),
        }
    }
}

/// True if `distance_cm` lies inside the sensor's operating envelope.
pub fn in_range(distance_cm: f32) -> bool {
    (MIN_VALID_DISTANCE_CM..=MAX_VALID_DISTANCE_CM).contains(&distance_cm)
}

/// Debounced sensor-fault supervisor.
pub struct ErrorSupervisor {
    state: ErrorState,
    debounce_ms: u64,
}

impl Default for ErrorSupervisor {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorSupervisor {
    pub fn new() -> Self {
        Self {
            state: ErrorState::Normal,
            debounce_ms: DEBOUNCE_DELAY_MS,
        }
    }

    /// Classify one filtered reading taken at `now_ms`.
    pub fn observe(&mut self, filtered_cm: f32, now_ms: u64) -> ErrorState {
        self.state = if in_range(filtered_cm) {
            if self.state != ErrorState::Normal {
                info!("SENSOR FAULT CLEARED: {:.1} cm back in range", filtered_cm);
            }
            ErrorState::Normal
        } else {
            match self.state {
                ErrorState::Normal => {
                    warn!(
                        "{}: {:.1} cm, starting {} ms debounce",
                        ControlFault::SensorOutOfRange,
                        filtered_cm,
                        self.debounce_ms
                    );
                    ErrorState::PendingError { since_ms: now_ms }
                }
                ErrorState::PendingError { since_ms }
                    if now_ms.saturating_sub(since_ms) > self.debounce_ms =>
                {
                    error!("SENSOR FAULT LATCHED: out of range for > {} ms", self.debounce_ms);
                    ErrorState::Latched
                }
                other => other,
            }
        };
        self.state
    }

    /// Force `Normal` while a human is driving the pump directly.
    pub fn suspend(&mut self) {
        if self.state != ErrorState::Normal {
            info!("SENSOR FAULT CLEARED: manual override active");
        }
        self.state = ErrorState::Normal;
    }

    pub fn state(&self) -> ErrorState {
        self.state
    }

    pub fn is_latched(&self) -> bool {
        self.state.is_latched()
    }
}
