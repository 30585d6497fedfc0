use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Phases of one photo session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoothPhase {
    Idle,
    Prep,
    Capturing,
    PostCapture,
    RestartCooldown,
    /// Entered on an unrecoverable capture error, left immediately for `Idle`
    Failed,
}

/// Transient controller state, reset at the start of every session
#[derive(Debug, Clone)]
pub struct BoothState {
    phase: BoothPhase,
    phase_started: Instant,
    captured: usize,
}

impl BoothState {
    pub fn new() -> Self {
        Self {
            phase: BoothPhase::Idle,
            phase_started: Instant::now(),
            captured: 0,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn enter(&mut self, phase: BoothPhase) {
        debug!(
            "Phase {:?} -> {:?} after {:?}",
            self.phase,
            phase,
            self.elapsed_in_phase()
        );
        self.phase = phase;
        self.phase_started = Instant::now();
    }

    pub fn record_capture(&mut self) {
        self.captured += 1;
    }

    pub fn phase(&self) -> BoothPhase {
        self.phase
    }

    pub fn captured(&self) -> usize {
        self.captured
    }

    pub fn elapsed_in_phase(&self) -> Duration {
        self.phase_started.elapsed()
    }
}

impl Default for BoothState {
    fn default() -> Self {
        Self::new()
    }
}
