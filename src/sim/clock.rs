//! Pausable simulation clock
//!
//! Elapsed time only accumulates while running. Frame timestamps come from the
//! display (milliseconds); the first frame after start/resume is a baseline so a
//! long pause never turns into one huge delta.

use serde::{Deserialize, Serialize};

use crate::consts::MS_PER_SECOND;

/// Clock phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Phase {
    /// Never started, reset, or finished (see [`SimulationClock::is_completed`])
    #[default]
    Idle,
    Running,
    Paused,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationClock {
    phase: Phase,
    /// Seconds banked across pause boundaries
    accumulated: f64,
    /// Timestamp (ms) of the last frame seen while running
    last_frame: Option<f64>,
    speed_multiplier: f64,
    /// Set when a run reaches the end; cleared by start/reset
    completed: bool,
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationClock {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            accumulated: 0.0,
            last_frame: None,
            speed_multiplier: 1.0,
            completed: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Accumulated simulated seconds
    pub fn elapsed(&self) -> f64 {
        self.accumulated
    }

    pub fn speed_multiplier(&self) -> f64 {
        self.speed_multiplier
    }

    pub fn last_frame(&self) -> Option<f64> {
        self.last_frame
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    /// Begin a fresh run from any phase
    pub fn start(&mut self) {
        self.phase = Phase::Running;
        self.accumulated = 0.0;
        self.last_frame = None;
        self.completed = false;
    }

    pub fn pause(&mut self) {
        if self.phase == Phase::Running {
            self.phase = Phase::Paused;
            self.last_frame = None;
        }
    }

    pub fn resume(&mut self) {
        if self.phase == Phase::Paused {
            self.phase = Phase::Running;
            self.last_frame = None;
        }
    }

    pub fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.accumulated = 0.0;
        self.last_frame = None;
        self.completed = false;
    }

    /// End a run that reached the goal; elapsed time is kept for display
    pub fn finish(&mut self) {
        if self.phase == Phase::Running {
            self.phase = Phase::Idle;
            self.last_frame = None;
            self.completed = true;
        }
    }

    /// Rejects non-positive or non-finite values and returns whether it applied
    pub fn set_speed_multiplier(&mut self, value: f64) -> bool {
        if !value.is_finite() || value <= 0.0 {
            log::warn!("Ignoring invalid speed multiplier {}", value);
            return false;
        }
        self.speed_multiplier = value;
        true
    }

    /// Feed a frame timestamp (ms) and return accumulated elapsed seconds
    pub fn advance(&mut self, timestamp: f64) -> f64 {
        if self.phase != Phase::Running || !timestamp.is_finite() {
            return self.accumulated;
        }

        let baseline = match self.last_frame {
            Some(last) => {
                // Clock moving backward contributes nothing, and the baseline
                // stays at the latest timestamp seen so a glitch is not counted
                // again on the next frame
                let delta_ms = (timestamp - last).max(0.0);
                self.accumulated += delta_ms * self.speed_multiplier / MS_PER_SECOND;
                last.max(timestamp)
            }
            None => timestamp,
        };
        self.last_frame = Some(baseline);
        self.accumulated
    }
}
