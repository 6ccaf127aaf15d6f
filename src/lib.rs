//! Descent Race - four descent curves racing from (0,0) to (1,1)
//!
//! Core modules:
//! - `sim`: Pure simulation (curve laws, pausable clock, live ranking)
//! - `controller`: Frame-driven state machine that feeds a renderer
//! - `platform`: Frame scheduling (manual/headless and requestAnimationFrame)
//! - `renderer`: Read-model consumer seam
//! - `standings`: Final results once every racer has arrived
//! - `settings`: Persisted user preferences

pub mod controller;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod standings;

pub use controller::{AnimationController, DisplayMetric, FrameView, RacerView, RunStatus};
pub use settings::{Settings, SpeedPreset};
pub use standings::Standings;

use glam::DVec2;

/// Race configuration constants
pub mod consts {
    use glam::DVec2;

    /// Shared start anchor of every curve
    pub const START: DVec2 = DVec2::ZERO;
    /// Shared goal anchor of every curve
    pub const GOAL: DVec2 = DVec2::ONE;

    /// Seconds for the cycloid racer to reach the goal
    pub const CYCLOID_TIME: f64 = 2.0;
    /// Seconds for the straight-line racer
    pub const STRAIGHT_TIME: f64 = 2.5;
    /// Seconds for the parabola racer
    pub const PARABOLA_TIME: f64 = 2.2;
    /// Tunable racer duration at shape 0 (it is the cycloid there)
    pub const TUNABLE_BASE_TIME: f64 = 2.0;

    /// Frame timestamps arrive in milliseconds
    pub const MS_PER_SECOND: f64 = 1000.0;
    /// Nominal display refresh used by headless drivers
    pub const FRAME_MS: f64 = 1000.0 / 60.0;

    /// Finest polyline a track is ever sampled at
    pub const MAX_PATH_SEGMENTS: usize = 4096;
}

/// Euclidean distance from a point to the shared goal
#[inline]
pub fn distance_to_goal(pos: DVec2) -> f64 {
    pos.distance(consts::GOAL)
}
