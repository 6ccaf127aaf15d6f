//! Deterministic race simulation
//!
//! Everything here is pure and frame-rate independent:
//! - Curve laws are pure functions of progress
//! - The clock only moves when fed frame timestamps while running
//! - Ranking ties resolve against the previous published order
//! - No rendering or platform dependencies

pub mod clock;
pub mod curve;
pub mod ranking;

pub use clock::{Phase, SimulationClock};
pub use curve::{Curve, CurveKind, build_curves, longest_time};
pub use ranking::{Evaluation, RankDelta, RankingEngine, RankingSnapshot};
