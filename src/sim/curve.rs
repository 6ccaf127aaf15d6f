//! Descent curves and their parametric laws
//!
//! Every curve starts at `(0,0)` and ends at `(1,1)`. Curves are plain values:
//! changing the shape parameter rebuilds the whole set via [`build_curves`].

use std::f64::consts::PI;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// The four racers, in their canonical order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CurveKind {
    /// Brachistochrone (fastest descent)
    Cycloid,
    /// Direct line
    Straight,
    /// Quadratic arc
    Parabola,
    /// Cycloid bent by the shape parameter
    Tunable,
}

impl CurveKind {
    pub const ALL: [CurveKind; 4] = [
        CurveKind::Cycloid,
        CurveKind::Straight,
        CurveKind::Parabola,
        CurveKind::Tunable,
    ];

    /// Unique display label
    pub fn label(&self) -> &'static str {
        match self {
            CurveKind::Cycloid => "Cycloid",
            CurveKind::Straight => "Straight",
            CurveKind::Parabola => "Parabola",
            CurveKind::Tunable => "Tunable",
        }
    }

    pub fn from_label(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.label().eq_ignore_ascii_case(s))
    }

    /// Display color (RGBA), passed through to renderers untouched
    pub fn color(&self) -> [f32; 4] {
        match self {
            CurveKind::Cycloid => [0.90, 0.30, 0.25, 1.0],
            CurveKind::Straight => [0.25, 0.55, 0.95, 1.0],
            CurveKind::Parabola => [0.30, 0.80, 0.40, 1.0],
            CurveKind::Tunable => [0.95, 0.75, 0.20, 1.0],
        }
    }
}

/// One racer's path and duration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    pub kind: CurveKind,
    pub color: [f32; 4],
    /// Seconds to travel the whole path
    pub total_time: f64,
    /// Shape parameter the curve was built with (only the tunable law reads it)
    pub shape: f64,
}

impl Curve {
    pub fn new(kind: CurveKind, shape: f64) -> Self {
        let shape = clamp_shape(shape);
        let total_time = match kind {
            CurveKind::Cycloid => CYCLOID_TIME,
            CurveKind::Straight => STRAIGHT_TIME,
            CurveKind::Parabola => PARABOLA_TIME,
            CurveKind::Tunable => TUNABLE_BASE_TIME * (1.0 + shape),
        };
        Self {
            kind,
            color: kind.color(),
            total_time,
            shape,
        }
    }

    pub fn label(&self) -> &'static str {
        self.kind.label()
    }

    /// Position along the path at `progress` (clamped to [0,1])
    ///
    /// The endpoints are exact anchors so that a finished racer sits on the
    /// goal with zero distance regardless of trig round-off.
    pub fn position(&self, progress: f64) -> DVec2 {
        let t = if progress.is_finite() {
            progress.clamp(0.0, 1.0)
        } else {
            0.0
        };
        if t <= 0.0 {
            return START;
        }
        if t >= 1.0 {
            return GOAL;
        }

        match self.kind {
            CurveKind::Cycloid => {
                // (theta - sin theta) / pi, written so the tunable law at
                // shape 0 is bit-for-bit identical
                let theta = PI * t;
                DVec2::new(t - theta.sin() / PI, (1.0 - theta.cos()) / 2.0)
            }
            CurveKind::Straight => DVec2::new(t, t),
            CurveKind::Parabola => DVec2::new(t, t * (2.0 - t)),
            CurveKind::Tunable => {
                let theta = PI * t;
                let s = theta.sin();
                DVec2::new(t - s / PI, (1.0 - theta.cos()) / 2.0 + self.shape * s * s)
            }
        }
    }

    /// Fraction of the path covered after `elapsed` seconds
    ///
    /// A degenerate duration counts as already finished.
    pub fn progress_at(&self, elapsed: f64) -> f64 {
        if self.total_time <= 0.0 || !self.total_time.is_finite() {
            return 1.0;
        }
        if !elapsed.is_finite() {
            return if elapsed > 0.0 { 1.0 } else { 0.0 };
        }
        (elapsed / self.total_time).clamp(0.0, 1.0)
    }

    /// Evenly spaced points along the path, for drawing the track
    ///
    /// `segments` is clamped to `1..=MAX_PATH_SEGMENTS`.
    pub fn sample_path(&self, segments: usize) -> Vec<DVec2> {
        let segments = segments.clamp(1, MAX_PATH_SEGMENTS);
        (0..=segments)
            .map(|i| self.position(i as f64 / segments as f64))
            .collect()
    }

    /// Polyline approximation of the track length
    pub fn path_length(&self, segments: usize) -> f64 {
        self.sample_path(segments)
            .windows(2)
            .map(|w| w[0].distance(w[1]))
            .sum()
    }
}

fn clamp_shape(shape: f64) -> f64 {
    if shape.is_finite() {
        shape.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Build the full racer set for a shape parameter, in [`CurveKind::ALL`] order
pub fn build_curves(shape: f64) -> Vec<Curve> {
    CurveKind::ALL
        .into_iter()
        .map(|kind| Curve::new(kind, shape))
        .collect()
}

/// Longest duration in a set; the race is over once this much time has passed
pub fn longest_time(curves: &[Curve]) -> f64 {
    curves
        .iter()
        .map(|c| c.total_time)
        .filter(|t| t.is_finite())
        .fold(0.0, f64::max)
}
