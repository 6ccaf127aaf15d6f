//! Live ranking by distance to goal
//!
//! Each evaluation recomputes progress and distance for every curve, orders
//! racers closest-first and keeps the previous published order around so a
//! renderer can show who moved up or down.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::curve::{Curve, CurveKind, longest_time};
use crate::distance_to_goal;

/// Rank movement between the two most recent published orderings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RankDelta {
    Up,
    Down,
    #[default]
    None,
}

impl RankDelta {
    /// Classify a signed shift (previous index minus current index)
    pub fn from_shift(shift: i64) -> Self {
        match shift {
            s if s > 0 => RankDelta::Up,
            s if s < 0 => RankDelta::Down,
            _ => RankDelta::None,
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            RankDelta::Up => "▲",
            RankDelta::Down => "▼",
            RankDelta::None => "",
        }
    }
}

/// Per-run ranking state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RankingSnapshot {
    pub progress: BTreeMap<CurveKind, f64>,
    pub distance: BTreeMap<CurveKind, f64>,
    /// Closest to the goal first
    pub rankings: Vec<CurveKind>,
    /// Ordering published before the most recent change
    pub previous_rankings: Vec<CurveKind>,
    /// Each curve's own duration, written once when the run completes
    pub frozen_time: BTreeMap<CurveKind, f64>,
}

impl RankingSnapshot {
    /// Signed rank shift; `None` if the label is missing from either ordering
    pub fn rank_shift(&self, kind: CurveKind) -> Option<i64> {
        let prev = self.previous_rankings.iter().position(|k| *k == kind)?;
        let cur = self.rankings.iter().position(|k| *k == kind)?;
        Some(prev as i64 - cur as i64)
    }

    pub fn rank_delta(&self, kind: CurveKind) -> RankDelta {
        self.rank_shift(kind)
            .map(RankDelta::from_shift)
            .unwrap_or_default()
    }

    /// 1-indexed place in the current ordering
    pub fn place(&self, kind: CurveKind) -> Option<usize> {
        self.rankings.iter().position(|k| *k == kind).map(|i| i + 1)
    }
}

/// Result of one evaluation
#[derive(Debug, Clone, Copy)]
pub struct Evaluation<'a> {
    pub snapshot: &'a RankingSnapshot,
    /// True only on the evaluation that first detected completion
    pub completed_now: bool,
}

#[derive(Debug, Clone, Default)]
pub struct RankingEngine {
    snapshot: RankingSnapshot,
    complete: bool,
}

impl RankingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> &RankingSnapshot {
        &self.snapshot
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn rank_delta(&self, kind: CurveKind) -> RankDelta {
        self.snapshot.rank_delta(kind)
    }

    /// Drop the whole snapshot (new run or reset)
    pub fn clear(&mut self) {
        self.snapshot = RankingSnapshot::default();
        self.complete = false;
    }

    /// Recompute positions, distances and ordering at `elapsed` seconds
    pub fn evaluate(&mut self, elapsed: f64, curves: &[Curve]) -> Evaluation<'_> {
        let elapsed = if elapsed.is_nan() { 0.0 } else { elapsed.max(0.0) };

        let snap = &mut self.snapshot;
        snap.progress.clear();
        snap.distance.clear();
        for curve in curves {
            let progress = curve.progress_at(elapsed);
            let distance = distance_to_goal(curve.position(progress));
            snap.progress.insert(curve.kind, progress);
            snap.distance.insert(curve.kind, distance);
        }

        // Seed with the last published order so the stable sort keeps ties put;
        // curves not ranked yet follow in curve order.
        let mut order: Vec<CurveKind> = snap
            .rankings
            .iter()
            .copied()
            .filter(|k| snap.distance.contains_key(k))
            .collect();
        for curve in curves {
            if !order.contains(&curve.kind) {
                order.push(curve.kind);
            }
        }
        let distance = &snap.distance;
        order.sort_by(|a, b| distance[a].total_cmp(&distance[b]));

        if order != snap.rankings {
            snap.previous_rankings = std::mem::replace(&mut snap.rankings, order);
        }

        let mut completed_now = false;
        if !self.complete && !curves.is_empty() && elapsed >= longest_time(curves) {
            self.complete = true;
            completed_now = true;
            for curve in curves {
                snap.frozen_time.entry(curve.kind).or_insert(curve.total_time);
            }
        }

        Evaluation {
            snapshot: &self.snapshot,
            completed_now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::curve::build_curves;
    use proptest::prelude::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_all_start_at_sqrt2() {
        let curves = build_curves(0.0);
        let mut engine = RankingEngine::new();
        let eval = engine.evaluate(0.0, &curves);
        for kind in CurveKind::ALL {
            assert!((eval.snapshot.distance[&kind] - std::f64::consts::SQRT_2).abs() < EPS);
            assert_eq!(eval.snapshot.progress[&kind], 0.0);
        }
        // All tied: curve order, and it sticks
        assert_eq!(eval.snapshot.rankings, CurveKind::ALL.to_vec());
        assert!(!eval.completed_now);
        let again = engine.evaluate(0.0, &curves);
        assert_eq!(again.snapshot.rankings, CurveKind::ALL.to_vec());
    }

    #[test]
    fn test_two_seconds_at_unit_speed() {
        let curves = build_curves(0.0);
        let mut engine = RankingEngine::new();
        let snap = engine.evaluate(2.0, &curves).snapshot;

        assert_eq!(snap.progress[&CurveKind::Cycloid], 1.0);
        assert_eq!(snap.distance[&CurveKind::Cycloid], 0.0);

        assert!((snap.progress[&CurveKind::Straight] - 0.8).abs() < EPS);
        assert!((snap.distance[&CurveKind::Straight] - 0.2 * std::f64::consts::SQRT_2).abs() < 1e-6);
        assert!((snap.distance[&CurveKind::Straight] - 0.2828).abs() < 1e-4);
    }

    #[test]
    fn test_rank_deltas_after_overtake() {
        let curves = build_curves(0.0);
        let mut engine = RankingEngine::new();
        engine.evaluate(0.0, &curves);
        // Nothing archived yet: no indicators
        for kind in CurveKind::ALL {
            assert_eq!(engine.rank_delta(kind), RankDelta::None);
        }

        let snap = engine.evaluate(0.1, &curves).snapshot;
        assert_eq!(
            snap.rankings,
            vec![
                CurveKind::Parabola,
                CurveKind::Straight,
                CurveKind::Cycloid,
                CurveKind::Tunable
            ]
        );
        assert_eq!(snap.previous_rankings, CurveKind::ALL.to_vec());
        assert_eq!(snap.rank_shift(CurveKind::Parabola), Some(2));
        assert_eq!(snap.rank_delta(CurveKind::Parabola), RankDelta::Up);
        assert_eq!(snap.rank_delta(CurveKind::Cycloid), RankDelta::Down);
        assert_eq!(snap.rank_delta(CurveKind::Straight), RankDelta::None);
        assert_eq!(snap.place(CurveKind::Parabola), Some(1));
    }

    #[test]
    fn test_unchanged_order_keeps_previous() {
        let curves = build_curves(0.0);
        let mut engine = RankingEngine::new();
        engine.evaluate(0.0, &curves);
        engine.evaluate(0.1, &curves);
        let before = engine.snapshot().previous_rankings.clone();
        engine.evaluate(0.11, &curves);
        assert_eq!(engine.snapshot().previous_rankings, before);
        assert_eq!(engine.rank_delta(CurveKind::Parabola), RankDelta::Up);
    }

    #[test]
    fn test_ties_keep_previous_relative_order() {
        // Cycloid and Tunable are identical at shape 0; seed Tunable first
        let mut reversed = build_curves(0.0);
        reversed.reverse();
        let mut engine = RankingEngine::new();
        engine.evaluate(0.0, &reversed);
        assert_eq!(engine.snapshot().rankings[0], CurveKind::Tunable);

        let curves = build_curves(0.0);
        for step in 1..=30 {
            let snap = engine.evaluate(step as f64 * 0.1, &curves).snapshot;
            let t = snap.place(CurveKind::Tunable);
            let c = snap.place(CurveKind::Cycloid);
            assert!(t < c, "tie reordered at step {step}");
        }
    }

    #[test]
    fn test_completion_freezes_times_once() {
        let mut engine = RankingEngine::new();
        let curves = build_curves(0.0);
        assert!(!engine.evaluate(2.49, &curves).completed_now);
        assert!(engine.snapshot().frozen_time.is_empty());

        let eval = engine.evaluate(2.5, &curves);
        assert!(eval.completed_now);
        assert_eq!(eval.snapshot.frozen_time[&CurveKind::Straight], 2.5);
        assert_eq!(eval.snapshot.frozen_time[&CurveKind::Cycloid], 2.0);

        // Later evaluations with a rebuilt set never overwrite the frozen values
        let reshaped = build_curves(1.0);
        let eval = engine.evaluate(10.0, &reshaped);
        assert!(!eval.completed_now);
        assert!(engine.is_complete());
        assert_eq!(engine.snapshot().frozen_time[&CurveKind::Tunable], 2.0);

        engine.clear();
        assert!(!engine.is_complete());
        assert!(engine.snapshot().rankings.is_empty());
    }

    #[test]
    fn test_degenerate_duration_completes_immediately() {
        let mut curves = build_curves(0.0);
        for c in &mut curves {
            c.total_time = 0.0;
        }
        let mut engine = RankingEngine::new();
        let eval = engine.evaluate(0.0, &curves);
        assert!(eval.completed_now);
        for kind in CurveKind::ALL {
            assert_eq!(eval.snapshot.progress[&kind], 1.0);
            assert_eq!(eval.snapshot.distance[&kind], 0.0);
        }
    }

    #[test]
    fn test_rank_delta_classification() {
        assert_eq!(RankDelta::from_shift(3), RankDelta::Up);
        assert_eq!(RankDelta::from_shift(-1), RankDelta::Down);
        assert_eq!(RankDelta::from_shift(0), RankDelta::None);
        assert_eq!(RankDelta::Up.arrow(), "▲");
    }

    proptest! {
        #[test]
        fn prop_ranking_sorted_and_distances_valid(
            elapsed in 0.0f64..6.0,
            shape in 0.0f64..=1.0,
        ) {
            let curves = build_curves(shape);
            let mut engine = RankingEngine::new();
            let snap = engine.evaluate(elapsed, &curves).snapshot;
            prop_assert_eq!(snap.rankings.len(), curves.len());
            for pair in snap.rankings.windows(2) {
                prop_assert!(snap.distance[&pair[0]] <= snap.distance[&pair[1]]);
            }
            for d in snap.distance.values() {
                prop_assert!(*d >= 0.0 && d.is_finite());
            }
        }

        #[test]
        fn prop_zero_shape_twins_never_swap(
            mut times in proptest::collection::vec(0.0f64..4.0, 1..30),
        ) {
            times.sort_by(f64::total_cmp);
            let curves = build_curves(0.0);
            let mut engine = RankingEngine::new();
            let mut first: Option<bool> = None;
            for t in times {
                let snap = engine.evaluate(t, &curves).snapshot;
                let cycloid_ahead = snap.place(CurveKind::Cycloid) < snap.place(CurveKind::Tunable);
                match first {
                    None => first = Some(cycloid_ahead),
                    Some(f) => prop_assert_eq!(f, cycloid_ahead),
                }
            }
        }
    }
}
