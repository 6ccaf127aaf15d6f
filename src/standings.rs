//! Final standings once every racer has reached the goal
//!
//! Built from the frozen finish times of a completed run.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::sim::{CurveKind, RankingSnapshot};

/// A single finisher
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StandingEntry {
    pub kind: CurveKind,
    /// Seconds from start to goal
    pub final_time: f64,
    /// 1-indexed; equal times share a place
    pub place: usize,
}

/// Finishers, fastest first
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Standings {
    pub entries: Vec<StandingEntry>,
}

impl Standings {
    /// Order frozen times ascending; equal times keep curve order
    pub fn from_frozen(snapshot: &RankingSnapshot) -> Self {
        let mut times: Vec<(CurveKind, f64)> = snapshot
            .frozen_time
            .iter()
            .map(|(kind, time)| (*kind, *time))
            .collect();
        times.sort_by(|a, b| a.1.total_cmp(&b.1));

        let mut entries: Vec<StandingEntry> = Vec::with_capacity(times.len());
        for (i, (kind, final_time)) in times.into_iter().enumerate() {
            let place = match entries.last() {
                Some(prev) if prev.final_time == final_time => prev.place,
                _ => i + 1,
            };
            entries.push(StandingEntry {
                kind,
                final_time,
                place,
            });
        }
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn winner(&self) -> Option<&StandingEntry> {
        self.entries.first()
    }

    pub fn entry(&self, kind: CurveKind) -> Option<&StandingEntry> {
        self.entries.iter().find(|e| e.kind == kind)
    }

    /// Seconds behind the winner
    pub fn margin(&self, kind: CurveKind) -> Option<f64> {
        let winner = self.winner()?;
        self.entry(kind).map(|e| e.final_time - winner.final_time)
    }
}

impl fmt::Display for Standings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            write!(
                f,
                "{}. {:<9} {}",
                entry.place,
                entry.kind.label(),
                format_time(entry.final_time)
            )?;
            if let Some(margin) = self.margin(entry.kind).filter(|m| *m > 0.0) {
                write!(f, " (+{})", format_time(margin))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Fixed display format for times
pub fn format_time(secs: f64) -> String {
    format!("{:.2}s", secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{RankingEngine, build_curves};

    fn completed(shape: f64) -> RankingSnapshot {
        let curves = build_curves(shape);
        let mut engine = RankingEngine::new();
        engine.evaluate(100.0, &curves);
        engine.snapshot().clone()
    }

    #[test]
    fn test_empty_until_complete() {
        let mut engine = RankingEngine::new();
        engine.evaluate(1.0, &build_curves(0.0));
        assert!(Standings::from_frozen(engine.snapshot()).is_empty());
    }

    #[test]
    fn test_order_and_shared_place() {
        let standings = Standings::from_frozen(&completed(0.0));
        assert_eq!(standings.len(), 4);

        let order: Vec<_> = standings.entries.iter().map(|e| e.kind).collect();
        assert_eq!(
            order,
            vec![
                CurveKind::Cycloid,
                CurveKind::Tunable,
                CurveKind::Parabola,
                CurveKind::Straight
            ]
        );
        // Cycloid and Tunable tie at shape 0
        assert_eq!(standings.entry(CurveKind::Cycloid).map(|e| e.place), Some(1));
        assert_eq!(standings.entry(CurveKind::Tunable).map(|e| e.place), Some(1));
        assert_eq!(standings.entry(CurveKind::Parabola).map(|e| e.place), Some(3));
        assert_eq!(standings.winner().map(|e| e.kind), Some(CurveKind::Cycloid));
    }

    #[test]
    fn test_tunable_drops_back_with_shape() {
        let standings = Standings::from_frozen(&completed(1.0));
        let last = standings.entries.last().map(|e| e.kind);
        assert_eq!(last, Some(CurveKind::Tunable));
        let margin = standings.margin(CurveKind::Tunable).unwrap_or_default();
        assert!((margin - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_format() {
        assert_eq!(format_time(2.0), "2.00s");
        assert_eq!(format_time(2.456), "2.46s");
        let text = Standings::from_frozen(&completed(0.0)).to_string();
        assert!(text.starts_with("1. Cycloid"));
        assert!(text.contains("Straight  2.50s (+0.50s)"));
    }
}
