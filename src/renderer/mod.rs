//! Renderer seam
//!
//! Renderers only read [`FrameView`]s; they never touch race state. Pixel
//! drawing lives outside this crate. [`LogRenderer`] is the headless default.

use crate::controller::{FrameView, RunStatus};
use crate::settings::Settings;
use crate::sim::{CurveKind, build_curves};

/// Spacing of the unit-square grid lines
pub const GRID_STEP: f64 = 0.25;

/// Consumer of per-tick frames
pub trait Renderer {
    fn draw(&mut self, frame: &FrameView);
}

impl<T: Renderer + ?Sized> Renderer for &mut T {
    fn draw(&mut self, frame: &FrameView) {
        (**self).draw(frame)
    }
}

/// Logs place changes and the final frame through the `log` facade
///
/// The first frame of each run also logs the backdrop: the grid (when
/// enabled) and every track sampled at `path_segments`.
#[derive(Debug, Default)]
pub struct LogRenderer {
    show_grid: bool,
    show_rank_deltas: bool,
    path_segments: usize,
    last_rankings: Vec<CurveKind>,
    backdrop_drawn: bool,
    frames: u64,
    lead_changes: u64,
}

impl LogRenderer {
    pub fn new(show_rank_deltas: bool) -> Self {
        Self::with_settings(&Settings {
            show_rank_deltas,
            ..Default::default()
        })
    }

    pub fn with_settings(settings: &Settings) -> Self {
        Self {
            show_grid: settings.show_grid,
            show_rank_deltas: settings.show_rank_deltas,
            path_segments: settings.path_segments,
            ..Default::default()
        }
    }

    /// Frames drawn since creation
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Times the leader changed (not counting the first frame of a run)
    pub fn lead_changes(&self) -> u64 {
        self.lead_changes
    }

    fn describe(&self, frame: &FrameView) -> String {
        if self.show_rank_deltas {
            return frame.to_string();
        }
        let places: Vec<String> = frame
            .leaderboard()
            .enumerate()
            .map(|(i, r)| format!("{}. {} ({})", i + 1, r.label, r.metric))
            .collect();
        format!("[{} {:.2}s] {}", frame.status.as_str(), frame.elapsed, places.join(" "))
    }

    /// Grid and track lines for the start of a run
    fn backdrop(&self, frame: &FrameView) -> Vec<String> {
        let mut lines = Vec::new();
        if self.show_grid {
            let steps = (1.0 / GRID_STEP).round() as usize;
            let ticks: Vec<String> = (0..=steps)
                .map(|i| format!("{:.2}", i as f64 * GRID_STEP))
                .collect();
            lines.push(format!("grid x/y at {}", ticks.join(" ")));
        }
        for curve in build_curves(frame.shape) {
            let points = curve.sample_path(self.path_segments).len();
            lines.push(format!(
                "{:<9} track {} points, length {:.3}, {:.2}s",
                curve.label(),
                points,
                curve.path_length(self.path_segments),
                curve.total_time
            ));
        }
        lines
    }
}

impl Renderer for LogRenderer {
    fn draw(&mut self, frame: &FrameView) {
        self.frames += 1;

        let fresh_run = self.last_rankings.is_empty() || frame.elapsed == 0.0;
        if fresh_run && !self.backdrop_drawn {
            for line in self.backdrop(frame) {
                log::info!("{}", line);
            }
            self.backdrop_drawn = true;
        } else if frame.elapsed > 0.0 {
            self.backdrop_drawn = false;
        }

        if frame.rankings != self.last_rankings {
            if !fresh_run && frame.rankings.first() != self.last_rankings.first() {
                self.lead_changes += 1;
            }
            log::info!("{}", self.describe(frame));
            self.last_rankings = frame.rankings.clone();
        } else if frame.status == RunStatus::Complete {
            log::info!("{}", self.describe(frame));
        } else {
            log::debug!("frame {} at {:.3}s", self.frames, frame.elapsed);
        }

        if frame.status == RunStatus::Complete {
            self.last_rankings.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::AnimationController;
    use crate::platform::ManualScheduler;

    fn run_to_completion(c: &mut AnimationController<ManualScheduler, &mut LogRenderer>) {
        // 62.5 ms steps keep elapsed exact in binary
        let mut ts = 0.0;
        while let Some(handle) = c.scheduler_mut().take_pending() {
            c.on_frame(handle, ts);
            ts += 62.5;
        }
    }

    #[test]
    fn test_counts_frames_and_lead_changes() {
        let mut renderer = LogRenderer::new(true);
        {
            let mut c = AnimationController::new(ManualScheduler::new(), &mut renderer);
            c.start();
            run_to_completion(&mut c);
            assert_eq!(c.status(), RunStatus::Complete);
        }
        // Baseline frame plus 40 steps to 2.5s
        assert_eq!(renderer.frames(), 41);
        // Parabola leads early, the cycloid takes over
        assert!(renderer.lead_changes() >= 1);
    }

    #[test]
    fn test_describe_without_arrows() {
        let mut renderer = LogRenderer::new(false);
        let mut c = AnimationController::new(ManualScheduler::new(), &mut renderer);
        c.start();
        let handle = c.scheduler_mut().take_pending().expect("tick");
        c.on_frame(handle, 0.0);
        let handle = c.scheduler_mut().take_pending().expect("tick");
        c.on_frame(handle, 100.0);
        let frame = c.frame().cloned().expect("frame");
        drop(c);

        let text = renderer.describe(&frame);
        assert!(text.starts_with("[Running 0.10s] 1. Parabola ("));
        assert!(!text.contains('▲'));
    }

    #[test]
    fn test_backdrop_follows_grid_setting() {
        let mut settings = Settings::default();
        let mut renderer = LogRenderer::with_settings(&settings);
        let frame = {
            let mut c = AnimationController::new(ManualScheduler::new(), &mut renderer);
            c.start();
            let handle = c.scheduler_mut().take_pending().expect("tick");
            c.on_frame(handle, 0.0);
            c.frame().cloned().expect("frame")
        };

        let lines = renderer.backdrop(&frame);
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "grid x/y at 0.00 0.25 0.50 0.75 1.00");
        assert!(lines[1].starts_with("Cycloid   track 65 points"));

        settings.show_grid = false;
        settings.path_segments = 8;
        let lines = LogRenderer::with_settings(&settings).backdrop(&frame);
        assert_eq!(lines.len(), 4);
        assert!(lines.iter().all(|l| !l.starts_with("grid")));
        assert!(lines[1].starts_with("Straight  track 9 points, length 1.414"));
    }

    #[test]
    fn test_backdrop_once_per_run() {
        let mut renderer = LogRenderer::new(true);
        {
            let mut c = AnimationController::new(ManualScheduler::new(), &mut renderer);
            c.start();
            run_to_completion(&mut c);
        }
        assert!(!renderer.backdrop_drawn);
        {
            let mut c = AnimationController::new(ManualScheduler::new(), &mut renderer);
            c.start();
            let handle = c.scheduler_mut().take_pending().expect("tick");
            c.on_frame(handle, 0.0);
        }
        assert!(renderer.backdrop_drawn);
    }

    #[test]
    fn test_backdrop_uses_frame_shape() {
        let mut renderer = LogRenderer::new(true);
        let frame = {
            let mut c = AnimationController::new(ManualScheduler::new(), &mut renderer);
            assert!(c.set_shape_parameter(0.5));
            c.start();
            let handle = c.scheduler_mut().take_pending().expect("tick");
            c.on_frame(handle, 0.0);
            c.frame().cloned().expect("frame")
        };
        assert_eq!(frame.shape, 0.5);
        let lines = renderer.backdrop(&frame);
        let tunable = lines.last().expect("tunable track");
        assert!(tunable.starts_with("Tunable"));
        assert!(tunable.ends_with("3.00s"));
    }
}
