//! Animation controller
//!
//! Owns one race: the clock, the ranking engine, the current curve set and the
//! single outstanding frame request. Each frame advances the clock, re-ranks the
//! racers and hands a [`FrameView`] to the renderer.

use std::fmt;

use glam::DVec2;
use serde::Serialize;

use crate::distance_to_goal;
use crate::platform::{FrameScheduler, TickHandle};
use crate::renderer::Renderer;
use crate::settings::Settings;
use crate::sim::{
    Curve, CurveKind, Phase, RankDelta, RankingEngine, RankingSnapshot, SimulationClock,
    build_curves,
};
use crate::standings::{Standings, format_time};

/// Externally visible run state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunStatus {
    /// Never started or reset
    Idle,
    Running,
    Paused,
    /// Finished run; final frame and standings are still available
    Complete,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Idle => "Idle",
            RunStatus::Running => "Running",
            RunStatus::Paused => "Paused",
            RunStatus::Complete => "Complete",
        }
    }
}

/// What to print next to a racer
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum DisplayMetric {
    /// Live distance to the goal
    Distance(f64),
    /// The racer's own duration, once the run is complete
    FinalTime(f64),
}

impl fmt::Display for DisplayMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayMetric::Distance(d) => write!(f, "{:.3}", d),
            DisplayMetric::FinalTime(t) => f.write_str(&format_time(*t)),
        }
    }
}

/// One racer in a frame
#[derive(Debug, Clone, Serialize)]
pub struct RacerView {
    pub kind: CurveKind,
    pub label: &'static str,
    pub color: [f32; 4],
    pub progress: f64,
    pub position: DVec2,
    pub rank_delta: RankDelta,
    pub metric: DisplayMetric,
}

/// Read model handed to the renderer once per tick
#[derive(Debug, Clone, Serialize)]
pub struct FrameView {
    pub status: RunStatus,
    /// Simulated seconds
    pub elapsed: f64,
    /// Shape parameter the tracks were built with
    pub shape: f64,
    /// Closest to the goal first
    pub rankings: Vec<CurveKind>,
    /// In curve order
    pub racers: Vec<RacerView>,
}

impl FrameView {
    fn build(
        status: RunStatus,
        elapsed: f64,
        shape: f64,
        curves: &[Curve],
        snapshot: &RankingSnapshot,
    ) -> Self {
        let racers = curves
            .iter()
            .map(|curve| {
                let progress = snapshot.progress.get(&curve.kind).copied().unwrap_or(0.0);
                let position = curve.position(progress);
                let metric = match snapshot.frozen_time.get(&curve.kind) {
                    Some(time) => DisplayMetric::FinalTime(*time),
                    None => DisplayMetric::Distance(
                        snapshot
                            .distance
                            .get(&curve.kind)
                            .copied()
                            .unwrap_or_else(|| distance_to_goal(position)),
                    ),
                };
                RacerView {
                    kind: curve.kind,
                    label: curve.label(),
                    color: curve.color,
                    progress,
                    position,
                    rank_delta: snapshot.rank_delta(curve.kind),
                    metric,
                }
            })
            .collect();

        Self {
            status,
            elapsed,
            shape,
            rankings: snapshot.rankings.clone(),
            racers,
        }
    }

    pub fn racer(&self, kind: CurveKind) -> Option<&RacerView> {
        self.racers.iter().find(|r| r.kind == kind)
    }

    /// Racers in ranking order
    pub fn leaderboard(&self) -> impl Iterator<Item = &RacerView> {
        self.rankings.iter().filter_map(|kind| self.racer(*kind))
    }
}

impl fmt::Display for FrameView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} {}]", self.status.as_str(), format_time(self.elapsed))?;
        for (i, racer) in self.leaderboard().enumerate() {
            write!(
                f,
                " {}. {}{} ({})",
                i + 1,
                racer.label,
                racer.rank_delta.arrow(),
                racer.metric
            )?;
        }
        Ok(())
    }
}

/// Frame-driven race state machine
pub struct AnimationController<S: FrameScheduler, R: Renderer> {
    clock: SimulationClock,
    engine: RankingEngine,
    shape: f64,
    curves: Vec<Curve>,
    scheduler: S,
    renderer: R,
    /// The one frame request this controller will honour
    pending: Option<TickHandle>,
    /// Last frame pushed to the renderer, kept for display after completion
    frame: Option<FrameView>,
    standings: Option<Standings>,
}

impl<S: FrameScheduler, R: Renderer> AnimationController<S, R> {
    pub fn new(scheduler: S, renderer: R) -> Self {
        Self {
            clock: SimulationClock::new(),
            engine: RankingEngine::new(),
            shape: 0.0,
            curves: build_curves(0.0),
            scheduler,
            renderer,
            pending: None,
            frame: None,
            standings: None,
        }
    }

    pub fn with_settings(settings: &Settings, scheduler: S, renderer: R) -> Self {
        let mut controller = Self::new(scheduler, renderer);
        controller.apply_settings(settings);
        controller
    }

    pub fn status(&self) -> RunStatus {
        match self.clock.phase() {
            Phase::Running => RunStatus::Running,
            Phase::Paused => RunStatus::Paused,
            Phase::Idle if self.clock.is_completed() => RunStatus::Complete,
            Phase::Idle => RunStatus::Idle,
        }
    }

    pub fn elapsed(&self) -> f64 {
        self.clock.elapsed()
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn curves(&self) -> &[Curve] {
        &self.curves
    }

    pub fn shape_parameter(&self) -> f64 {
        self.shape
    }

    pub fn speed_multiplier(&self) -> f64 {
        self.clock.speed_multiplier()
    }

    pub fn snapshot(&self) -> &RankingSnapshot {
        self.engine.snapshot()
    }

    pub fn frame(&self) -> Option<&FrameView> {
        self.frame.as_ref()
    }

    pub fn standings(&self) -> Option<&Standings> {
        self.standings.as_ref()
    }

    /// Handle of the frame this controller is waiting for
    pub fn pending_tick(&self) -> Option<TickHandle> {
        self.pending
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Begin a fresh run (restarts if one is in progress)
    pub fn start(&mut self) {
        self.cancel_pending();
        self.clock.start();
        self.engine.clear();
        self.frame = None;
        self.standings = None;
        self.schedule_next();
        log::info!(
            "Race started (speed {}x, shape {:.2})",
            self.clock.speed_multiplier(),
            self.shape
        );
    }

    pub fn pause(&mut self) {
        if self.clock.phase() != Phase::Running {
            return;
        }
        self.clock.pause();
        self.cancel_pending();
        log::info!("Race paused at {}", format_time(self.clock.elapsed()));
    }

    pub fn resume(&mut self) {
        if self.clock.phase() != Phase::Paused {
            return;
        }
        self.clock.resume();
        self.schedule_next();
        log::info!("Race resumed at {}", format_time(self.clock.elapsed()));
    }

    pub fn reset(&mut self) {
        self.cancel_pending();
        self.clock.reset();
        self.engine.clear();
        self.frame = None;
        self.standings = None;
        log::info!("Race reset");
    }

    /// Returns whether the value was applied
    pub fn set_speed_multiplier(&mut self, value: f64) -> bool {
        let applied = self.clock.set_speed_multiplier(value);
        if applied {
            log::info!("Speed multiplier set to {}", value);
        }
        applied
    }

    /// Rebuild the curve set for a new shape; elapsed time is untouched
    pub fn set_shape_parameter(&mut self, value: f64) -> bool {
        if !(0.0..=1.0).contains(&value) {
            log::warn!("Ignoring shape parameter {} outside [0, 1]", value);
            return false;
        }
        self.shape = value;
        self.curves = build_curves(value);
        log::info!("Shape parameter set to {:.2}", value);
        true
    }

    pub fn apply_settings(&mut self, settings: &Settings) {
        self.set_speed_multiplier(settings.speed_multiplier);
        self.set_shape_parameter(settings.shape_parameter);
    }

    /// Frame callback; returns whether a frame was produced
    ///
    /// Ticks other than the one currently requested are dropped, so a callback
    /// that outlives a reset or pause cannot touch the new state.
    pub fn on_frame(&mut self, handle: TickHandle, timestamp: f64) -> bool {
        if self.pending != Some(handle) {
            log::debug!("Dropping stale tick {:?}", handle);
            return false;
        }
        self.pending = None;
        if !self.clock.is_running() {
            return false;
        }

        let elapsed = self.clock.advance(timestamp);
        let completed_now = self.engine.evaluate(elapsed, &self.curves).completed_now;
        if completed_now {
            self.clock.finish();
            let standings = Standings::from_frozen(self.engine.snapshot());
            log::info!(
                "Race complete after {}; winner: {}",
                format_time(elapsed),
                standings.winner().map(|e| e.kind.label()).unwrap_or("none")
            );
            self.standings = Some(standings);
        }

        let view = FrameView::build(
            self.status(),
            elapsed,
            self.shape,
            &self.curves,
            self.engine.snapshot(),
        );
        log::debug!("{}", view);
        self.renderer.draw(&view);
        self.frame = Some(view);

        if !completed_now {
            self.schedule_next();
        }
        true
    }

    fn schedule_next(&mut self) {
        self.pending = Some(self.scheduler.schedule());
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel(handle);
        }
    }
}

impl<S: FrameScheduler, R: Renderer> Drop for AnimationController<S, R> {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}
