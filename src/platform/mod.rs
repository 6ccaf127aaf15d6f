//! Platform abstraction layer
//!
//! Frame callbacks are requested through [`FrameScheduler`] so the controller
//! never talks to a display directly:
//! - [`ManualScheduler`]: headless/native driver pulls pending ticks itself
//! - `web::RafScheduler`: `requestAnimationFrame` in the browser
//!
//! [`FrameClock`] produces display-like timestamps for headless runs.

#[cfg(target_arch = "wasm32")]
pub mod web;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::FRAME_MS;

/// Identifies one requested frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TickHandle(pub u64);

/// Source of "call me on the next frame" requests
pub trait FrameScheduler {
    /// Request one frame callback
    fn schedule(&mut self) -> TickHandle;
    /// Withdraw a request; unknown or already-fired handles are ignored
    fn cancel(&mut self, handle: TickHandle);
}

impl<T: FrameScheduler + ?Sized> FrameScheduler for &mut T {
    fn schedule(&mut self) -> TickHandle {
        (**self).schedule()
    }

    fn cancel(&mut self, handle: TickHandle) {
        (**self).cancel(handle)
    }
}

/// Scheduler whose frames are fired by whoever owns it
///
/// Holds at most one pending request, matching a display that delivers one
/// frame callback at a time.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_id: u64,
    pending: Option<TickHandle>,
    scheduled: u64,
    cancelled: u64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Option<TickHandle> {
        self.pending
    }

    /// Hand the pending request to the caller, who is expected to fire it
    pub fn take_pending(&mut self) -> Option<TickHandle> {
        self.pending.take()
    }

    /// Total requests ever made
    pub fn scheduled_count(&self) -> u64 {
        self.scheduled
    }

    /// Requests withdrawn before they fired
    pub fn cancelled_count(&self) -> u64 {
        self.cancelled
    }
}

impl FrameScheduler for ManualScheduler {
    fn schedule(&mut self) -> TickHandle {
        self.next_id += 1;
        let handle = TickHandle(self.next_id);
        if let Some(old) = self.pending.replace(handle) {
            log::debug!("Frame request {:?} superseded by {:?}", old, handle);
        }
        self.scheduled += 1;
        handle
    }

    fn cancel(&mut self, handle: TickHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
            self.cancelled += 1;
        }
    }
}

/// Synthetic display clock (milliseconds) with seeded jitter
#[derive(Debug, Clone)]
pub struct FrameClock {
    rng: Pcg32,
    now: f64,
    frame_ms: f64,
    jitter_ms: f64,
}

impl FrameClock {
    /// 60 Hz frames with up to 2 ms of jitter
    pub fn new(seed: u64) -> Self {
        Self::with_timing(seed, FRAME_MS, 2.0)
    }

    pub fn with_timing(seed: u64, frame_ms: f64, jitter_ms: f64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            now: 0.0,
            frame_ms: frame_ms.max(0.0),
            jitter_ms: jitter_ms.abs(),
        }
    }

    pub fn now(&self) -> f64 {
        self.now
    }

    /// Timestamp of the next frame
    pub fn next_timestamp(&mut self) -> f64 {
        let jitter = if self.jitter_ms > 0.0 {
            self.rng.random_range(-self.jitter_ms..=self.jitter_ms)
        } else {
            0.0
        };
        self.now += (self.frame_ms + jitter).max(0.0);
        self.now
    }

    /// Let wall-clock time pass without delivering a frame (tab hidden, pause)
    pub fn skip(&mut self, ms: f64) {
        self.now += ms.max(0.0);
    }
}
