//! Flight driver - per-tick sampling loop for one ball.
//!
//! ```text
//! launch() ──► Running ──tick(elapsed >= duration)──► Completed (callback fires once)
//!                 │
//!                 └──cancel()──► Cancelled (callback never fires)
//! ```
//!
//! The driver is the only place that writes to the host: every tick converts the
//! evaluator's physics-frame position back to screen coordinates and hands it to a
//! [`FrameSink`].

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::error::Result;
use crate::frame::{Container, ScreenPoint};
use crate::params::ArcParams;
use crate::trajectory::{Trajectory, TrajectoryRequest};

/// Display refresh most hosts tick at.
pub const DEFAULT_FPS: u32 = 60;

/// Receives one position per tick, in screen coordinates.
pub trait FrameSink {
    fn place(&mut self, position: ScreenPoint);
}

impl FrameSink for Vec<ScreenPoint> {
    fn place(&mut self, position: ScreenPoint) {
        self.push(position);
    }
}

/// Driver state after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FlightStatus {
    Running { progress: f64 },
    Completed,
    Cancelled,
}

impl FlightStatus {
    pub fn is_finished(&self) -> bool {
        !matches!(self, FlightStatus::Running { .. })
    }
}

/// Drives one prepared trajectory from the host's scheduling callback.
pub struct FlightDriver {
    trajectory: Trajectory,
    container: Container,
    /// Host timestamp (s) of the first frame.
    started_at: f64,
    on_complete: Option<Box<dyn FnOnce()>>,
    status: FlightStatus,
    frames_emitted: u64,
}

impl fmt::Debug for FlightDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlightDriver")
            .field("trajectory", &self.trajectory)
            .field("container", &self.container)
            .field("started_at", &self.started_at)
            .field("has_callback", &self.on_complete.is_some())
            .field("status", &self.status)
            .field("frames_emitted", &self.frames_emitted)
            .finish()
    }
}

impl FlightDriver {
    pub fn new(trajectory: Trajectory, container: Container, started_at: f64) -> Self {
        Self {
            trajectory,
            container,
            started_at,
            on_complete: None,
            status: FlightStatus::Running { progress: 0.0 },
            frames_emitted: 0,
        }
    }

    /// Convert both screen endpoints, prepare the flight and start the clock at `started_at`.
    pub fn launch(
        from: ScreenPoint,
        to: ScreenPoint,
        duration: f64,
        container: Container,
        params: &ArcParams,
        started_at: f64,
    ) -> Result<Self> {
        let request =
            TrajectoryRequest::new(container.to_physics(from), container.to_physics(to), duration)?;
        let trajectory = Trajectory::prepare(request, params)?;
        Ok(Self::new(trajectory, container, started_at))
    }

    /// Callback invoked exactly once, when the flight completes.
    pub fn on_complete(mut self, callback: impl FnOnce() + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    pub fn status(&self) -> FlightStatus {
        self.status
    }

    pub fn frames_emitted(&self) -> u64 {
        self.frames_emitted
    }

    /// Screen position at host time `now`, without advancing the driver.
    pub fn position_at(&self, now: f64) -> ScreenPoint {
        self.container.to_screen(self.trajectory.position_at(now - self.started_at))
    }

    /// Place the ball for host time `now`. No-op once finished.
    pub fn tick(&mut self, now: f64, sink: &mut dyn FrameSink) -> FlightStatus {
        if self.status.is_finished() {
            return self.status;
        }

        let elapsed = now - self.started_at;
        let duration = self.trajectory.duration();
        if elapsed >= duration {
            sink.place(self.container.to_screen(self.trajectory.landing()));
            self.frames_emitted += 1;
            self.status = FlightStatus::Completed;
            debug!(frames = self.frames_emitted, duration, "flight completed");
            if let Some(callback) = self.on_complete.take() {
                callback();
            }
        } else {
            sink.place(self.position_at(now));
            self.frames_emitted += 1;
            self.status = FlightStatus::Running { progress: self.trajectory.state.progress(elapsed) };
        }
        self.status
    }

    /// Stop without completing. The callback is dropped unfired.
    pub fn cancel(&mut self) {
        if self.status.is_finished() {
            return;
        }
        debug!(frames = self.frames_emitted, "flight cancelled");
        self.status = FlightStatus::Cancelled;
        self.on_complete = None;
    }

    /// Tick at a fixed rate from `started_at` until completion.
    ///
    /// For headless hosts (tests, the CLI) that have no real scheduler.
    pub fn run_to_completion(&mut self, fps: u32, sink: &mut dyn FrameSink) -> FlightStatus {
        let dt = 1.0 / fps.max(1) as f64;
        let mut k: u64 = 0;
        while !self.status.is_finished() {
            self.tick(self.started_at + k as f64 * dt, sink);
            k += 1;
        }
        self.status
    }
}
