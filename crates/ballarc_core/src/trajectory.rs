//! Trajectory Evaluator - endpoint-matched parabolic arc
//!
//! ## Axis convention
//! Points are in the physics frame (y grows downward). The kinematic equation runs on
//! the ascent axis `a = -y`, so a positive launch velocity moves the ball visibly up:
//!
//! ```text
//! a(t) = a0 + vy0·t - ½·g·t²      (equivalently  y(t) = y0 - vy0·t + ½·g·t²)
//! ```
//!
//! ## Launch velocity
//! `vy0` is solved so that `a(T) = a_end` exactly:
//!
//! ```text
//! vy0 = (a_end - a_start + ½·g·T²) / T
//! ```
//!
//! When that is below the ascent floor the caller's [`AscentFloorPolicy`] decides
//! whether the flight is lengthened, the landing drifts, or preparation fails.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::{debug, warn};

use crate::error::{ensure_finite, Result, TrajectoryError};
use crate::frame::PhysicsPoint;
use crate::params::{ArcParams, AscentFloorPolicy};

/// Tolerance used when reporting whether the landing matches the requested end point.
pub const ENDPOINT_EPSILON: f64 = 1e-6;

/// Most frames [`Trajectory::sample`] will produce for one flight.
pub const MAX_SAMPLE_FRAMES: u64 = 1_000_000;

// ============================================================================
// Request / State
// ============================================================================

/// Immutable description of one flight, created at animation start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryRequest {
    pub start: PhysicsPoint,
    pub end: PhysicsPoint,
    /// Flight time (s).
    pub duration: f64,
}

impl TrajectoryRequest {
    pub fn new(start: PhysicsPoint, end: PhysicsPoint, duration: f64) -> Result<Self> {
        start.ensure_finite("start")?;
        end.ensure_finite("end")?;
        ensure_finite("duration", duration)?;
        if duration <= 0.0 {
            return Err(TrajectoryError::NonPositiveDuration(duration));
        }
        Ok(Self { start, end, duration })
    }
}

/// Constants derived once from a request; fixed for the life of the animation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryState {
    /// px/s along x.
    pub horizontal_velocity: f64,
    /// Initial upward velocity (px/s) on the ascent axis.
    pub vertical_initial_velocity: f64,
    /// Effective flight time (s). Longer than requested only under `StretchDuration`.
    pub duration: f64,
    pub requested_duration: f64,
    pub gravity: f64,
    pub lateral_curve: f64,
    /// Displacement from the start to where the ball is at `duration`.
    pub landing_offset: PhysicsPoint,
    /// True when the endpoint-matching launch was below the floor.
    pub floor_applied: bool,
    pub policy: AscentFloorPolicy,
    /// Endpoint-matching launch velocity before any floor was applied.
    pub required_velocity: f64,
}

impl TrajectoryState {
    /// Whether the flight ends on the requested end point.
    ///
    /// Only `KeepDuration` with the floor applied can make this false.
    pub fn lands_exactly(&self, start: PhysicsPoint, end: PhysicsPoint) -> bool {
        self.landing_from(start).distance_to(&end) <= ENDPOINT_EPSILON
    }

    /// Where a flight launched from `start` is at `duration`.
    #[inline]
    pub fn landing_from(&self, start: PhysicsPoint) -> PhysicsPoint {
        PhysicsPoint { x: start.x + self.landing_offset.x, y: start.y + self.landing_offset.y }
    }

    /// Whether the flight is longer than requested.
    pub fn stretched(&self) -> bool {
        self.duration > self.requested_duration
    }

    /// Fraction of the flight completed at `elapsed` (0..=1).
    #[inline]
    pub fn progress(&self, elapsed: f64) -> f64 {
        self.clamp_elapsed(elapsed) / self.duration
    }

    /// Clamp into `[0, duration]`. NaN is treated as the start of the flight.
    #[inline]
    pub fn clamp_elapsed(&self, elapsed: f64) -> f64 {
        if elapsed.is_nan() {
            return 0.0;
        }
        elapsed.clamp(0.0, self.duration)
    }

    /// Time (s) at which the arc reaches its highest point within the flight.
    pub fn apex_time(&self) -> f64 {
        self.clamp_elapsed(self.vertical_initial_velocity / self.gravity)
    }

    /// Height gained on the ascent axis after `t` seconds (no clamping).
    #[inline]
    fn rise(&self, t: f64) -> f64 {
        self.vertical_initial_velocity * t - 0.5 * self.gravity * t * t
    }
}

// ============================================================================
// prepare
// ============================================================================

/// Solve a flight with the default floor policy and no lateral curve.
pub fn prepare(
    start: PhysicsPoint,
    end: PhysicsPoint,
    duration: f64,
    gravity: f64,
    min_ascent_velocity: f64,
) -> Result<TrajectoryState> {
    let request = TrajectoryRequest::new(start, end, duration)?;
    let params = ArcParams { gravity, min_ascent_velocity, ..ArcParams::default() };
    prepare_with(&request, &params)
}

/// Solve a flight for `request` under `params`.
pub fn prepare_with(request: &TrajectoryRequest, params: &ArcParams) -> Result<TrajectoryState> {
    let gravity = ensure_finite("gravity", params.gravity)?;
    if gravity <= 0.0 {
        return Err(TrajectoryError::NonPositiveGravity(gravity));
    }
    let floor = ensure_finite("min_ascent_velocity", params.min_ascent_velocity)?;
    if floor < 0.0 {
        return Err(TrajectoryError::NegativeAscentFloor(floor));
    }
    let lateral_curve = ensure_finite("lateral_curve", params.lateral_curve)?;

    let TrajectoryRequest { start, end, duration } = *request;
    let dx = end.x - start.x;
    let d_ascent = end.ascent() - start.ascent();
    let required = (d_ascent + 0.5 * gravity * duration * duration) / duration;
    ensure_finite("required_velocity", required)?;

    let (vy0, effective_duration, floor_applied) = if required >= floor {
        (required, duration, false)
    } else {
        let stretched = landing_time(floor, gravity, d_ascent);
        match params.floor_policy {
            AscentFloorPolicy::StretchDuration => (floor, stretched, true),
            AscentFloorPolicy::KeepDuration => (floor, duration, true),
            AscentFloorPolicy::Reject => {
                return Err(TrajectoryError::AscentBelowFloor {
                    required,
                    floor,
                    suggested_duration: stretched,
                });
            }
        }
    };

    let vx = ensure_finite("horizontal_velocity", dx / effective_duration)?;
    ensure_finite("duration", effective_duration)?;

    let mut state = TrajectoryState {
        horizontal_velocity: vx,
        vertical_initial_velocity: vy0,
        duration: effective_duration,
        requested_duration: duration,
        gravity,
        lateral_curve,
        landing_offset: PhysicsPoint { x: dx, y: end.y - start.y },
        floor_applied,
        policy: params.floor_policy,
        required_velocity: required,
    };

    if floor_applied && params.floor_policy == AscentFloorPolicy::KeepDuration {
        state.landing_offset.y = -state.rise(effective_duration);
        warn!(
            required,
            floor,
            target_y = end.y,
            landing_y = start.y + state.landing_offset.y,
            "ascent floor applied without stretching; landing drifts from target"
        );
    } else if floor_applied {
        debug!(
            required,
            floor,
            requested = duration,
            stretched = effective_duration,
            "ascent floor applied; flight stretched to land on target"
        );
    } else {
        debug!(vx, vy0, duration, "trajectory prepared");
    }

    Ok(state)
}

/// Later root of `½·g·τ² - v·τ + Δa = 0`: the time a launch at `v` comes back to `Δa`.
fn landing_time(v: f64, gravity: f64, d_ascent: f64) -> f64 {
    let disc = (v * v - 2.0 * gravity * d_ascent).max(0.0);
    (v + disc.sqrt()) / gravity
}

// ============================================================================
// evaluate
// ============================================================================

/// Sideways wobble added to x. Zero at `progress = 0` and `progress = 1`.
#[inline]
pub fn lateral_deviation(progress: f64, curve: f64) -> f64 {
    if curve == 0.0 || progress <= 0.0 || progress >= 1.0 {
        return 0.0;
    }
    (PI * progress).sin() * curve * (1.0 - progress)
}

/// Position at `elapsed` seconds for a flight launched from `start`.
///
/// `elapsed` outside `[0, duration]` is clamped, never extrapolated.
pub fn evaluate(state: &TrajectoryState, start: PhysicsPoint, elapsed: f64) -> PhysicsPoint {
    let t = state.clamp_elapsed(elapsed);
    if t >= state.duration {
        return state.landing_from(start);
    }
    let progress = t / state.duration;
    PhysicsPoint {
        x: start.x
            + state.horizontal_velocity * t
            + lateral_deviation(progress, state.lateral_curve),
        y: start.y - state.rise(t),
    }
}

// ============================================================================
// Trajectory (request + state)
// ============================================================================

/// One sampled frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub elapsed: f64,
    pub position: PhysicsPoint,
}

/// A prepared flight: the request and its solved state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub request: TrajectoryRequest,
    pub state: TrajectoryState,
}

impl Trajectory {
    pub fn prepare(request: TrajectoryRequest, params: &ArcParams) -> Result<Self> {
        let state = prepare_with(&request, params)?;
        Ok(Self { request, state })
    }

    #[inline]
    pub fn start(&self) -> PhysicsPoint {
        self.request.start
    }

    #[inline]
    pub fn landing(&self) -> PhysicsPoint {
        self.state.landing_from(self.request.start)
    }

    #[inline]
    pub fn duration(&self) -> f64 {
        self.state.duration
    }

    pub fn lands_exactly(&self) -> bool {
        self.state.lands_exactly(self.request.start, self.request.end)
    }

    #[inline]
    pub fn position_at(&self, elapsed: f64) -> PhysicsPoint {
        evaluate(&self.state, self.request.start, elapsed)
    }

    /// Highest point of the flight and when it is reached.
    pub fn apex(&self) -> Sample {
        let t = self.state.apex_time();
        Sample { elapsed: t, position: self.position_at(t) }
    }

    /// Frames at `fps`, from elapsed 0 through a final frame at exactly `duration`.
    ///
    /// Fails with [`TrajectoryError::TooManyFrames`] above [`MAX_SAMPLE_FRAMES`].
    pub fn sample(&self, fps: u32) -> Result<Vec<Sample>> {
        if fps == 0 {
            return Err(TrajectoryError::InvalidFrameRate(fps));
        }
        let dt = 1.0 / fps as f64;
        let duration = self.duration();
        // `as` saturates, so huge flights report u64::MAX instead of wrapping.
        let frames_needed = ((duration * fps as f64).ceil() as u64).saturating_add(1);
        if frames_needed > MAX_SAMPLE_FRAMES {
            return Err(TrajectoryError::TooManyFrames {
                frames: frames_needed,
                limit: MAX_SAMPLE_FRAMES,
            });
        }
        let mut frames = Vec::with_capacity(frames_needed as usize);
        let mut k: u64 = 0;
        loop {
            let elapsed = k as f64 * dt;
            if elapsed >= duration {
                break;
            }
            frames.push(Sample { elapsed, position: self.position_at(elapsed) });
            k += 1;
        }
        frames.push(Sample { elapsed: duration, position: self.landing() });
        Ok(frames)
    }
}
