//! Coordinate frames (single conversion point between screen and physics).
//!
//! ## Frames
//! - `ScreenPoint`: y is the distance from the container's bottom edge, which is how
//!   the host places the element.
//! - `PhysicsPoint`: y is the distance from the container's top edge (grows downward).
//!   The evaluator only ever sees this frame.
//!
//! The two are distinct types, so an expression cannot mix a converted value with a raw
//! one. `Container` owns the only conversion in either direction.

use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, Result, TrajectoryError};

// ============================================================================
// Points
// ============================================================================

/// Host-surface position: x from the left edge, y from the bottom edge.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Evaluator position: x from the left edge, y from the top edge (down is +y).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PhysicsPoint {
    pub x: f64,
    pub y: f64,
}

impl PhysicsPoint {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Height on the ascent axis (`-y`); larger means visually higher.
    #[inline]
    pub fn ascent(&self) -> f64 {
        -self.y
    }

    /// Straight-line distance to `other`.
    #[inline]
    pub fn distance_to(&self, other: &Self) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub(crate) fn ensure_finite(&self, field: &'static str) -> Result<()> {
        ensure_finite(field, self.x)?;
        ensure_finite(field, self.y)?;
        Ok(())
    }
}

// ============================================================================
// Container: frame conversion SSOT
// ============================================================================

/// Size of the host surface the ball moves inside.
///
/// `physics_y = height - screen_y` and its inverse are the same linear map, applied to
/// both endpoints on the way in and to every sample on the way out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Container {
    pub width: f64,
    pub height: f64,
}

impl Container {
    /// Rejects non-finite or non-positive sizes.
    pub fn new(width: f64, height: f64) -> Result<Self> {
        let valid = width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0;
        if !valid {
            return Err(TrajectoryError::InvalidContainer { width, height });
        }
        Ok(Self { width, height })
    }

    /// Screen → physics.
    #[inline]
    pub fn to_physics(&self, p: ScreenPoint) -> PhysicsPoint {
        PhysicsPoint { x: p.x, y: self.height - p.y }
    }

    /// Physics → screen.
    #[inline]
    pub fn to_screen(&self, p: PhysicsPoint) -> ScreenPoint {
        ScreenPoint { x: p.x, y: self.height - p.y }
    }

    /// Percent of the container (0..100 on each axis, bottom-up) → screen pixels.
    ///
    /// Values outside 0..100 are kept as-is so off-container targets still work.
    #[inline]
    pub fn at_percent(&self, x_pct: f64, y_pct: f64) -> ScreenPoint {
        ScreenPoint { x: x_pct / 100.0 * self.width, y: y_pct / 100.0 * self.height }
    }

    /// Screen pixels → percent of the container.
    #[inline]
    pub fn percent_of(&self, p: ScreenPoint) -> (f64, f64) {
        (p.x / self.width * 100.0, p.y / self.height * 100.0)
    }
}
