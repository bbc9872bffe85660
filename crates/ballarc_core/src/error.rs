use thiserror::Error;

/// Rejections raised while preparing a trajectory or converting frames.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrajectoryError {
    #[error("Duration must be positive, got {0}")]
    NonPositiveDuration(f64),

    #[error("Gravity must be positive, got {0}")]
    NonPositiveGravity(f64),

    #[error("Ascent velocity floor must not be negative, got {0}")]
    NegativeAscentFloor(f64),

    #[error("Non-finite value for {field}: {value}")]
    NonFinite { field: &'static str, value: f64 },

    #[error("Frame rate must be positive, got {0}")]
    InvalidFrameRate(u32),

    #[error("Invalid container size: {width} x {height}")]
    InvalidContainer { width: f64, height: f64 },

    #[error(
        "Required launch velocity {required:.3} is below the ascent floor {floor:.3}; \
         a duration of {suggested_duration:.3}s would land exactly"
    )]
    AscentBelowFloor { required: f64, floor: f64, suggested_duration: f64 },

    #[error("Sampling would produce {frames} frames (limit {limit})")]
    TooManyFrames { frames: u64, limit: u64 },
}

impl TrajectoryError {
    /// Whether the caller can retry with adjusted input (as opposed to a bad host setup).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TrajectoryError::AscentBelowFloor { .. }
                | TrajectoryError::NonPositiveDuration(_)
                | TrajectoryError::TooManyFrames { .. }
        )
    }
}

/// Errors from loading an arc parameter table.
#[derive(Error, Debug)]
pub enum ParamsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid parameters: {0}")]
    Invalid(String),

    #[error("Unknown profile: {name}")]
    UnknownProfile { name: String },
}

pub type Result<T> = std::result::Result<T, TrajectoryError>;

/// Fails with [`TrajectoryError::NonFinite`] unless `value` is a finite number.
pub(crate) fn ensure_finite(field: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(TrajectoryError::NonFinite { field, value })
    }
}
