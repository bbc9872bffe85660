//! # ballarc_core - Endpoint-Matched Ball Arc Evaluator
//!
//! Moves a ball between two on-screen points along a parabolic arc over a fixed
//! duration, for hosts that place an element once per animation frame.
//!
//! ## Features
//! - Closed-form launch velocity: the flight lands exactly on its end point
//! - Typed screen / physics frames with a single conversion point
//! - Caller-selected policy when the launch would be too flat to read as an arc
//! - YAML parameter table with an embedded default
//! - Per-frame driver with a one-shot completion callback

#![allow(clippy::doc_lazy_continuation)]

pub mod driver;
pub mod error;
pub mod frame;
pub mod params;
pub mod trajectory;

pub use driver::{FlightDriver, FlightStatus, FrameSink, DEFAULT_FPS};
pub use error::{ParamsError, Result, TrajectoryError};
pub use frame::{Container, PhysicsPoint, ScreenPoint};
pub use params::{default_table, ArcParams, AscentFloorPolicy, ParamsTable};
pub use trajectory::{
    evaluate, lateral_deviation, prepare, prepare_with, Sample, Trajectory, TrajectoryRequest,
    TrajectoryState,
};
