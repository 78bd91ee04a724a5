//! Trajectory types and demonstration capture.
//!
//! This module provides:
//! - [`types::Trajectory`], [`types::Frame`], [`types::Pose`] -- the immutable
//!   motion representation consumed by the alignment engine and the library.
//! - [`recorder::TrajectoryRecorder`] -- the capture buffer that pairs
//!   independently sampled pose and joint streams into a trajectory.

pub mod recorder;
pub mod types;

pub use recorder::TrajectoryRecorder;
pub use types::{Frame, Point, Pose, Quaternion, Trajectory, FINGER_JOINTS, NUM_JOINTS};
