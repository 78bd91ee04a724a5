//! Alignment engine: elastic distance between two trajectories.
//!
//! 1. **Metric** ([`metric`]) -- the per-frame cost combining position,
//!    orientation and finger-joint terms.
//! 2. **DTW** ([`dtw`]) -- dynamic time warping over the frame-cost matrix,
//!    tolerant of speed and timing differences between repetitions.

pub mod dtw;
pub mod metric;

pub use dtw::Dtw;
pub use metric::{angular_difference, joint_distance, position_distance, quaternion_distance, FrameMetric};
