//! lfd-actions: gesture recognition from recorded arm demonstrations.
//!
//! A demonstration is a [`trajectory::Trajectory`] of end-effector poses and
//! finger-joint angles. The [`alignment`] engine scores two trajectories with
//! dynamic time warping, and the [`classifier`] votes among the nearest
//! labeled examples, optionally folding corrected demonstrations back into
//! the library.

pub mod alignment;
pub mod classifier;
pub mod config;
pub mod error;
pub mod trajectory;

pub use error::{LfdError, LfdResult};
