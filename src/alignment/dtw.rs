//! Dynamic time warping over trajectory frames.
//!
//! For trajectories `x` (`rows` frames) and `y` (`cols` frames):
//!
//! 1. `diff[i][j] = frame_cost(x[i], y[j])`
//! 2. `cost[0][j] = diff[0][j]`, `cost[i][0] = diff[i][0]`
//! 3. `cost[i][j] = diff[i][j] + min(cost[i-1][j-1], cost[i-1][j], cost[i][j-1])`
//!
//! and the distance is `cost[rows-1][cols-1]`. The first row and column are
//! seeded from the raw frame costs rather than accumulated; stored libraries
//! were built against that boundary, so it must stay.

use ndarray::Array2;

use super::metric::FrameMetric;
use crate::error::{LfdError, LfdResult};
use crate::trajectory::Trajectory;

/// Elastic distance between trajectories of arbitrary, possibly different,
/// lengths. O(rows * cols) time and space per call; nothing is cached.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Dtw {
    metric: FrameMetric,
}

impl Dtw {
    pub fn new(metric: FrameMetric) -> Self {
        Self { metric }
    }

    pub fn metric(&self) -> &FrameMetric {
        &self.metric
    }

    /// Pairwise frame costs, `rows x cols`.
    pub fn frame_costs(&self, x: &Trajectory, y: &Trajectory) -> Array2<f64> {
        let (xf, yf) = (x.frames(), y.frames());
        Array2::from_shape_fn((xf.len(), yf.len()), |(i, j)| {
            self.metric.trajectory_frame_cost(&xf[i], &yf[j])
        })
    }

    /// Cumulative alignment costs from a frame-cost matrix.
    pub fn cumulative_costs(diff: &Array2<f64>) -> Array2<f64> {
        let (rows, cols) = diff.dim();
        // Boundary row and column are the raw costs.
        let mut cost = diff.clone();
        for r in 1..rows {
            for c in 1..cols {
                let best = cost[[r - 1, c - 1]]
                    .min(cost[[r - 1, c]])
                    .min(cost[[r, c - 1]]);
                cost[[r, c]] = diff[[r, c]] + best;
            }
        }
        cost
    }

    /// Dissimilarity between `x` and `y`; non-negative and finite for finite
    /// inputs.
    pub fn distance(&self, x: &Trajectory, y: &Trajectory) -> LfdResult<f64> {
        if x.is_empty() || y.is_empty() {
            return Err(LfdError::EmptyTrajectory);
        }
        let diff = self.frame_costs(x, y);
        let cost = Self::cumulative_costs(&diff);
        let (rows, cols) = cost.dim();
        Ok(cost[[rows - 1, cols - 1]])
    }
}
