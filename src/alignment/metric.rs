//! Per-frame cost between two trajectory frames.
//!
//! The cost of pairing frame `x` with frame `y` is
//!
//!   cost = |p_x - p_y| + |2 Im(q_y q_x^-1)| + w * sum_fingers wrap(|a_y - a_x|)
//!
//! where the finger sum runs over
//! [`FINGER_JOINTS`](crate::trajectory::FINGER_JOINTS) only and `w` is the
//! configured joint weight (10 by default). Arm joints are carried by the
//! frame but never compared.

use std::f64::consts::{PI, TAU};

use crate::config::MetricConfig;
use crate::error::{LfdError, LfdResult};
use crate::trajectory::{Frame, Point, Quaternion, FINGER_JOINTS, NUM_JOINTS};

/// Euclidean distance between two end-effector positions.
pub fn position_distance(x: Point, y: Point) -> f64 {
    x.distance(y)
}

/// Magnitude of the angular correction that rotates `c` onto `d`.
///
/// Computes `-2 * E(c) * d`, where the rows of the 3x4 matrix `E(c)` pick out
/// the vector part of `d * conj(c)`, and returns its norm. For unit
/// quaternions this is `2 |sin(theta / 2)|` with `theta` the angle between the
/// orientations, so it is zero for identical (or antipodal) quaternions.
pub fn quaternion_distance(c: Quaternion, d: Quaternion) -> f64 {
    let e = [
        [-c.x, c.w, -c.z, c.y],
        [-c.y, c.z, c.w, -c.x],
        [-c.z, -c.y, c.x, c.w],
    ];
    let dv = d.to_array();

    e.iter()
        .map(|row| {
            let m = -2.0 * row.iter().zip(dv.iter()).map(|(a, b)| a * b).sum::<f64>();
            m * m
        })
        .sum::<f64>()
        .sqrt()
}

/// Absolute angular separation of two joint angles, wrapped into `[0, PI]`.
pub fn angular_difference(a: f64, b: f64) -> f64 {
    let diff = (b - a).abs();
    ((diff + PI).rem_euclid(TAU) - PI).abs()
}

/// Weighted sum of wrapped angle differences over two equally long slices.
pub fn joint_distance(x: &[f64], y: &[f64], weight: f64) -> f64 {
    let sum: f64 = x
        .iter()
        .zip(y.iter())
        .map(|(a, b)| angular_difference(*a, *b))
        .sum();
    sum * weight
}

/// The combined position + orientation + finger-joint frame cost.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameMetric {
    joint_weight: f64,
}

impl FrameMetric {
    pub fn new(config: &MetricConfig) -> LfdResult<Self> {
        config.validate()?;
        Ok(Self {
            joint_weight: config.joint_weight,
        })
    }

    pub fn joint_weight(&self) -> f64 {
        self.joint_weight
    }

    /// Cost of aligning frame `x` with frame `y`. Symmetric in its arguments.
    ///
    /// Frames built outside a [`Trajectory`](crate::trajectory::Trajectory)
    /// are unchecked, so a frame without the finger joints is rejected here.
    pub fn frame_cost(&self, x: &Frame, y: &Frame) -> LfdResult<f64> {
        match (x.finger_joints(), y.finger_joints()) {
            (Some(xf), Some(yf)) => Ok(self.combine(x, y, xf, yf)),
            _ => Err(LfdError::malformed(format!(
                "frames carry {} and {} joint angles, at least {NUM_JOINTS} required",
                x.joint_angles.len(),
                y.joint_angles.len()
            ))),
        }
    }

    /// Frame cost for frames of validated trajectories.
    pub(crate) fn trajectory_frame_cost(&self, x: &Frame, y: &Frame) -> f64 {
        self.combine(
            x,
            y,
            &x.joint_angles[FINGER_JOINTS],
            &y.joint_angles[FINGER_JOINTS],
        )
    }

    fn combine(&self, x: &Frame, y: &Frame, x_fingers: &[f64], y_fingers: &[f64]) -> f64 {
        position_distance(x.position, y.position)
            + quaternion_distance(x.orientation, y.orientation)
            + joint_distance(x_fingers, y_fingers, self.joint_weight)
    }
}

impl Default for FrameMetric {
    fn default() -> Self {
        Self {
            joint_weight: crate::config::DEFAULT_JOINT_WEIGHT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trajectory::Pose;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_angular_difference_wraps() {
        assert!(angular_difference(0.0, 0.0).abs() < EPS);
        assert!((angular_difference(0.0, 0.5) - 0.5).abs() < EPS);
        assert!((angular_difference(0.5, 0.0) - 0.5).abs() < EPS);
        assert!((angular_difference(0.0, PI) - PI).abs() < EPS);
        assert!((angular_difference(0.0, TAU - 0.1) - 0.1).abs() < EPS);
        assert!((angular_difference(-3.0, 3.0) - (TAU - 6.0)).abs() < EPS);
        assert!((angular_difference(0.0, 5.0 * TAU + 0.25) - 0.25).abs() < EPS);
    }

    #[test]
    fn test_angular_difference_bounded() {
        for i in -50..50 {
            let d = angular_difference(0.0, i as f64 * 0.37);
            assert!((0.0..=PI + EPS).contains(&d), "{d} out of range");
        }
    }

    #[test]
    fn test_quaternion_distance_identical_is_zero() {
        let q = Quaternion::from_axis_angle([0.3, -1.0, 0.5], 0.8);
        assert!(quaternion_distance(q, q) < EPS);
        assert!(quaternion_distance(Quaternion::IDENTITY, Quaternion::IDENTITY) < EPS);
    }

    #[test]
    fn test_quaternion_distance_antipodal_is_zero() {
        let q = Quaternion::from_axis_angle([1.0, 0.0, 0.0], 0.4);
        let neg = Quaternion::new(-q.w, -q.x, -q.y, -q.z);
        assert!(quaternion_distance(q, neg) < EPS);
    }

    #[test]
    fn test_quaternion_distance_matches_half_angle() {
        for &angle in &[0.1, 0.5, 1.0, 2.0, 3.0] {
            let q = Quaternion::from_axis_angle([0.0, 0.0, 1.0], angle);
            let expected = 2.0 * (angle / 2.0).sin();
            assert!((quaternion_distance(Quaternion::IDENTITY, q) - expected).abs() < EPS);
        }
    }

    #[test]
    fn test_quaternion_distance_symmetric() {
        let a = Quaternion::from_axis_angle([1.0, 2.0, 0.0], 0.7);
        let b = Quaternion::from_axis_angle([0.0, -1.0, 3.0], 1.9);
        assert!((quaternion_distance(a, b) - quaternion_distance(b, a)).abs() < EPS);
    }

    #[test]
    fn test_joint_distance_weighted() {
        let d = joint_distance(&[0.0, 0.0], &[0.1, 0.2], 10.0);
        assert!((d - 3.0).abs() < EPS);
    }

    #[test]
    fn test_frame_cost_ignores_arm_joints() {
        let metric = FrameMetric::default();
        let pose = Pose::new(Point::ORIGIN, Quaternion::IDENTITY);
        let a = Frame::new(pose, vec![0.0; NUM_JOINTS]);
        let mut arm = vec![0.0; NUM_JOINTS];
        arm[..6].copy_from_slice(&[1.0, 2.0, 3.0, 1.0, 2.0, 3.0]);
        let b = Frame::new(pose, arm);
        assert!(metric.frame_cost(&a, &b).unwrap() < EPS);
    }

    #[test]
    fn test_frame_cost_sums_terms() {
        let metric = FrameMetric::default();
        let a = Frame::new(
            Pose::new(Point::ORIGIN, Quaternion::IDENTITY),
            vec![0.0; NUM_JOINTS],
        );
        let mut fingers = vec![0.0; NUM_JOINTS];
        fingers[6] = 0.1;
        let b = Frame::new(
            Pose::new(
                Point::new(3.0, 4.0, 0.0),
                Quaternion::from_axis_angle([0.0, 1.0, 0.0], 1.0),
            ),
            fingers,
        );
        let expected = 5.0 + 2.0 * 0.5f64.sin() + 10.0 * 0.1;
        assert!((metric.frame_cost(&a, &b).unwrap() - expected).abs() < EPS);
        assert!((metric.frame_cost(&b, &a).unwrap() - expected).abs() < EPS);
        assert_eq!(metric.trajectory_frame_cost(&a, &b), metric.frame_cost(&a, &b).unwrap());
    }

    #[test]
    fn test_frame_cost_rejects_short_joint_vectors() {
        let metric = FrameMetric::default();
        let pose = Pose::new(Point::ORIGIN, Quaternion::IDENTITY);
        let short = Frame::new(pose, vec![0.0; 3]);
        let full = Frame::new(pose, vec![0.0; NUM_JOINTS]);

        for (x, y) in [(&short, &short), (&short, &full), (&full, &short)] {
            assert!(matches!(
                metric.frame_cost(x, y),
                Err(LfdError::MalformedTrajectory { .. })
            ));
        }
    }

    #[test]
    fn test_metric_rejects_bad_weight() {
        let config = MetricConfig {
            joint_weight: f64::INFINITY,
        };
        assert!(FrameMetric::new(&config).is_err());
    }
}
