//! Capture buffer for a single demonstration.
//!
//! The [`TrajectoryRecorder`] is the only owner of in-progress samples. A
//! sensor layer pushes poses and joint readings as they arrive (the two
//! streams need not be synchronised), then calls [`TrajectoryRecorder::finish`]
//! to obtain an immutable [`Trajectory`]. The buffer is drained by `finish`,
//! so the same recorder can be reused for the next demonstration.

use crate::error::{LfdError, LfdResult};
use crate::trajectory::types::{Frame, Pose, Trajectory, NUM_JOINTS};

/// Accumulates pose and joint samples for one demonstration.
#[derive(Debug, Clone)]
pub struct TrajectoryRecorder {
    /// Required length of every joint reading.
    joint_count: usize,
    poses: Vec<Pose>,
    joints: Vec<Vec<f64>>,
    /// Joint readings rejected for having the wrong length.
    dropped: usize,
}

impl TrajectoryRecorder {
    /// Create a recorder that accepts joint readings of exactly `joint_count`
    /// channels.
    pub fn new(joint_count: usize) -> Self {
        Self {
            joint_count,
            poses: Vec::new(),
            joints: Vec::new(),
            dropped: 0,
        }
    }

    pub fn push_pose(&mut self, pose: Pose) {
        self.poses.push(pose);
    }

    /// Record a joint reading. Returns `false` (and drops the sample) when it
    /// does not carry exactly the configured number of channels.
    pub fn push_joints(&mut self, angles: Vec<f64>) -> bool {
        if angles.len() != self.joint_count {
            self.dropped += 1;
            tracing::debug!(
                expected = self.joint_count,
                actual = angles.len(),
                "Dropping joint sample with unexpected channel count"
            );
            return false;
        }
        self.joints.push(angles);
        true
    }

    /// Number of poses captured so far.
    pub fn len(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    /// Number of joint readings captured so far.
    pub fn joint_samples(&self) -> usize {
        self.joints.len()
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Discard everything captured since the last `finish`/`clear`.
    pub fn clear(&mut self) {
        self.poses.clear();
        self.joints.clear();
        self.dropped = 0;
    }

    /// Close the demonstration and produce a trajectory on the pose timeline.
    ///
    /// Joint readings are resampled onto the poses by nearest index. The
    /// buffer is emptied whether or not construction succeeds.
    pub fn finish(&mut self, label: Option<String>) -> LfdResult<Trajectory> {
        let poses = std::mem::take(&mut self.poses);
        let joints = std::mem::take(&mut self.joints);
        let dropped = std::mem::replace(&mut self.dropped, 0);

        if poses.is_empty() {
            return Err(LfdError::EmptyTrajectory);
        }
        if joints.is_empty() {
            return Err(LfdError::malformed(format!(
                "{} poses captured but no joint readings",
                poses.len()
            )));
        }

        let frames: Vec<Frame> = poses
            .iter()
            .enumerate()
            .map(|(i, pose)| {
                let j = nearest_index(i, poses.len(), joints.len());
                Frame::new(*pose, joints[j].clone())
            })
            .collect();

        tracing::info!(
            frames = frames.len(),
            joint_samples = joints.len(),
            dropped,
            "Recorded trajectory"
        );

        let trajectory = Trajectory::new(frames)?;
        Ok(match label {
            Some(label) => trajectory.with_label(label),
            None => trajectory,
        })
    }
}

impl Default for TrajectoryRecorder {
    fn default() -> Self {
        Self::new(NUM_JOINTS)
    }
}

/// Map index `i` of a `from`-long timeline onto a `to`-long one, rounding to
/// the nearest sample. Both lengths must be non-zero.
fn nearest_index(i: usize, from: usize, to: usize) -> usize {
    if from <= 1 {
        return 0;
    }
    (i * (to - 1) + (from - 1) / 2) / (from - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trajectory::types::{Point, Quaternion};

    fn pose(x: f64) -> Pose {
        Pose::new(Point::new(x, 0.0, 0.0), Quaternion::IDENTITY)
    }

    fn joints(finger: f64) -> Vec<f64> {
        let mut v = vec![0.0; NUM_JOINTS];
        v[6] = finger;
        v[7] = finger;
        v
    }

    #[test]
    fn test_nearest_index() {
        assert_eq!(nearest_index(0, 1, 5), 0);
        assert_eq!(nearest_index(0, 5, 5), 0);
        assert_eq!(nearest_index(4, 5, 5), 4);
        assert_eq!(nearest_index(4, 5, 3), 2);
        assert_eq!(nearest_index(2, 5, 3), 1);
        assert_eq!(nearest_index(1, 3, 2), 1);
    }

    #[test]
    fn test_finish_pairs_channels() {
        let mut rec = TrajectoryRecorder::default();
        for i in 0..4 {
            rec.push_pose(pose(i as f64));
        }
        assert!(rec.push_joints(joints(0.0)));
        assert!(rec.push_joints(joints(1.0)));

        let t = rec.finish(Some("grab".into())).unwrap();
        assert_eq!(t.len(), 4);
        assert_eq!(t.label(), Some("grab"));
        assert_eq!(t.frames()[0].finger_joints(), Some(&[0.0, 0.0][..]));
        assert_eq!(t.frames()[3].finger_joints(), Some(&[1.0, 1.0][..]));
        assert!(rec.is_empty());
        assert_eq!(rec.joint_samples(), 0);
    }

    #[test]
    fn test_wrong_length_joints_dropped() {
        let mut rec = TrajectoryRecorder::default();
        assert!(!rec.push_joints(vec![0.0; 6]));
        assert_eq!(rec.dropped(), 1);
        assert_eq!(rec.joint_samples(), 0);
    }

    #[test]
    fn test_finish_without_poses() {
        let mut rec = TrajectoryRecorder::default();
        rec.push_joints(joints(0.0));
        assert_eq!(rec.finish(None).unwrap_err(), LfdError::EmptyTrajectory);
        assert_eq!(rec.joint_samples(), 0);
    }

    #[test]
    fn test_finish_without_joints() {
        let mut rec = TrajectoryRecorder::default();
        rec.push_pose(pose(0.0));
        assert!(matches!(
            rec.finish(None),
            Err(LfdError::MalformedTrajectory { .. })
        ));
    }

    #[test]
    fn test_clear_between_sessions() {
        let mut rec = TrajectoryRecorder::default();
        rec.push_pose(pose(0.0));
        rec.push_joints(joints(0.0));
        rec.push_joints(vec![]);
        rec.clear();
        assert!(rec.is_empty());
        assert_eq!(rec.joint_samples(), 0);
        assert_eq!(rec.dropped(), 0);
    }
}
