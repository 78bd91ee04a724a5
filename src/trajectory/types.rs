//! Core trajectory data types.
//!
//! A [`Trajectory`] is the immutable value handed from the recorder to the
//! alignment engine and the example library. Construction validates every
//! invariant the metric relies on, so nothing deeper in the pipeline has to.

use std::ops::Range;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LfdError, LfdResult};

/// Number of joint channels reported by the arm (6 arm joints + 2 fingers).
pub const NUM_JOINTS: usize = 8;

/// Joint indices that take part in the distance metric.
pub const FINGER_JOINTS: Range<usize> = 6..NUM_JOINTS;

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// End-effector position in Cartesian space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point {
    pub const ORIGIN: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to `other`.
    pub fn distance(self, other: Self) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        let dz = other.z - self.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// End-effector orientation as a unit quaternion `(w, x, y, z)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Quaternion {
    pub const IDENTITY: Self = Self {
        w: 1.0,
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self { w, x, y, z }
    }

    /// Rotation of `angle` radians about `axis`. A zero axis yields identity.
    pub fn from_axis_angle(axis: [f64; 3], angle: f64) -> Self {
        let len = (axis[0] * axis[0] + axis[1] * axis[1] + axis[2] * axis[2]).sqrt();
        if len < 1e-12 {
            return Self::IDENTITY;
        }
        let (s, c) = (angle * 0.5).sin_cos();
        let k = s / len;
        Self {
            w: c,
            x: axis[0] * k,
            y: axis[1] * k,
            z: axis[2] * k,
        }
    }

    pub fn norm(self) -> f64 {
        (self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Components in `(w, x, y, z)` order.
    pub fn to_array(self) -> [f64; 4] {
        [self.w, self.x, self.y, self.z]
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A sampled end-effector pose.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Point,
    pub orientation: Quaternion,
}

impl Pose {
    pub const fn new(position: Point, orientation: Quaternion) -> Self {
        Self {
            position,
            orientation,
        }
    }
}

// ---------------------------------------------------------------------------
// Frame
// ---------------------------------------------------------------------------

/// One time step: a pose paired with the joint readings taken at that step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub position: Point,
    pub orientation: Quaternion,
    /// All joint angles in radians; arm joints first, finger joints last.
    pub joint_angles: Vec<f64>,
}

impl Frame {
    pub fn new(pose: Pose, joint_angles: Vec<f64>) -> Self {
        Self {
            position: pose.position,
            orientation: pose.orientation,
            joint_angles,
        }
    }

    pub fn pose(&self) -> Pose {
        Pose::new(self.position, self.orientation)
    }

    /// The finger-joint slice read by the metric, or `None` when the frame
    /// carries fewer than [`NUM_JOINTS`] angles. Frames owned by a
    /// [`Trajectory`] always return `Some`.
    pub fn finger_joints(&self) -> Option<&[f64]> {
        self.joint_angles.get(FINGER_JOINTS)
    }
}

// ---------------------------------------------------------------------------
// Trajectory
// ---------------------------------------------------------------------------

/// A recorded motion: an ordered, non-empty sequence of frames, optionally
/// labeled.
///
/// Fields are private so a constructed trajectory can only be replaced, never
/// edited; the library relies on that when it takes ownership of examples.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "TrajectoryRecord")]
pub struct Trajectory {
    id: String,
    label: Option<String>,
    recorded_at: DateTime<Utc>,
    frames: Vec<Frame>,
}

impl Trajectory {
    /// Build an unlabeled trajectory from paired frames.
    pub fn new(frames: Vec<Frame>) -> LfdResult<Self> {
        validate_frames(&frames)?;
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            label: None,
            recorded_at: Utc::now(),
            frames,
        })
    }

    /// Build a trajectory from separately captured pose and joint channels.
    ///
    /// The channels must already share a frame count; see
    /// [`TrajectoryRecorder`](super::TrajectoryRecorder) for resampling.
    pub fn from_channels(poses: Vec<Pose>, joints: Vec<Vec<f64>>) -> LfdResult<Self> {
        if poses.len() != joints.len() {
            return Err(LfdError::malformed(format!(
                "pose channel has {} frames but joint channel has {}",
                poses.len(),
                joints.len()
            )));
        }
        let frames = poses
            .into_iter()
            .zip(joints)
            .map(|(pose, angles)| Frame::new(pose, angles))
            .collect();
        Self::new(frames)
    }

    /// Attach (or replace) the classification label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Number of frames (always at least one).
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always `false` for a constructed trajectory; kept for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Joint channels per frame.
    pub fn joint_count(&self) -> usize {
        self.frames[0].joint_angles.len()
    }
}

fn validate_frames(frames: &[Frame]) -> LfdResult<()> {
    let first = frames.first().ok_or(LfdError::EmptyTrajectory)?;
    let joint_count = first.joint_angles.len();
    if joint_count < NUM_JOINTS {
        return Err(LfdError::malformed(format!(
            "frames carry {joint_count} joint angles, at least {NUM_JOINTS} required"
        )));
    }
    if let Some((index, frame)) = frames
        .iter()
        .enumerate()
        .find(|(_, f)| f.joint_angles.len() != joint_count)
    {
        return Err(LfdError::malformed(format!(
            "frame {index} carries {} joint angles, expected {joint_count}",
            frame.joint_angles.len()
        )));
    }
    Ok(())
}

/// Wire shape of a [`Trajectory`]; validated on the way in.
#[derive(Deserialize)]
struct TrajectoryRecord {
    #[serde(default = "new_id")]
    id: String,
    #[serde(default)]
    label: Option<String>,
    #[serde(default = "Utc::now")]
    recorded_at: DateTime<Utc>,
    frames: Vec<Frame>,
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl TryFrom<TrajectoryRecord> for Trajectory {
    type Error = LfdError;

    fn try_from(record: TrajectoryRecord) -> LfdResult<Self> {
        validate_frames(&record.frames)?;
        Ok(Self {
            id: record.id,
            label: record.label,
            recorded_at: record.recorded_at,
            frames: record.frames,
        })
    }
}
