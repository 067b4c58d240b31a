//! Position + rotation pair.
//!
//! [`Pose`] is the spatial state shared between movement components and the
//! physics backend. The engine uses a left-handed, Y-up convention where the
//! local forward axis is `+Z`.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// World-space up axis. Turning happens around this axis.
pub const UP: Vec3 = Vec3::Y;

/// Local forward axis before rotation is applied.
pub const FORWARD: Vec3 = Vec3::Z;

/// Build a rotation of `degrees` around the up axis.
#[must_use]
pub fn yaw_rotation(degrees: f32) -> Quat {
    Quat::from_axis_angle(UP, degrees.to_radians())
}

/// A world-space position and orientation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Pose {
    /// World-space position.
    pub position: Vec3,
    /// Rotation as a unit quaternion.
    pub rotation: Quat,
}

impl Pose {
    /// The identity pose: origin, no rotation.
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    /// Create a pose at `position` with no rotation.
    #[must_use]
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    /// Create a pose from position and rotation.
    #[must_use]
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// The direction this pose is facing.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        self.rotation * FORWARD
    }

    /// Translate the pose by the given offset.
    #[must_use]
    pub fn translated(mut self, offset: Vec3) -> Self {
        self.position += offset;
        self
    }

    /// Compose a local rotation delta onto the current orientation.
    #[must_use]
    pub fn rotated(mut self, delta: Quat) -> Self {
        self.rotation *= delta;
        self
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}
