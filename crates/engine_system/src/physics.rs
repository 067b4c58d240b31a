//! Physics backend seam.
//!
//! Movement drives physically simulated actors only through these move
//! primitives and then reads the resolved pose back, so the backend stays
//! authoritative.

use std::collections::HashMap;

use engine_component::BodyHandle;
use engine_math::{Pose, Quat, Vec3};

/// Move primitives of a rigid-body backend.
pub trait PhysicsBackend: Send {
    /// Resolved pose of `body`, or `None` if the backend does not know it.
    fn pose(&self, body: BodyHandle) -> Option<Pose>;

    /// Request `body` to move to `position`.
    fn move_position(&mut self, body: BodyHandle, position: Vec3);

    /// Request `body` to rotate to `rotation`.
    fn move_rotation(&mut self, body: BodyHandle, rotation: Quat);
}

/// A backend with no collision response: moves apply immediately.
#[derive(Debug, Default, Clone)]
pub struct BodyTable {
    bodies: HashMap<BodyHandle, Pose>,
    next: u64,
}

impl BodyTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a body at `pose` and return its handle.
    pub fn spawn(&mut self, pose: Pose) -> BodyHandle {
        self.next += 1;
        let handle = BodyHandle(self.next);
        self.bodies.insert(handle, pose);
        handle
    }

    /// Number of bodies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Returns `true` if there are no bodies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

impl PhysicsBackend for BodyTable {
    fn pose(&self, body: BodyHandle) -> Option<Pose> {
        self.bodies.get(&body).copied()
    }

    fn move_position(&mut self, body: BodyHandle, position: Vec3) {
        if let Some(pose) = self.bodies.get_mut(&body) {
            pose.position = position;
        }
    }

    fn move_rotation(&mut self, body: BodyHandle, rotation: Quat) {
        if let Some(pose) = self.bodies.get_mut(&body) {
            pose.rotation = rotation;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moves_apply_to_known_bodies_only() {
        let mut table = BodyTable::new();
        let body = table.spawn(Pose::IDENTITY);
        table.move_position(body, Vec3::X);
        table.move_position(BodyHandle(99), Vec3::Y);
        assert_eq!(table.pose(body).map(|p| p.position), Some(Vec3::X));
        assert_eq!(table.pose(BodyHandle(99)), None);
        assert_eq!(table.len(), 1);
    }
}
