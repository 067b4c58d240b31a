//! # engine_math
//!
//! Math types for the tank runtime. Re-exports [`glam`] for linear algebra
//! and defines the [`Pose`] helpers that movement integration relies on.

pub mod pose;

// Re-export glam types for convenience.
pub use glam::{EulerRot, Quat, Vec2, Vec3};

pub use pose::{Pose, yaw_rotation};
