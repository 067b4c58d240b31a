//! # engine_system
//!
//! The "S" in ECS. A [`System`] is a logic unit with an `update` hook run
//! once per tick and a `fixed_update` hook run once per fixed step. Systems
//! receive everything they touch through a [`SystemContext`]; they hold no
//! reference back to the world.
//!
//! Concrete systems, in their usual attach order:
//!
//! - [`PreProcessSystem`]: moves gameplay messages into the frame inbox.
//! - [`MovementSystem`]: samples input and integrates movement.
//! - [`PostProcessSystem`]: publishes poses and clears the frame inbox.

pub mod context;
pub mod input;
pub mod movement;
pub mod physics;
pub mod process;
pub mod system;

pub use context::{FrameBuffer, SystemContext};
pub use input::{AxisTable, InputSource};
pub use movement::MovementSystem;
pub use physics::{BodyTable, PhysicsBackend};
pub use process::{PostProcessSystem, PreProcessSystem};
pub use system::{System, SystemError};
