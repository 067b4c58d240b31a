//! # engine_app
//!
//! The client runtime: a [`World`] owning entities, components, and systems;
//! a [`HandshakeStateMachine`] that keeps every system disabled until the
//! session server has admitted the player; and a [`TickLoop`] that drives
//! both once per tick.
//!
//! ## Tick order
//!
//! 1. Poll the handshake (once started and ready).
//! 2. Snapshot system enable flags.
//! 3. `update` every enabled system, in attach order.
//! 4. `fixed_update` every enabled system, once per elapsed fixed step.

pub mod config;
pub mod error;
pub mod handshake;
pub mod scene;
pub mod tick;
pub mod world;

pub use config::{AppConfig, ConfigError, HandshakeConfig, TickConfig, check_rate};
pub use error::AppError;
pub use handshake::{HandshakePoll, HandshakeState, HandshakeStateMachine};
pub use scene::{Scene, TankLayout, TankScene};
pub use tick::{TickLoop, TickReport};
pub use world::{SystemId, World};
