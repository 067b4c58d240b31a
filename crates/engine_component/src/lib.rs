//! # engine_component
//!
//! The "C" in ECS. Defines the capability bitmask, the component payloads,
//! and the tables that hold them.
//!
//! This crate provides:
//!
//! - [`CapabilityKind`] / [`CapabilityCode`]: one bit per component type.
//! - [`Component`]: the tagged union of every component payload.
//! - [`Entity`] / [`EntityId`] / [`EntityAllocator`]: entity identity and its
//!   aggregate capability code.
//! - [`ComponentStore`]: per-capability tables keyed by entity identity.
//! - [`EntityRegistry`]: the live-entity mapping.

pub mod capability;
pub mod component;
pub mod entity;
pub mod error;
pub mod registry;
pub mod store;

pub use capability::{CapabilityCode, CapabilityKind, CapabilityTable};
pub use component::{
    ActorComponent, BodyHandle, Capability, Component, MovementComponent, RenderInstance,
};
pub use entity::{Entity, EntityAllocator, EntityId};
pub use error::EcsError;
pub use registry::EntityRegistry;
pub use store::{AllOf, AllOfMut, ComponentStore};
