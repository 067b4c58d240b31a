//! Entity identity and allocation.
//!
//! An [`EntityId`] is a lightweight `u64` identifier. An [`Entity`] pairs an
//! identity with its aggregate [`CapabilityCode`], the OR of the codes of the
//! components currently registered for it.

use serde::{Deserialize, Serialize};

use crate::capability::CapabilityCode;

/// A unique entity identifier.
///
/// Identities are allocated by the world and are never reused, so a stale
/// identity can never alias a newer entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl EntityId {
    /// The null / invalid entity sentinel.
    pub const INVALID: EntityId = EntityId(0);

    /// Create an identity from a raw `u64`.
    #[must_use]
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` identifier.
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }

    /// Returns `true` if this is a valid (non-zero) identity.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// An entity record: identity plus aggregate capability code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// The entity's identity.
    pub id: EntityId,
    /// OR of the codes of all components registered for this entity.
    pub code: CapabilityCode,
}

impl Entity {
    /// A fresh entity with no components.
    #[must_use]
    pub const fn new(id: EntityId) -> Self {
        Self {
            id,
            code: CapabilityCode::EMPTY,
        }
    }

    /// Returns `true` if the aggregate code holds `capability`.
    #[must_use]
    pub const fn has(&self, capability: CapabilityCode) -> bool {
        self.code.contains(capability)
    }
}

/// Allocates monotonically increasing entity identities.
#[derive(Debug)]
pub struct EntityAllocator {
    next_id: u64,
}

impl EntityAllocator {
    /// Creates a new allocator. IDs start at 1 (0 is reserved for [`EntityId::INVALID`]).
    #[must_use]
    pub fn new() -> Self {
        Self { next_id: 1 }
    }

    /// Allocates a fresh entity with an empty code.
    pub fn allocate(&mut self) -> Entity {
        let id = self.next_id;
        self.next_id += 1;
        Entity::new(EntityId(id))
    }

    /// Returns the number of entities allocated so far.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.next_id - 1
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_creation() {
        let e = EntityId::from_raw(42);
        assert_eq!(e.id(), 42);
        assert!(e.is_valid());
        assert!(!EntityId::INVALID.is_valid());
    }

    #[test]
    fn test_allocator_produces_unique_ids() {
        let mut alloc = EntityAllocator::new();
        let e1 = alloc.allocate();
        let e2 = alloc.allocate();
        let e3 = alloc.allocate();
        assert_eq!(e1.id.id(), 1);
        assert_eq!(e2.id.id(), 2);
        assert_eq!(e3.id.id(), 3);
        assert_eq!(alloc.count(), 3);
    }

    #[test]
    fn test_allocated_entity_has_empty_code() {
        let mut alloc = EntityAllocator::new();
        let e = alloc.allocate();
        assert!(e.code.is_empty());
        assert!(!e.has(CapabilityCode(1)));
    }

    #[test]
    fn test_entity_serialization_roundtrip() {
        let entity = Entity {
            id: EntityId::from_raw(999),
            code: CapabilityCode(0b11),
        };
        let bytes = rmp_serde::to_vec(&entity).unwrap();
        let restored: Entity = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(entity, restored);
    }
}
