//! The live-entity mapping.
//!
//! An [`EntityRegistry`] maps each attached [`EntityId`] to its [`Entity`]
//! record. Detaching an entity also releases its slots in the
//! [`ComponentStore`], which is why detach takes the store by reference.

use std::collections::BTreeMap;

use tracing::debug;

use crate::capability::CapabilityCode;
use crate::entity::{Entity, EntityId};
use crate::error::EcsError;
use crate::store::ComponentStore;

/// Mapping from live entity identity to its record.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    live: BTreeMap<EntityId, Entity>,
}

impl EntityRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `entity` live.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::AlreadyAttached`] if its identity is already live.
    pub fn attach(&mut self, entity: Entity) -> Result<(), EcsError> {
        if self.live.contains_key(&entity.id) {
            return Err(EcsError::AlreadyAttached(entity.id));
        }
        self.live.insert(entity.id, entity);
        debug!(entity = %entity.id, code = %entity.code, "attached entity");
        Ok(())
    }

    /// Remove `id` from the live mapping and release its component slots.
    ///
    /// Returns the record as it was at detach time. Its code is stale from
    /// this point on.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnknownEntity`] if `id` is not live.
    pub fn detach(&mut self, id: EntityId, store: &mut ComponentStore) -> Result<Entity, EcsError> {
        let entity = self.live.remove(&id).ok_or(EcsError::UnknownEntity(id))?;
        store.release(id);
        debug!(entity = %id, "detached entity");
        Ok(entity)
    }

    /// Returns the record for a live entity.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.live.get(&id)
    }

    /// Mutable access to a live record, used to register components after
    /// attach.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.live.get_mut(&id)
    }

    /// Returns the aggregate code of a live entity.
    #[must_use]
    pub fn code_of(&self, id: EntityId) -> Option<CapabilityCode> {
        self.live.get(&id).map(|e| e.code)
    }

    /// Returns `true` if `id` is live.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.live.contains_key(&id)
    }

    /// Iterate live entities in identity order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.live.values()
    }

    /// Number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Returns `true` if no entity is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}
