//! Per-capability component tables and the capability query engine.
//!
//! A [`ComponentStore`] holds one table per [`CapabilityKind`], each mapping
//! [`EntityId`] to the [`Component`] for that entity. Lookups go through the
//! entity's aggregate code first, so asking for a capability the entity does
//! not hold is an `Option::None`, never a panic.
//!
//! Tables are ordered by identity, which makes [`ComponentStore::all_of`]
//! deterministic. Iterators borrow the store, so inserting or removing
//! entries while one is live is rejected at compile time; mutating the
//! yielded payloads through [`ComponentStore::all_of_mut`] is allowed.

use std::collections::{BTreeMap, btree_map};

use tracing::debug;

use crate::capability::{CapabilityCode, CapabilityKind, CapabilityTable};
use crate::component::{Capability, Component};
use crate::entity::{Entity, EntityId};
use crate::error::EcsError;

type Table = BTreeMap<EntityId, Component>;

/// Component tables for every capability.
#[derive(Debug, Default)]
pub struct ComponentStore {
    capabilities: CapabilityTable,
    tables: BTreeMap<CapabilityKind, Table>,
}

impl ComponentStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the code for `kind`, claiming a bit on first reference.
    pub fn claim(&mut self, kind: CapabilityKind) -> CapabilityCode {
        self.capabilities.claim(kind)
    }

    /// Returns the code for `kind` if it has been claimed.
    #[must_use]
    pub fn capability(&self, kind: CapabilityKind) -> Option<CapabilityCode> {
        self.capabilities.lookup(kind)
    }

    /// Returns the capability table.
    #[must_use]
    pub fn capabilities(&self) -> &CapabilityTable {
        &self.capabilities
    }

    /// Install `components` for `entity` and set the matching bits in its
    /// aggregate code.
    ///
    /// The batch is validated before anything is written, so a failure leaves
    /// both the store and `entity` untouched.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::DuplicateComponent`] if the entity already holds a
    /// component of one of the given capabilities, or if the batch itself
    /// names a capability twice.
    pub fn register(
        &mut self,
        entity: &mut Entity,
        components: Vec<Component>,
    ) -> Result<(), EcsError> {
        let mut seen: Vec<CapabilityKind> = Vec::with_capacity(components.len());
        for component in &components {
            let kind = component.kind();
            if seen.contains(&kind) || self.contains(entity.id, kind) {
                return Err(EcsError::DuplicateComponent {
                    entity: entity.id,
                    kind,
                });
            }
            seen.push(kind);
        }

        for component in components {
            let kind = component.kind();
            let code = self.capabilities.claim(kind);
            self.tables
                .entry(kind)
                .or_default()
                .insert(entity.id, component);
            entity.code |= code;
        }

        debug!(entity = %entity.id, code = %entity.code, "registered components");
        Ok(())
    }

    /// Returns the component of `kind` held by `entity`.
    ///
    /// Absence is reported as `None` when the capability was never claimed,
    /// when the entity's code lacks its bit, or when the table has no entry
    /// for the entity (e.g. after detach).
    #[must_use]
    pub fn get(&self, entity: &Entity, kind: CapabilityKind) -> Option<&Component> {
        let code = self.capabilities.lookup(kind)?;
        if !entity.code.contains(code) {
            return None;
        }
        self.tables.get(&kind)?.get(&entity.id)
    }

    /// Mutable variant of [`ComponentStore::get`].
    pub fn get_mut(&mut self, entity: &Entity, kind: CapabilityKind) -> Option<&mut Component> {
        let code = self.capabilities.lookup(kind)?;
        if !entity.code.contains(code) {
            return None;
        }
        self.tables.get_mut(&kind)?.get_mut(&entity.id)
    }

    /// Look up an optional capability on `entity` and borrow its payload.
    #[must_use]
    pub fn try_get<T: Capability>(&self, entity: &Entity) -> Option<&T> {
        self.get(entity, T::KIND).and_then(T::from_component)
    }

    /// Mutable variant of [`ComponentStore::try_get`].
    pub fn try_get_mut<T: Capability>(&mut self, entity: &Entity) -> Option<&mut T> {
        self.get_mut(entity, T::KIND)
            .and_then(T::from_component_mut)
    }

    /// Returns `true` if the table for `kind` has an entry for `id`.
    #[must_use]
    pub fn contains(&self, id: EntityId, kind: CapabilityKind) -> bool {
        self.tables
            .get(&kind)
            .is_some_and(|table| table.contains_key(&id))
    }

    /// Every `(identity, component)` pair holding `kind`.
    ///
    /// The sequence is finite and cheap to restart: call again, or clone the
    /// returned iterator before consuming it.
    #[must_use]
    pub fn all_of(&self, kind: CapabilityKind) -> AllOf<'_> {
        AllOf {
            inner: self.tables.get(&kind).map(|table| table.iter()),
        }
    }

    /// Like [`ComponentStore::all_of`] but yields mutable payloads.
    pub fn all_of_mut(&mut self, kind: CapabilityKind) -> AllOfMut<'_> {
        AllOfMut {
            inner: self.tables.get_mut(&kind).map(|table| table.iter_mut()),
        }
    }

    /// Typed view over [`ComponentStore::all_of`].
    pub fn iter<T: Capability>(&self) -> impl Iterator<Item = (EntityId, &T)> + '_ {
        self.all_of(T::KIND)
            .filter_map(|(id, c)| T::from_component(c).map(|t| (id, t)))
    }

    /// Typed view over [`ComponentStore::all_of_mut`].
    pub fn iter_mut<T: Capability>(&mut self) -> impl Iterator<Item = (EntityId, &mut T)> + '_ {
        self.all_of_mut(T::KIND)
            .filter_map(|(id, c)| T::from_component_mut(c).map(|t| (id, t)))
    }

    /// Number of entities holding `kind`.
    #[must_use]
    pub fn count(&self, kind: CapabilityKind) -> usize {
        self.tables.get(&kind).map_or(0, BTreeMap::len)
    }

    /// Recompute the aggregate code for `id` from the tables.
    ///
    /// This is the ground truth an [`Entity::code`] must always agree with.
    #[must_use]
    pub fn derived_code(&self, id: EntityId) -> CapabilityCode {
        let mut code = CapabilityCode::EMPTY;
        for (kind, table) in &self.tables {
            if table.contains_key(&id) {
                if let Some(c) = self.capabilities.lookup(*kind) {
                    code |= c;
                }
            }
        }
        code
    }

    /// Remove `id` from every table it appears in.
    ///
    /// Returns the union of the released capabilities.
    pub fn release(&mut self, id: EntityId) -> CapabilityCode {
        let mut released = CapabilityCode::EMPTY;
        for (kind, table) in &mut self.tables {
            if table.remove(&id).is_some() {
                if let Some(c) = self.capabilities.lookup(*kind) {
                    released |= c;
                }
            }
        }
        debug!(entity = %id, released = %released, "released component slots");
        released
    }
}

/// Iterator returned by [`ComponentStore::all_of`].
#[derive(Debug, Clone)]
pub struct AllOf<'a> {
    inner: Option<btree_map::Iter<'a, EntityId, Component>>,
}

impl<'a> Iterator for AllOf<'a> {
    type Item = (EntityId, &'a Component);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.as_mut()?.next().map(|(&id, c)| (id, c))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner
            .as_ref()
            .map_or((0, Some(0)), Iterator::size_hint)
    }
}

/// Iterator returned by [`ComponentStore::all_of_mut`].
#[derive(Debug)]
pub struct AllOfMut<'a> {
    inner: Option<btree_map::IterMut<'a, EntityId, Component>>,
}

impl<'a> Iterator for AllOfMut<'a> {
    type Item = (EntityId, &'a mut Component);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.as_mut()?.next().map(|(&id, c)| (id, c))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner
            .as_ref()
            .map_or((0, Some(0)), Iterator::size_hint)
    }
}
