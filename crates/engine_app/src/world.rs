//! World state for one game session.
//!
//! The [`World`] owns entity allocation, the live-entity registry, the
//! component tables, and the ordered list of attached systems. Systems never
//! hold a reference back to it; each hook call borrows the world's tables
//! through a [`SystemContext`].

use std::collections::BTreeSet;

use engine_component::{
    Capability, Component, ComponentStore, EcsError, Entity, EntityAllocator, EntityId,
    EntityRegistry,
};
use engine_net::NetworkSession;
use engine_system::{FrameBuffer, System, SystemContext};
use tracing::{debug, info};

use crate::error::AppError;

/// Position of a system in the world's execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SystemId(pub usize);

struct SystemSlot {
    system: Box<dyn System>,
    enabled: bool,
}

#[derive(Clone, Copy)]
enum Hook {
    Update,
    FixedUpdate,
}

/// The aggregate owner of entities, components, and systems.
pub struct World {
    allocator: EntityAllocator,
    registry: EntityRegistry,
    store: ComponentStore,
    /// Identities that were live once and have since been detached.
    retired: BTreeSet<EntityId>,
    systems: Vec<SystemSlot>,
    /// Enable flags frozen at the start of the current tick.
    active: Vec<bool>,
    frame: FrameBuffer,
}

impl World {
    /// Create an empty world.
    #[must_use]
    pub fn new() -> Self {
        Self {
            allocator: EntityAllocator::new(),
            registry: EntityRegistry::new(),
            store: ComponentStore::new(),
            retired: BTreeSet::new(),
            systems: Vec::new(),
            active: Vec::new(),
            frame: FrameBuffer::new(),
        }
    }

    // ── Entities ────────────────────────────────────────────────────────────

    /// Allocate a fresh identity with an empty capability code.
    ///
    /// The entity is not live until passed to [`attach_entity`](Self::attach_entity).
    pub fn create_entity(&mut self) -> Entity {
        self.allocator.allocate()
    }

    /// Install `components` on a not-yet-attached entity.
    ///
    /// Live entities take new components through
    /// [`add_components`](Self::add_components) so their registry record
    /// stays in step with the store.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::AlreadyAttached`] if `entity` is a copy of a live
    /// record, and [`EcsError::UnknownEntity`] if its identity was never
    /// allocated by this world or has been detached. Returns
    /// [`EcsError::DuplicateComponent`] if any capability is already present.
    /// In every case neither `entity` nor the store is touched.
    pub fn register_components(
        &mut self,
        entity: &mut Entity,
        components: Vec<Component>,
    ) -> Result<(), EcsError> {
        self.check_pending(entity.id)?;
        self.store.register(entity, components)
    }

    /// Install `components` on a live entity.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnknownEntity`] if `id` is not live, or
    /// [`EcsError::DuplicateComponent`] as for
    /// [`register_components`](Self::register_components).
    pub fn add_components(
        &mut self,
        id: EntityId,
        components: Vec<Component>,
    ) -> Result<(), EcsError> {
        let entity = self
            .registry
            .get_mut(id)
            .ok_or(EcsError::UnknownEntity(id))?;
        self.store.register(entity, components)
    }

    /// Make `entity` live.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::AlreadyAttached`] if its identity is already live,
    /// or [`EcsError::UnknownEntity`] if it was never allocated here or has
    /// been detached.
    pub fn attach_entity(&mut self, entity: Entity) -> Result<EntityId, EcsError> {
        self.check_pending(entity.id)?;
        self.registry.attach(entity)?;
        Ok(entity.id)
    }

    /// Create, register, and attach an entity in one step.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::DuplicateComponent`] if `components` names a
    /// capability twice. Nothing is attached in that case.
    pub fn spawn(&mut self, components: Vec<Component>) -> Result<EntityId, EcsError> {
        let mut entity = self.create_entity();
        self.register_components(&mut entity, components)?;
        self.attach_entity(entity)
    }

    /// Remove a live entity and release every component slot it held.
    ///
    /// Identities are never handed out again, so a stale id only ever
    /// resolves to absence.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnknownEntity`] if `id` is not live.
    pub fn detach_entity(&mut self, id: EntityId) -> Result<Entity, EcsError> {
        let entity = self.registry.detach(id, &mut self.store)?;
        self.retired.insert(id);
        Ok(entity)
    }

    /// Accept only identities allocated here that have not been attached yet.
    fn check_pending(&self, id: EntityId) -> Result<(), EcsError> {
        if self.registry.contains(id) {
            return Err(EcsError::AlreadyAttached(id));
        }
        if !id.is_valid() || id.id() > self.allocator.count() || self.retired.contains(&id) {
            return Err(EcsError::UnknownEntity(id));
        }
        Ok(())
    }

    /// The record of a live entity.
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.registry.get(id)
    }

    /// Typed lookup of a live entity's component.
    #[must_use]
    pub fn try_get<T: Capability>(&self, id: EntityId) -> Option<&T> {
        let entity = self.registry.get(id)?;
        self.store.try_get::<T>(entity)
    }

    /// Live entities.
    #[must_use]
    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    /// Component tables.
    #[must_use]
    pub fn store(&self) -> &ComponentStore {
        &self.store
    }

    /// Mutable component tables.
    pub fn store_mut(&mut self) -> &mut ComponentStore {
        &mut self.store
    }

    // ── Systems ─────────────────────────────────────────────────────────────

    /// Append a system to the execution order.
    pub fn attach_system(&mut self, system: Box<dyn System>, enabled: bool) -> SystemId {
        let id = SystemId(self.systems.len());
        info!(system = system.name(), index = id.0, enabled, "attached system");
        self.systems.push(SystemSlot { system, enabled });
        id
    }

    /// Enable or disable one system from the next tick on.
    ///
    /// Returns `false` if `id` does not name an attached system.
    pub fn set_enabled(&mut self, id: SystemId, enabled: bool) -> bool {
        let Some(slot) = self.systems.get_mut(id.0) else {
            return false;
        };
        if slot.enabled != enabled {
            debug!(system = slot.system.name(), enabled, "system toggled");
        }
        slot.enabled = enabled;
        true
    }

    /// Whether a system is enabled.
    #[must_use]
    pub fn is_enabled(&self, id: SystemId) -> Option<bool> {
        self.systems.get(id.0).map(|slot| slot.enabled)
    }

    /// Enable every attached system.
    pub fn enable_all(&mut self) {
        for slot in &mut self.systems {
            slot.enabled = true;
        }
        info!(systems = self.systems.len(), "enabled all systems");
    }

    /// Returns `true` if every attached system is enabled.
    #[must_use]
    pub fn all_enabled(&self) -> bool {
        self.systems.iter().all(|slot| slot.enabled)
    }

    /// Returns `true` if any attached system is enabled.
    #[must_use]
    pub fn any_enabled(&self) -> bool {
        self.systems.iter().any(|slot| slot.enabled)
    }

    /// Number of attached systems.
    #[must_use]
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    /// System names in execution order.
    #[must_use]
    pub fn system_names(&self) -> Vec<&'static str> {
        self.systems.iter().map(|slot| slot.system.name()).collect()
    }

    // ── Tick ────────────────────────────────────────────────────────────────

    /// Freeze the enable flags for the tick about to run.
    ///
    /// Toggles made after this call, including from inside a hook, take
    /// effect at the next `begin_tick`. Systems attached mid-tick first run
    /// next tick.
    pub fn begin_tick(&mut self) {
        self.active.clear();
        self.active
            .extend(self.systems.iter().map(|slot| slot.enabled));
    }

    /// Call `update` on every active system in attach order.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::System`] for the first hook that fails. Later
    /// systems do not run that tick.
    pub fn run_update(
        &mut self,
        tick_id: u64,
        dt: f32,
        session: &NetworkSession,
    ) -> Result<(), AppError> {
        self.run_hook(Hook::Update, tick_id, dt, session)
    }

    /// Call `fixed_update` on every active system in attach order.
    ///
    /// # Errors
    ///
    /// As for [`run_update`](Self::run_update).
    pub fn run_fixed_update(
        &mut self,
        tick_id: u64,
        dt: f32,
        session: &NetworkSession,
    ) -> Result<(), AppError> {
        self.run_hook(Hook::FixedUpdate, tick_id, dt, session)
    }

    fn run_hook(
        &mut self,
        hook: Hook,
        tick_id: u64,
        dt: f32,
        session: &NetworkSession,
    ) -> Result<(), AppError> {
        let World {
            registry,
            store,
            systems,
            active,
            frame,
            ..
        } = self;

        for (slot, &on) in systems.iter_mut().zip(active.iter()) {
            if !on {
                continue;
            }
            let mut ctx = SystemContext {
                tick_id,
                dt,
                registry: &*registry,
                store: &mut *store,
                session,
                frame: &mut *frame,
            };
            let result = match hook {
                Hook::Update => slot.system.update(&mut ctx),
                Hook::FixedUpdate => slot.system.fixed_update(&mut ctx),
            };
            result.map_err(|source| AppError::System {
                system: slot.system.name(),
                source,
            })?;
        }
        Ok(())
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("entities", &self.registry.len())
            .field("systems", &self.system_names())
            .finish_non_exhaustive()
    }
}
