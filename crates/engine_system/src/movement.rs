//! Input-driven movement.
//!
//! `update` samples each attached entity's bound input axes into its
//! [`MovementComponent`], then applies the player actions received this
//! tick. Player `n` drives the `n`-th attached mover in identity order, and
//! an action overrides the local axes for that tick. `fixed_update`
//! integrates the resulting input:
//!
//! ```text
//! displacement = forward(rotation) * velocity * dt * input_move
//! turn         = yaw(input_turn * turn_speed * dt)
//! ```
//!
//! Entities that also hold a physical [`ActorComponent`] are moved through
//! the [`PhysicsBackend`] and take the resolved pose back. Everything else,
//! including actors whose body the backend does not know, is integrated
//! kinematically on the component itself.

use engine_component::{ActorComponent, CapabilityKind, Entity, MovementComponent};
use engine_math::yaw_rotation;
use tracing::{debug, trace, warn};

use crate::context::SystemContext;
use crate::input::InputSource;
use crate::physics::PhysicsBackend;
use crate::system::{System, SystemError};

/// Samples input and integrates movement.
pub struct MovementSystem {
    input: Box<dyn InputSource>,
    physics: Box<dyn PhysicsBackend>,
}

impl MovementSystem {
    /// Create a movement system over the given collaborators.
    #[must_use]
    pub fn new(input: Box<dyn InputSource>, physics: Box<dyn PhysicsBackend>) -> Self {
        Self { input, physics }
    }

    /// The physics backend, for hosts that inspect body poses.
    #[must_use]
    pub fn physics(&self) -> &dyn PhysicsBackend {
        self.physics.as_ref()
    }
}

impl std::fmt::Debug for MovementSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MovementSystem").finish_non_exhaustive()
    }
}

impl System for MovementSystem {
    fn name(&self) -> &'static str {
        "movement"
    }

    fn update(&mut self, ctx: &mut SystemContext<'_>) -> Result<(), SystemError> {
        let movers = attached_movers(ctx);

        for entity in &movers {
            let Some(movement) = ctx.store.try_get_mut::<MovementComponent>(entity) else {
                continue;
            };
            if let Some(axis) = movement.axis_move_name.as_deref() {
                movement.input_move_value = self.input.axis(axis);
            }
            if let Some(axis) = movement.axis_turn_name.as_deref() {
                movement.input_turn_value = self.input.axis(axis);
            }
        }

        for action in ctx.frame.actions() {
            let slot = (action.player_id as usize).checked_sub(1);
            let Some(entity) = slot.and_then(|i| movers.get(i)) else {
                debug!(player_id = action.player_id, "no entity for player action");
                continue;
            };
            if let Some(movement) = ctx.store.try_get_mut::<MovementComponent>(entity) {
                movement.input_move_value = action.move_value;
                movement.input_turn_value = action.turn_value;
                trace!(entity = %entity.id, player_id = action.player_id, "applied player action");
            }
        }
        Ok(())
    }

    fn fixed_update(&mut self, ctx: &mut SystemContext<'_>) -> Result<(), SystemError> {
        let dt = ctx.dt;

        for entity in attached_movers(ctx) {
            let body = ctx
                .store
                .try_get::<ActorComponent>(&entity)
                .and_then(|actor| actor.body);
            let Some(movement) = ctx.store.try_get_mut::<MovementComponent>(&entity) else {
                continue;
            };

            let displacement =
                movement.forward() * movement.velocity * dt * movement.input_move_value;
            let turn = yaw_rotation(movement.input_turn_value * movement.turn_speed * dt);

            let current = match body {
                Some(body) => {
                    let current = self.physics.pose(body);
                    if current.is_none() {
                        warn!(
                            entity = %entity.id,
                            ?body,
                            "physics backend has no such body, moving kinematically"
                        );
                    }
                    current.map(|pose| (body, pose))
                }
                None => None,
            };

            match current {
                Some((body, current)) => {
                    self.physics
                        .move_position(body, current.position + displacement);
                    self.physics.move_rotation(body, current.rotation * turn);
                    if let Some(resolved) = self.physics.pose(body) {
                        movement.set_pose(resolved);
                    }
                }
                None => {
                    movement.position += displacement;
                    movement.rotation *= turn;
                }
            }
            trace!(entity = %entity.id, position = ?movement.position, "integrated movement");
        }
        Ok(())
    }
}

/// Live entities holding a movement component, in identity order.
/// Registered but not yet attached entities are left out.
fn attached_movers(ctx: &SystemContext<'_>) -> Vec<Entity> {
    ctx.registry
        .iter()
        .filter(|entity| ctx.store.contains(entity.id, CapabilityKind::Movement))
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use engine_component::{BodyHandle, Component, ComponentStore, EntityAllocator, EntityRegistry};
    use engine_math::{Pose, Quat, Vec3};
    use engine_component::EntityId;
    use engine_net::message::PlayerAction;
    use engine_net::{Message, MessageKind, NetworkSession};

    use super::*;
    use crate::context::FrameBuffer;
    use crate::input::AxisTable;
    use crate::physics::BodyTable;

    struct Fixture {
        registry: EntityRegistry,
        store: ComponentStore,
        session: NetworkSession,
        frame: FrameBuffer,
        alloc: EntityAllocator,
    }

    impl Fixture {
        fn new() -> Self {
            let (session, _endpoint) = NetworkSession::pair();
            Self {
                registry: EntityRegistry::new(),
                store: ComponentStore::new(),
                session,
                frame: FrameBuffer::new(),
                alloc: EntityAllocator::new(),
            }
        }

        fn spawn(&mut self, components: Vec<Component>) -> EntityId {
            let mut e = self.alloc.allocate();
            self.store.register(&mut e, components).unwrap();
            self.registry.attach(e).unwrap();
            e.id
        }

        fn ctx(&mut self, dt: f32) -> SystemContext<'_> {
            SystemContext {
                tick_id: 1,
                dt,
                registry: &self.registry,
                store: &mut self.store,
                session: &self.session,
                frame: &mut self.frame,
            }
        }

        fn movement(&self, id: EntityId) -> MovementComponent {
            let e = self.registry.get(id).unwrap();
            self.store.try_get::<MovementComponent>(e).unwrap().clone()
        }
    }

    fn driving(move_value: f32, turn_value: f32) -> MovementComponent {
        let mut m = MovementComponent::new(5.0, 180.0);
        m.input_move_value = move_value;
        m.input_turn_value = turn_value;
        m
    }

    fn no_input() -> MovementSystem {
        MovementSystem::new(Box::new(AxisTable::new()), Box::new(BodyTable::new()))
    }

    #[test]
    fn test_kinematic_step_moves_forward_only() {
        let mut fx = Fixture::new();
        let id = fx.spawn(vec![driving(1.0, 0.0).into()]);
        let before = fx.movement(id);
        let dt = 1.0 / 60.0;

        let mut system = no_input();
        system.fixed_update(&mut fx.ctx(dt)).unwrap();

        let after = fx.movement(id);
        let expected = before.position + before.forward() * 5.0 * dt;
        assert!(after.position.abs_diff_eq(expected, 1e-6));
        assert_eq!(after.rotation, before.rotation);
    }

    #[test]
    fn test_kinematic_turn_rotates_around_up() {
        let mut fx = Fixture::new();
        let id = fx.spawn(vec![driving(0.0, 1.0).into()]);

        let mut system = no_input();
        // 180 deg/s for one second is a half turn.
        system.fixed_update(&mut fx.ctx(1.0)).unwrap();

        let after = fx.movement(id);
        assert_eq!(after.position, Vec3::ZERO);
        assert!(after.forward().abs_diff_eq(-Vec3::Z, 1e-5));
    }

    #[test]
    fn test_physical_actor_takes_resolved_pose() {
        struct Clamped(BodyTable);
        impl PhysicsBackend for Clamped {
            fn pose(&self, body: BodyHandle) -> Option<Pose> {
                self.0.pose(body)
            }
            fn move_position(&mut self, body: BodyHandle, position: Vec3) {
                // A wall at z = 0.05.
                self.0
                    .move_position(body, position.min(Vec3::new(f32::MAX, f32::MAX, 0.05)));
            }
            fn move_rotation(&mut self, body: BodyHandle, rotation: Quat) {
                self.0.move_rotation(body, rotation);
            }
        }

        let mut bodies = BodyTable::new();
        let body = bodies.spawn(Pose::IDENTITY);
        let mut fx = Fixture::new();
        let id = fx.spawn(vec![
            driving(1.0, 0.0).into(),
            ActorComponent::physical(body).into(),
        ]);

        let mut system = MovementSystem::new(Box::new(AxisTable::new()), Box::new(Clamped(bodies)));
        for _ in 0..10 {
            system.fixed_update(&mut fx.ctx(1.0 / 60.0)).unwrap();
        }

        let after = fx.movement(id);
        assert_eq!(after.position, Vec3::new(0.0, 0.0, 0.05));
        assert_eq!(system.physics().pose(body).map(|p| p.position), Some(after.position));
    }

    #[test]
    fn test_actor_without_body_stays_kinematic() {
        let mut fx = Fixture::new();
        let id = fx.spawn(vec![
            driving(1.0, 0.0).into(),
            ActorComponent::default().into(),
        ]);

        let mut system = no_input();
        system.fixed_update(&mut fx.ctx(1.0)).unwrap();

        assert!(fx.movement(id).position.abs_diff_eq(Vec3::new(0.0, 0.0, 5.0), 1e-6));
    }

    #[test]
    fn test_update_samples_bound_axes() {
        let mut fx = Fixture::new();
        let bound = fx.spawn(vec![
            MovementComponent::new(5.0, 180.0)
                .with_axes("Vertical1", "Horizontal1")
                .into(),
        ]);
        let unbound = fx.spawn(vec![driving(0.25, 0.5).into()]);

        let input = AxisTable::new()
            .with("Vertical1", 1.0)
            .with("Horizontal1", -0.5);
        let mut system = MovementSystem::new(Box::new(input), Box::new(BodyTable::new()));
        system.update(&mut fx.ctx(1.0 / 60.0)).unwrap();

        let m = fx.movement(bound);
        assert_eq!(m.input_move_value, 1.0);
        assert_eq!(m.input_turn_value, -0.5);
        let m = fx.movement(unbound);
        assert_eq!(m.input_move_value, 0.25);
        assert_eq!(m.input_turn_value, 0.5);
    }

    #[test]
    fn test_unattached_entity_is_not_simulated() {
        let mut fx = Fixture::new();
        let mut loose = fx.alloc.allocate();
        fx.store
            .register(&mut loose, vec![driving(1.0, 0.0).into()])
            .unwrap();

        let mut system = no_input();
        system.fixed_update(&mut fx.ctx(1.0)).unwrap();

        let m = fx.store.try_get::<MovementComponent>(&loose).unwrap();
        assert_eq!(m.position, Vec3::ZERO);
    }

    #[test]
    fn test_update_skips_unattached_entities() {
        let mut fx = Fixture::new();
        let mut loose = fx.alloc.allocate();
        fx.store
            .register(
                &mut loose,
                vec![
                    MovementComponent::new(5.0, 180.0)
                        .with_axes("Vertical1", "Horizontal1")
                        .into(),
                ],
            )
            .unwrap();

        let input = AxisTable::new().with("Vertical1", 1.0);
        let mut system = MovementSystem::new(Box::new(input), Box::new(BodyTable::new()));
        system.update(&mut fx.ctx(1.0 / 60.0)).unwrap();

        let m = fx.store.try_get::<MovementComponent>(&loose).unwrap();
        assert_eq!(m.input_move_value, 0.0);
    }

    #[test]
    fn test_player_action_drives_matching_entity() {
        let mut fx = Fixture::new();
        let first = fx.spawn(vec![
            MovementComponent::new(5.0, 180.0)
                .with_axes("Vertical1", "Horizontal1")
                .into(),
        ]);
        let second = fx.spawn(vec![MovementComponent::new(5.0, 180.0).into()]);
        let action = |player_id, move_value, turn_value| {
            Message::new(
                MessageKind::Action,
                &PlayerAction {
                    player_id,
                    move_value,
                    turn_value,
                },
            )
            .unwrap()
        };
        fx.frame.push(action(2, 1.0, -1.0));
        fx.frame.push(action(9, 1.0, 1.0));

        let input = AxisTable::new().with("Vertical1", 0.5);
        let mut system = MovementSystem::new(Box::new(input), Box::new(BodyTable::new()));
        system.update(&mut fx.ctx(1.0 / 60.0)).unwrap();

        let m = fx.movement(first);
        assert_eq!(m.input_move_value, 0.5);
        assert_eq!(m.input_turn_value, 0.0);
        let m = fx.movement(second);
        assert_eq!(m.input_move_value, 1.0);
        assert_eq!(m.input_turn_value, -1.0);

        system.fixed_update(&mut fx.ctx(1.0)).unwrap();
        assert_ne!(fx.movement(second).position, Vec3::ZERO);
        assert_eq!(fx.movement(first).position, Vec3::new(0.0, 0.0, 2.5));
    }

    #[test]
    fn test_unknown_body_falls_back_to_kinematic() {
        let mut fx = Fixture::new();
        let id: EntityId = fx.spawn(vec![
            driving(1.0, 0.0).into(),
            ActorComponent::physical(BodyHandle(42)).into(),
        ]);

        let mut system = no_input();
        system.fixed_update(&mut fx.ctx(1.0)).unwrap();

        assert!(fx.movement(id).position.abs_diff_eq(Vec3::new(0.0, 0.0, 5.0), 1e-6));
        assert_eq!(system.physics().pose(BodyHandle(42)), None);
    }
}
