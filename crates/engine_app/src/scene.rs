//! Scene setup.

use engine_component::{ActorComponent, MovementComponent, RenderInstance};
use engine_math::{Pose, Vec3};
use engine_system::{AxisTable, BodyTable, MovementSystem, PostProcessSystem, PreProcessSystem};
use tracing::info;

use crate::error::AppError;
use crate::world::World;

/// Builds the entities, components, and systems of a session.
pub trait Scene {
    /// Populate `world`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError`] if an entity cannot be assembled.
    fn setup(&mut self, world: &mut World) -> Result<(), AppError>;
}

/// One tank in the demo scene.
#[derive(Debug, Clone)]
pub struct TankLayout {
    pub position: Vec3,
    pub velocity: f32,
    pub turn_speed: f32,
    pub axis_move: &'static str,
    pub axis_turn: &'static str,
}

/// Two physically simulated tanks driven by local input axes.
#[derive(Debug, Clone)]
pub struct TankScene {
    pub tanks: Vec<TankLayout>,
}

impl Default for TankScene {
    fn default() -> Self {
        Self {
            tanks: vec![
                TankLayout {
                    position: Vec3::new(15.0, 0.0, 2.0),
                    velocity: 5.0,
                    turn_speed: 180.0,
                    axis_move: "Vertical1",
                    axis_turn: "Horizontal1",
                },
                TankLayout {
                    position: Vec3::new(-10.0, 0.0, 2.0),
                    velocity: 5.0,
                    turn_speed: 180.0,
                    axis_move: "Vertical2",
                    axis_turn: "Horizontal2",
                },
            ],
        }
    }
}

impl Scene for TankScene {
    fn setup(&mut self, world: &mut World) -> Result<(), AppError> {
        let mut bodies = BodyTable::new();

        for (index, tank) in self.tanks.iter().enumerate() {
            let body = bodies.spawn(Pose::from_position(tank.position));
            let movement = MovementComponent::new(tank.velocity, tank.turn_speed)
                .with_position(tank.position)
                .with_axes(tank.axis_move, tank.axis_turn);
            let actor = ActorComponent {
                render_instance: Some(RenderInstance(index as u64)),
                body: Some(body),
            };
            let id = world.spawn(vec![movement.into(), actor.into()])?;
            info!(entity = %id, position = ?tank.position, "spawned tank");
        }

        // No input device is bound here; axes read as zero until one is.
        let movement = MovementSystem::new(Box::new(AxisTable::new()), Box::new(bodies));
        world.attach_system(Box::new(PreProcessSystem::new()), false);
        world.attach_system(Box::new(movement), false);
        world.attach_system(Box::new(PostProcessSystem::new()), false);
        Ok(())
    }
}
