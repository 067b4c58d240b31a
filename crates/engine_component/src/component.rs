//! Component payloads and the [`Component`] tagged union.
//!
//! Each capability has one payload struct. Stores hold them wrapped in
//! [`Component`] so a single table type serves every capability; the
//! [`Capability`] trait lets callers get back to the concrete payload with a
//! pattern match instead of a cast.

use engine_math::{Pose, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::capability::CapabilityKind;

/// Opaque reference to a rendered instance owned by the host engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RenderInstance(pub u64);

/// Opaque reference to a physics body owned by the physics backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BodyHandle(pub u64);

/// Movement state for an input-driven entity.
///
/// `input_move_value` and `input_turn_value` are transient: they are sampled
/// every `Update` and consumed by the next `FixedUpdate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementComponent {
    /// World-space position.
    pub position: Vec3,
    /// Orientation.
    pub rotation: Quat,
    /// Forward speed in units per second at full input.
    pub velocity: f32,
    /// Turn speed in degrees per second at full input.
    pub turn_speed: f32,
    /// Input axis sampled into `input_move_value`.
    pub axis_move_name: Option<String>,
    /// Input axis sampled into `input_turn_value`.
    pub axis_turn_name: Option<String>,
    /// Last sampled move input, usually in `[-1, 1]`.
    pub input_move_value: f32,
    /// Last sampled turn input, usually in `[-1, 1]`.
    pub input_turn_value: f32,
}

impl MovementComponent {
    /// A stationary component at the origin with the given speeds.
    #[must_use]
    pub fn new(velocity: f32, turn_speed: f32) -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            velocity,
            turn_speed,
            axis_move_name: None,
            axis_turn_name: None,
            input_move_value: 0.0,
            input_turn_value: 0.0,
        }
    }

    /// Place the component at `position`.
    #[must_use]
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Bind the move and turn input axes.
    #[must_use]
    pub fn with_axes(mut self, move_axis: impl Into<String>, turn_axis: impl Into<String>) -> Self {
        self.axis_move_name = Some(move_axis.into());
        self.axis_turn_name = Some(turn_axis.into());
        self
    }

    /// Current position and rotation.
    #[must_use]
    pub fn pose(&self) -> Pose {
        Pose::new(self.position, self.rotation)
    }

    /// Overwrite position and rotation.
    pub fn set_pose(&mut self, pose: Pose) {
        self.position = pose.position;
        self.rotation = pose.rotation;
    }

    /// The direction the entity is facing.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        self.pose().forward()
    }
}

impl Default for MovementComponent {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// An entity that exists in the host scene.
///
/// An actor with a `body` is physically simulated; without one it is
/// rendered only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActorComponent {
    /// The spawned render instance, once the host has created it.
    pub render_instance: Option<RenderInstance>,
    /// The physics body driving the instance, if any.
    pub body: Option<BodyHandle>,
}

impl ActorComponent {
    /// An actor backed by a physics body.
    #[must_use]
    pub fn physical(body: BodyHandle) -> Self {
        Self {
            render_instance: None,
            body: Some(body),
        }
    }

    /// Returns `true` if a physics body drives this actor.
    #[must_use]
    pub fn is_physical(&self) -> bool {
        self.body.is_some()
    }
}

/// A component payload tagged by its capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Component {
    /// See [`MovementComponent`].
    Movement(MovementComponent),
    /// See [`ActorComponent`].
    Actor(ActorComponent),
}

impl Component {
    /// The capability this payload provides.
    #[must_use]
    pub const fn kind(&self) -> CapabilityKind {
        match self {
            Component::Movement(_) => CapabilityKind::Movement,
            Component::Actor(_) => CapabilityKind::Actor,
        }
    }
}

/// Binds a payload struct to its [`Component`] variant.
pub trait Capability: Sized + 'static {
    /// The capability this payload provides.
    const KIND: CapabilityKind;

    /// Borrow the payload if `component` is this capability.
    fn from_component(component: &Component) -> Option<&Self>;

    /// Mutably borrow the payload if `component` is this capability.
    fn from_component_mut(component: &mut Component) -> Option<&mut Self>;

    /// Wrap the payload.
    fn into_component(self) -> Component;
}

impl Capability for MovementComponent {
    const KIND: CapabilityKind = CapabilityKind::Movement;

    fn from_component(component: &Component) -> Option<&Self> {
        match component {
            Component::Movement(m) => Some(m),
            _ => None,
        }
    }

    fn from_component_mut(component: &mut Component) -> Option<&mut Self> {
        match component {
            Component::Movement(m) => Some(m),
            _ => None,
        }
    }

    fn into_component(self) -> Component {
        Component::Movement(self)
    }
}

impl Capability for ActorComponent {
    const KIND: CapabilityKind = CapabilityKind::Actor;

    fn from_component(component: &Component) -> Option<&Self> {
        match component {
            Component::Actor(a) => Some(a),
            _ => None,
        }
    }

    fn from_component_mut(component: &mut Component) -> Option<&mut Self> {
        match component {
            Component::Actor(a) => Some(a),
            _ => None,
        }
    }

    fn into_component(self) -> Component {
        Component::Actor(self)
    }
}

impl From<MovementComponent> for Component {
    fn from(value: MovementComponent) -> Self {
        value.into_component()
    }
}

impl From<ActorComponent> for Component {
    fn from(value: ActorComponent) -> Self {
        value.into_component()
    }
}
