//! ECS error types.

use crate::capability::CapabilityKind;
use crate::entity::EntityId;

/// Errors raised by component registration and entity attach/detach.
///
/// All of these are programming errors on the caller's side; none of them
/// are retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EcsError {
    /// The entity already holds a component of this capability, or the same
    /// capability appeared twice in one registration batch.
    #[error("{entity} already holds a {kind} component")]
    DuplicateComponent {
        /// The entity being registered.
        entity: EntityId,
        /// The capability that was duplicated.
        kind: CapabilityKind,
    },

    /// The entity identity is already present in the live mapping.
    #[error("{0} is already attached")]
    AlreadyAttached(EntityId),

    /// The entity identity is not present in the live mapping.
    #[error("{0} is not attached")]
    UnknownEntity(EntityId),
}
