//! Application-level error type.

use engine_component::EcsError;
use engine_net::NetError;
use engine_system::SystemError;

use crate::config::ConfigError;

/// Errors surfaced by the world and the tick loop.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The tick configuration cannot be run.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Entity or component bookkeeping failed.
    #[error(transparent)]
    Ecs(#[from] EcsError),

    /// The session queue or a payload codec failed.
    #[error(transparent)]
    Net(#[from] NetError),

    /// A system hook failed.
    #[error("system `{system}` failed: {source}")]
    System {
        /// The failing system.
        system: &'static str,
        /// What went wrong.
        #[source]
        source: SystemError,
    },
}
