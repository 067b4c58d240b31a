//! The [`System`] trait.

use engine_net::NetError;

use crate::context::SystemContext;

/// Errors a system hook can raise.
#[derive(Debug, thiserror::Error)]
pub enum SystemError {
    /// Sending or decoding a message failed.
    #[error("network error in system: {0}")]
    Net(#[from] NetError),
}

/// A per-tick logic unit.
///
/// Whether a hook runs at all is decided by the world's enable flags; the
/// system itself never sees a tick while disabled.
pub trait System: Send {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Called once per tick.
    ///
    /// # Errors
    ///
    /// Implementations return [`SystemError`] when a collaborator fails.
    fn update(&mut self, ctx: &mut SystemContext<'_>) -> Result<(), SystemError> {
        let _ = ctx;
        Ok(())
    }

    /// Called once per fixed-timestep boundary, with `ctx.dt` set to the
    /// fixed step.
    ///
    /// # Errors
    ///
    /// Implementations return [`SystemError`] when a collaborator fails.
    fn fixed_update(&mut self, ctx: &mut SystemContext<'_>) -> Result<(), SystemError> {
        let _ = ctx;
        Ok(())
    }
}
