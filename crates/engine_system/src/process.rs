//! Systems that bracket the gameplay systems each tick.
//!
//! [`PreProcessSystem`] runs first and moves gameplay messages from the
//! network queue into the tick's [`FrameBuffer`](crate::FrameBuffer).
//! [`PostProcessSystem`] runs last: on every fixed step it reports the pose
//! of each moving entity, and at the end of `update` it clears the frame
//! inbox.

use engine_component::MovementComponent;
use engine_net::message::StateUpdate;
use engine_net::{Message, MessageKind};
use tracing::debug;

use crate::context::SystemContext;
use crate::system::{System, SystemError};

/// Drains gameplay messages into the frame inbox.
#[derive(Debug, Default)]
pub struct PreProcessSystem;

impl PreProcessSystem {
    /// Create the system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl System for PreProcessSystem {
    fn name(&self) -> &'static str {
        "pre_process"
    }

    fn update(&mut self, ctx: &mut SystemContext<'_>) -> Result<(), SystemError> {
        let mut received = 0usize;
        while let Some(message) = ctx.session.get_message() {
            if message.kind.is_gameplay() {
                ctx.frame.push(message);
                received += 1;
            } else {
                debug!(kind = %message.kind, "discarding late handshake message");
            }
        }
        if received > 0 {
            debug!(tick_id = ctx.tick_id, received, "buffered gameplay messages");
        }
        Ok(())
    }
}

/// Publishes poses and closes out the frame.
#[derive(Debug, Default)]
pub struct PostProcessSystem {
    sent: u64,
}

impl PostProcessSystem {
    /// Create the system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total state messages sent so far.
    #[must_use]
    pub fn sent(&self) -> u64 {
        self.sent
    }
}

impl System for PostProcessSystem {
    fn name(&self) -> &'static str {
        "post_process"
    }

    fn update(&mut self, ctx: &mut SystemContext<'_>) -> Result<(), SystemError> {
        ctx.frame.clear();
        Ok(())
    }

    fn fixed_update(&mut self, ctx: &mut SystemContext<'_>) -> Result<(), SystemError> {
        for (entity, movement) in ctx.store.iter::<MovementComponent>() {
            if !ctx.registry.contains(entity) {
                continue;
            }
            let update = StateUpdate {
                entity,
                pose: movement.pose(),
            };
            ctx.session
                .send_message(Message::new(MessageKind::State, &update)?)?;
            self.sent += 1;
        }
        Ok(())
    }
}
