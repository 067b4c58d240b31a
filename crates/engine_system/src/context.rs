//! Per-tick execution context provided to system hooks.

use engine_component::{ComponentStore, EntityRegistry};
use engine_net::message::PlayerAction;
use engine_net::{Message, MessageKind, NetworkSession};
use tracing::warn;

/// Messages received during the current tick, shared by every system.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    inbox: Vec<Message>,
}

impl FrameBuffer {
    /// Create an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message to this tick's inbox.
    pub fn push(&mut self, message: Message) {
        self.inbox.push(message);
    }

    /// Messages received this tick, in arrival order.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.inbox
    }

    /// Decoded player actions received this tick. Malformed payloads are
    /// logged and skipped.
    #[must_use]
    pub fn actions(&self) -> Vec<PlayerAction> {
        self.inbox
            .iter()
            .filter(|m| m.kind == MessageKind::Action)
            .filter_map(|m| match m.decode(MessageKind::Action) {
                Ok(action) => Some(action),
                Err(e) => {
                    warn!(%e, "skipping malformed action");
                    None
                }
            })
            .collect()
    }

    /// Drop every buffered message.
    pub fn clear(&mut self) {
        self.inbox.clear();
    }

    /// Number of buffered messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inbox.len()
    }

    /// Returns `true` if nothing is buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inbox.is_empty()
    }
}

/// Context provided to a system hook.
///
/// Borrows the world's tables for the duration of one hook call, which is
/// what lets systems mutate components without a back-reference to the
/// world.
#[derive(Debug)]
pub struct SystemContext<'a> {
    /// The current tick counter.
    pub tick_id: u64,
    /// Seconds covered by this hook: the frame delta for `update`, the fixed
    /// step for `fixed_update`.
    pub dt: f32,
    /// Live entities.
    pub registry: &'a EntityRegistry,
    /// Component tables.
    pub store: &'a mut ComponentStore,
    /// Network queues.
    pub session: &'a NetworkSession,
    /// Messages gathered for this tick.
    pub frame: &'a mut FrameBuffer,
}
