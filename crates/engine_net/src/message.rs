//! Message values exchanged with the session server.
//!
//! A [`Message`] is a tagged value: a [`MessageKind`] plus a MessagePack
//! payload. The transport only ever sees whole messages; the handshake and
//! gameplay systems decode the payload into one of the typed structs below.

use std::fmt;

use engine_component::EntityId;
use engine_math::Pose;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::codec;
use crate::error::NetError;

/// Server-assigned player number.
pub type PlayerId = u32;

/// Message discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKind {
    /// Client → server: announce the local player. Payload: [`InitRequest`].
    InitRequest,
    /// Server → client: the init request was accepted. No payload.
    InitAck,
    /// Client → server: ask for session metadata. Payload: [`MetaRequest`].
    MetaRequest,
    /// Server → client: session metadata. Payload: [`SessionMeta`].
    SessionMeta,
    /// Client → server: echo of the assigned player id. Payload: [`MetaAck`].
    MetaAck,
    /// Player input relayed by the server. Payload: [`PlayerAction`].
    Action,
    /// Authoritative pose of one entity. Payload: [`StateUpdate`].
    State,
}

impl MessageKind {
    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            MessageKind::InitRequest => "init-request",
            MessageKind::InitAck => "init-ack",
            MessageKind::MetaRequest => "meta-request",
            MessageKind::SessionMeta => "session-meta",
            MessageKind::MetaAck => "meta-ack",
            MessageKind::Action => "action",
            MessageKind::State => "state",
        }
    }

    /// Returns `true` for messages consumed by gameplay systems rather than
    /// the handshake.
    #[must_use]
    pub const fn is_gameplay(self) -> bool {
        matches!(self, MessageKind::Action | MessageKind::State)
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tagged message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// What the payload holds.
    pub kind: MessageKind,
    /// MessagePack-encoded payload; empty for payload-less kinds.
    pub payload: Vec<u8>,
}

impl Message {
    /// Build a message with an encoded payload.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::Encode`] if the payload cannot be serialised.
    pub fn new<T: Serialize>(kind: MessageKind, payload: &T) -> Result<Self, NetError> {
        Ok(Self {
            kind,
            payload: codec::encode(payload)?,
        })
    }

    /// Build a message with no payload.
    #[must_use]
    pub fn empty(kind: MessageKind) -> Self {
        Self {
            kind,
            payload: Vec::new(),
        }
    }

    /// Decode the payload, checking the kind first.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::UnexpectedKind`] if `self.kind != expected`, or
    /// [`NetError::Decode`] if the payload is malformed.
    pub fn decode<T: DeserializeOwned>(&self, expected: MessageKind) -> Result<T, NetError> {
        if self.kind != expected {
            return Err(NetError::UnexpectedKind {
                expected,
                actual: self.kind,
            });
        }
        codec::decode(&self.payload)
    }
}

// ── Handshake payloads ──────────────────────────────────────────────────────

/// Announces the local player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitRequest {
    /// Local player identity.
    pub player: String,
}

/// Asks the server for session metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaRequest {
    /// Local player identity.
    pub player: String,
}

/// Session metadata sent once the server has admitted the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMeta {
    /// The number the server assigned to this player.
    pub player_id: PlayerId,
}

/// Echo of the assigned player id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaAck {
    /// The id received in [`SessionMeta`].
    pub player_id: PlayerId,
}

// ── Gameplay payloads ───────────────────────────────────────────────────────

/// One player's input for one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerAction {
    /// Who produced the input.
    pub player_id: PlayerId,
    /// Move axis value.
    pub move_value: f32,
    /// Turn axis value.
    pub turn_value: f32,
}

/// The pose of one entity after a fixed step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateUpdate {
    /// The entity described.
    pub entity: EntityId,
    /// Its position and rotation.
    pub pose: Pose,
}

#[cfg(test)]
mod tests {
    use engine_math::Vec3;

    use super::*;

    #[test]
    fn test_session_meta_decodes() {
        let msg = Message::new(MessageKind::SessionMeta, &SessionMeta { player_id: 7 }).unwrap();
        let meta: SessionMeta = msg.decode(MessageKind::SessionMeta).unwrap();
        assert_eq!(meta.player_id, 7);
    }

    #[test]
    fn test_decode_checks_kind() {
        let msg = Message::empty(MessageKind::InitAck);
        let result: Result<SessionMeta, _> = msg.decode(MessageKind::SessionMeta);
        assert!(matches!(
            result,
            Err(NetError::UnexpectedKind {
                expected: MessageKind::SessionMeta,
                actual: MessageKind::InitAck
            })
        ));
    }

    #[test]
    fn test_whole_message_roundtrip() {
        let msg = Message::new(
            MessageKind::State,
            &StateUpdate {
                entity: EntityId::from_raw(3),
                pose: Pose::from_position(Vec3::new(1.0, 0.0, 2.0)),
            },
        )
        .unwrap();
        let bytes = codec::encode(&msg).unwrap();
        let restored: Message = codec::decode(&bytes).unwrap();
        assert_eq!(restored, msg);
        let update: StateUpdate = restored.decode(MessageKind::State).unwrap();
        assert_eq!(update.entity, EntityId::from_raw(3));
    }

    #[test]
    fn test_gameplay_kinds() {
        assert!(MessageKind::Action.is_gameplay());
        assert!(MessageKind::State.is_gameplay());
        assert!(!MessageKind::InitAck.is_gameplay());
        assert_eq!(MessageKind::InitAck.to_string(), "init-ack");
    }
}
