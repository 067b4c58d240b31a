//! Network-layer error types.

use crate::message::MessageKind;

/// Errors that can occur during network operations.
#[derive(Debug, thiserror::Error)]
pub enum NetError {
    /// Failed to encode a payload to MessagePack.
    #[error("failed to encode message: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    /// Failed to decode a payload from MessagePack.
    #[error("failed to decode message: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    /// NATS connection error.
    #[error("NATS connection error: {0}")]
    Connect(#[from] async_nats::ConnectError),

    /// NATS subscription error.
    #[error("NATS subscribe error: {0}")]
    Subscribe(#[from] async_nats::SubscribeError),

    /// NATS publish error.
    #[error("NATS publish error: {0}")]
    Publish(#[from] async_nats::PublishError),

    /// The other side of a session queue has been dropped.
    #[error("session peer disconnected")]
    Disconnected,

    /// A payload was decoded against the wrong message kind.
    #[error("expected a {expected} message, got {actual}")]
    UnexpectedKind {
        /// The kind the caller asked for.
        expected: MessageKind,
        /// The kind the message actually carries.
        actual: MessageKind,
    },
}
