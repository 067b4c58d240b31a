//! # engine_net
//!
//! Network plumbing for the tank runtime.
//!
//! This crate provides:
//!
//! - [`message`]: [`Message`] values and their typed payloads.
//! - [`codec`]: MessagePack serialisation helpers.
//! - [`session`]: the thread-safe FIFO between the transport and the tick
//!   thread.
//! - [`subjects`]: NATS subject names.
//! - [`bridge`]: the async task that moves messages between NATS and a
//!   session.
//! - [`error`]: Network-layer error types.

pub mod bridge;
pub mod codec;
pub mod error;
pub mod message;
pub mod session;
pub mod subjects;

pub use bridge::NatsBridge;
pub use codec::{decode, encode};
pub use error::NetError;
pub use message::{Message, MessageKind, PlayerId};
pub use session::{NetworkSession, TransportEndpoint};
