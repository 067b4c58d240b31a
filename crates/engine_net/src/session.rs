//! The queue pair shared between the transport and the tick thread.
//!
//! [`NetworkSession::pair`] creates two unbounded FIFO channels and splits
//! them into a tick-side [`NetworkSession`] and a transport-side
//! [`TransportEndpoint`]. Neither side ever blocks: sends on an unbounded
//! channel return immediately and reads use `try_recv`.
//!
//! This is the only state that crosses the thread boundary.

use crossbeam_channel::{Receiver, Sender, TryRecvError, unbounded};
use tracing::trace;

use crate::error::NetError;
use crate::message::Message;

/// Tick-side half: receives inbound messages, sends outbound ones.
#[derive(Debug)]
pub struct NetworkSession {
    inbound: Receiver<Message>,
    outbound: Sender<Message>,
}

/// Transport-side half: delivers inbound messages, collects outbound ones.
///
/// Cloning yields another handle onto the same queues.
#[derive(Debug, Clone)]
pub struct TransportEndpoint {
    inbound: Sender<Message>,
    outbound: Receiver<Message>,
}

impl NetworkSession {
    /// Create a connected session / endpoint pair.
    #[must_use]
    pub fn pair() -> (NetworkSession, TransportEndpoint) {
        let (in_tx, in_rx) = unbounded();
        let (out_tx, out_rx) = unbounded();
        (
            NetworkSession {
                inbound: in_rx,
                outbound: out_tx,
            },
            TransportEndpoint {
                inbound: in_tx,
                outbound: out_rx,
            },
        )
    }

    /// Queue a message for the transport.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::Disconnected`] if every endpoint has been dropped.
    pub fn send_message(&self, message: Message) -> Result<(), NetError> {
        trace!(kind = %message.kind, "queue outbound");
        self.outbound
            .send(message)
            .map_err(|_| NetError::Disconnected)
    }

    /// Take the oldest inbound message, or `None` if the queue is empty.
    ///
    /// A disconnected transport looks the same as an empty queue once the
    /// remaining messages have been drained.
    #[must_use]
    pub fn get_message(&self) -> Option<Message> {
        match self.inbound.try_recv() {
            Ok(message) => Some(message),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Current inbound queue depth.
    #[must_use]
    pub fn message_len(&self) -> usize {
        self.inbound.len()
    }
}

impl TransportEndpoint {
    /// Hand a decoded message to the tick thread.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::Disconnected`] if the session has been dropped.
    pub fn deliver(&self, message: Message) -> Result<(), NetError> {
        trace!(kind = %message.kind, "deliver inbound");
        self.inbound
            .send(message)
            .map_err(|_| NetError::Disconnected)
    }

    /// Take the oldest outbound message, if any.
    #[must_use]
    pub fn try_outbound(&self) -> Option<Message> {
        self.outbound.try_recv().ok()
    }

    /// Take every queued outbound message.
    #[must_use]
    pub fn drain_outbound(&self) -> Vec<Message> {
        self.outbound.try_iter().collect()
    }

    /// Current outbound queue depth.
    #[must_use]
    pub fn outbound_len(&self) -> usize {
        self.outbound.len()
    }
}
