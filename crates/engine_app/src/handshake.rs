//! Connection handshake.
//!
//! A forward-only state machine, `Init → MetaExchanged → Started`, polled
//! once per tick by the [`TickLoop`](crate::TickLoop). Each poll drains the
//! session looking for the message the current phase waits on. If it is not
//! there, the phase's request is (re)sent and the next poll is deferred by
//! the retry interval. Retries are unbounded and there is no backoff.
//!
//! Entering `Started` enables every system in the world in one step.

use std::fmt;
use std::time::Instant;

use engine_net::message::{InitRequest, MetaAck, MetaRequest, SessionMeta};
use engine_net::{Message, MessageKind, NetError, NetworkSession, PlayerId};
use tracing::{debug, info, warn};

use crate::config::HandshakeConfig;
use crate::world::World;

/// Handshake phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HandshakeState {
    /// Sending init requests until the server acknowledges.
    Init,
    /// Acknowledged; requesting session metadata.
    MetaExchanged,
    /// Metadata received and echoed. Systems are enabled.
    Started,
}

impl fmt::Display for HandshakeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Init => "init",
            Self::MetaExchanged => "meta-exchanged",
            Self::Started => "started",
        };
        f.write_str(s)
    }
}

/// Outcome of one poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakePoll {
    /// Still waiting; a request may have been sent.
    Waiting,
    /// Moved into the given phase during this poll.
    Advanced(HandshakeState),
    /// Already started; nothing was done.
    Complete,
}

/// Drives the handshake against a [`NetworkSession`].
#[derive(Debug)]
pub struct HandshakeStateMachine {
    state: HandshakeState,
    config: HandshakeConfig,
    next_poll_at: Option<Instant>,
    /// Requests sent in the current phase.
    attempts: u64,
    player_id: Option<PlayerId>,
}

impl HandshakeStateMachine {
    /// Create a machine in [`HandshakeState::Init`] that will send its first
    /// request on the first poll.
    #[must_use]
    pub fn new(config: HandshakeConfig) -> Self {
        Self {
            state: HandshakeState::Init,
            config,
            next_poll_at: None,
            attempts: 0,
            player_id: None,
        }
    }

    /// Current phase.
    #[must_use]
    pub fn state(&self) -> HandshakeState {
        self.state
    }

    /// Requests sent in the current phase.
    #[must_use]
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    /// The player number assigned by the server, once known.
    #[must_use]
    pub fn player_id(&self) -> Option<PlayerId> {
        self.player_id
    }

    /// Returns `true` once the handshake has completed.
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.state == HandshakeState::Started
    }

    /// Run one poll at time `now`.
    ///
    /// Polls that arrive before the retry interval has elapsed return
    /// [`HandshakePoll::Waiting`] without touching the session.
    ///
    /// # Errors
    ///
    /// Returns [`NetError`] if a request cannot be encoded or the transport
    /// side of the session is gone.
    pub fn poll(
        &mut self,
        now: Instant,
        session: &NetworkSession,
        world: &mut World,
    ) -> Result<HandshakePoll, NetError> {
        if self.is_started() {
            return Ok(HandshakePoll::Complete);
        }
        if self.next_poll_at.is_some_and(|at| now < at) {
            return Ok(HandshakePoll::Waiting);
        }

        match self.state {
            HandshakeState::Init => {
                if take(session, MessageKind::InitAck).is_some() {
                    return Ok(self.advance(HandshakeState::MetaExchanged));
                }
                let request = InitRequest {
                    player: self.config.local_player.clone(),
                };
                self.send(now, session, Message::new(MessageKind::InitRequest, &request)?)?;
            }
            HandshakeState::MetaExchanged => {
                if let Some(message) = take(session, MessageKind::SessionMeta) {
                    match message.decode::<SessionMeta>(MessageKind::SessionMeta) {
                        Ok(meta) => {
                            let ack = MetaAck {
                                player_id: meta.player_id,
                            };
                            session.send_message(Message::new(MessageKind::MetaAck, &ack)?)?;
                            self.player_id = Some(meta.player_id);
                            info!(player_id = meta.player_id, "session metadata received");
                            world.enable_all();
                            return Ok(self.advance(HandshakeState::Started));
                        }
                        Err(e) => warn!(%e, "ignoring malformed session metadata"),
                    }
                }
                let request = MetaRequest {
                    player: self.config.local_player.clone(),
                };
                self.send(now, session, Message::new(MessageKind::MetaRequest, &request)?)?;
            }
            HandshakeState::Started => return Ok(HandshakePoll::Complete),
        }
        Ok(HandshakePoll::Waiting)
    }

    fn send(
        &mut self,
        now: Instant,
        session: &NetworkSession,
        request: Message,
    ) -> Result<(), NetError> {
        let kind = request.kind;
        session.send_message(request)?;
        self.attempts += 1;
        self.next_poll_at = Some(now + self.config.retry_interval);
        debug!(state = %self.state, %kind, attempt = self.attempts, "handshake request sent");
        Ok(())
    }

    fn advance(&mut self, next: HandshakeState) -> HandshakePoll {
        info!(from = %self.state, to = %next, attempts = self.attempts, "handshake advanced");
        self.state = next;
        self.attempts = 0;
        self.next_poll_at = None;
        HandshakePoll::Advanced(next)
    }
}

/// Drain the session up to the first message of `kind`. Anything before it
/// is discarded; anything after it stays queued.
fn take(session: &NetworkSession, kind: MessageKind) -> Option<Message> {
    while let Some(message) = session.get_message() {
        if message.kind == kind {
            return Some(message);
        }
        debug!(expected = %kind, got = %message.kind, "discarding message during handshake");
    }
    None
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use engine_net::TransportEndpoint;
    use engine_system::System;

    use super::*;

    struct Idle;

    impl System for Idle {
        fn name(&self) -> &'static str {
            "idle"
        }
    }

    fn setup() -> (HandshakeStateMachine, NetworkSession, TransportEndpoint, World) {
        let (session, endpoint) = NetworkSession::pair();
        let mut world = World::new();
        world.attach_system(Box::new(Idle), false);
        world.attach_system(Box::new(Idle), false);
        let config = HandshakeConfig::default()
            .with_player("p1")
            .with_retry_interval(Duration::from_secs(1));
        (HandshakeStateMachine::new(config), session, endpoint, world)
    }

    fn meta(player_id: PlayerId) -> Message {
        Message::new(MessageKind::SessionMeta, &SessionMeta { player_id }).unwrap()
    }

    #[test]
    fn test_init_transitions_after_exactly_n_polls() {
        const N: u32 = 4;
        let (mut hs, session, endpoint, mut world) = setup();
        let t0 = Instant::now();

        for k in 0..N {
            let now = t0 + Duration::from_secs(u64::from(k));
            assert_eq!(hs.poll(now, &session, &mut world).unwrap(), HandshakePoll::Waiting);
            assert_eq!(hs.state(), HandshakeState::Init);
        }
        endpoint.deliver(Message::empty(MessageKind::InitAck)).unwrap();
        let now = t0 + Duration::from_secs(u64::from(N));
        assert_eq!(
            hs.poll(now, &session, &mut world).unwrap(),
            HandshakePoll::Advanced(HandshakeState::MetaExchanged)
        );

        let sent = endpoint.drain_outbound();
        assert_eq!(sent.len(), N as usize);
        for message in &sent {
            let request: InitRequest = message.decode(MessageKind::InitRequest).unwrap();
            assert_eq!(request.player, "p1");
        }
        assert!(!world.any_enabled());
    }

    #[test]
    fn test_polls_inside_retry_interval_do_nothing() {
        let (mut hs, session, endpoint, mut world) = setup();
        let t0 = Instant::now();

        hs.poll(t0, &session, &mut world).unwrap();
        endpoint.deliver(Message::empty(MessageKind::InitAck)).unwrap();
        hs.poll(t0 + Duration::from_millis(500), &session, &mut world)
            .unwrap();

        assert_eq!(hs.attempts(), 1);
        assert_eq!(hs.state(), HandshakeState::Init);
        assert_eq!(session.message_len(), 1);
        assert_eq!(endpoint.outbound_len(), 1);
    }

    #[test]
    fn test_unexpected_messages_are_discarded() {
        let (mut hs, session, endpoint, mut world) = setup();
        endpoint.deliver(Message::empty(MessageKind::State)).unwrap();
        endpoint.deliver(Message::empty(MessageKind::InitAck)).unwrap();
        endpoint.deliver(meta(3)).unwrap();

        hs.poll(Instant::now(), &session, &mut world).unwrap();

        assert_eq!(hs.state(), HandshakeState::MetaExchanged);
        assert_eq!(session.message_len(), 1);
        assert_eq!(endpoint.outbound_len(), 0);
    }

    #[test]
    fn test_meta_is_stored_and_echoed() {
        let (mut hs, session, endpoint, mut world) = setup();
        let t0 = Instant::now();
        endpoint.deliver(Message::empty(MessageKind::InitAck)).unwrap();
        hs.poll(t0, &session, &mut world).unwrap();

        hs.poll(t0, &session, &mut world).unwrap();
        let sent = endpoint.drain_outbound();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].kind, MessageKind::MetaRequest);

        endpoint.deliver(meta(7)).unwrap();
        assert_eq!(
            hs.poll(t0 + Duration::from_secs(1), &session, &mut world)
                .unwrap(),
            HandshakePoll::Advanced(HandshakeState::Started)
        );

        assert_eq!(hs.player_id(), Some(7));
        let sent = endpoint.drain_outbound();
        assert_eq!(sent.len(), 1);
        let ack: MetaAck = sent[0].decode(MessageKind::MetaAck).unwrap();
        assert_eq!(ack.player_id, 7);
    }

    #[test]
    fn test_started_enables_every_system_once() {
        let (mut hs, session, endpoint, mut world) = setup();
        let t0 = Instant::now();
        endpoint.deliver(Message::empty(MessageKind::InitAck)).unwrap();
        endpoint.deliver(meta(1)).unwrap();

        hs.poll(t0, &session, &mut world).unwrap();
        assert!(!world.any_enabled());
        hs.poll(t0, &session, &mut world).unwrap();
        assert!(world.all_enabled());

        assert_eq!(
            hs.poll(t0, &session, &mut world).unwrap(),
            HandshakePoll::Complete
        );
        assert!(hs.is_started());
    }

    #[test]
    fn test_malformed_meta_is_retried() {
        let (mut hs, session, endpoint, mut world) = setup();
        let t0 = Instant::now();
        endpoint.deliver(Message::empty(MessageKind::InitAck)).unwrap();
        hs.poll(t0, &session, &mut world).unwrap();
        endpoint
            .deliver(Message {
                kind: MessageKind::SessionMeta,
                payload: vec![0xC1],
            })
            .unwrap();

        assert_eq!(
            hs.poll(t0, &session, &mut world).unwrap(),
            HandshakePoll::Waiting
        );
        assert_eq!(hs.state(), HandshakeState::MetaExchanged);
        assert_eq!(hs.attempts(), 1);
        assert!(!world.any_enabled());
    }

    #[test]
    fn test_dropped_transport_is_an_error() {
        let (mut hs, session, endpoint, mut world) = setup();
        drop(endpoint);
        assert!(matches!(
            hs.poll(Instant::now(), &session, &mut world),
            Err(NetError::Disconnected)
        ));
    }
}
