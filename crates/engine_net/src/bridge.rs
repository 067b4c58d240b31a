//! NATS transport bridge.
//!
//! The bridge is the transport-receive context: an async task that decodes
//! messages arriving on the player's inbox subject and delivers them to a
//! [`TransportEndpoint`], and that periodically drains the endpoint's
//! outbound queue onto the server subject.

use std::time::Duration;

use futures::StreamExt;
use tracing::{info, warn};

use crate::codec;
use crate::error::NetError;
use crate::message::Message;
use crate::session::TransportEndpoint;
use crate::subjects;

/// Default NATS server URL.
pub const DEFAULT_NATS_URL: &str = "nats://localhost:4222";

/// The environment variable used to override the NATS URL.
pub const NATS_URL_ENV: &str = "NATS_URL";

/// How often the outbound queue is drained.
pub const OUTBOUND_POLL: Duration = Duration::from_millis(5);

/// Resolve the NATS URL: explicit override, then `NATS_URL`, then
/// [`DEFAULT_NATS_URL`].
#[must_use]
pub fn resolve_url(explicit: Option<&str>) -> String {
    explicit
        .map(str::to_string)
        .or_else(|| std::env::var(NATS_URL_ENV).ok())
        .unwrap_or_else(|| DEFAULT_NATS_URL.to_string())
}

/// A NATS client bound to one player's subjects.
#[derive(Debug, Clone)]
pub struct NatsBridge {
    client: async_nats::Client,
    inbox: String,
}

impl NatsBridge {
    /// Connect to NATS at `url` for `player`.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::Connect`] if the connection cannot be established.
    pub async fn connect(url: &str, player: &str) -> Result<Self, NetError> {
        info!(url, player, "connecting to NATS");
        let client = async_nats::connect(url).await?;
        info!("NATS connection established");
        Ok(Self {
            client,
            inbox: subjects::client_inbox(player),
        })
    }

    /// The subject this bridge listens on.
    #[must_use]
    pub fn inbox(&self) -> &str {
        &self.inbox
    }

    /// Publish one message to the server subject.
    ///
    /// # Errors
    ///
    /// Returns [`NetError`] if encoding or publishing fails.
    pub async fn publish(&self, message: &Message) -> Result<(), NetError> {
        let payload = codec::encode(message)?;
        self.client
            .publish(subjects::SERVER.to_string(), payload.into())
            .await?;
        Ok(())
    }

    /// Pump messages between NATS and `endpoint` until either side closes.
    ///
    /// Undecodable inbound payloads are logged and skipped. The task ends
    /// cleanly when the subscription closes or the session is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`NetError`] if subscribing or publishing fails.
    pub async fn run(self, endpoint: TransportEndpoint) -> Result<(), NetError> {
        let mut inbox = self.client.subscribe(self.inbox.clone()).await?;
        info!(subject = self.inbox, "subscribed to inbox");

        let mut outbound = tokio::time::interval(OUTBOUND_POLL);
        loop {
            tokio::select! {
                raw = inbox.next() => {
                    let Some(raw) = raw else {
                        info!("inbox subscription closed");
                        return Ok(());
                    };
                    match codec::decode::<Message>(raw.payload.as_ref()) {
                        Ok(message) => {
                            if endpoint.deliver(message).is_err() {
                                info!("session dropped, stopping bridge");
                                return Ok(());
                            }
                        }
                        Err(e) => warn!(%e, "dropping undecodable message"),
                    }
                }
                _ = outbound.tick() => {
                    for message in endpoint.drain_outbound() {
                        self.publish(&message).await?;
                    }
                }
            }
        }
    }
}
