//! Blocking HTTP transport for the store client.

use std::time::Duration;

use tracing::trace;

use crate::client::StoreTransport;
use crate::error::TransportError;

/// Default time allowed for one store exchange.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Posts JSON bodies over HTTP with `ureq`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    agent: ureq::Agent,
}

impl HttpTransport {
    /// Create a transport with [`DEFAULT_TIMEOUT`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a transport that gives up on an exchange after `timeout`.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreTransport for HttpTransport {
    fn post(&self, endpoint: &str, body: &str) -> Result<String, TransportError> {
        let response = self
            .agent
            .post(endpoint)
            .set("Content-Type", "application/json")
            .set("Accept", "application/json")
            .send_string(body)
            .map_err(|e| match e {
                ureq::Error::Status(code, _) => {
                    TransportError(format!("{endpoint} answered HTTP {code}"))
                }
                ureq::Error::Transport(t) => TransportError(t.to_string()),
            })?;
        trace!(endpoint, status = response.status(), "store replied");
        response
            .into_string()
            .map_err(|e| TransportError(format!("reading reply from {endpoint}: {e}")))
    }
}
