//! Level store requests and responses.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{StoreError, TransportError};

/// Level paths returned by `list_levels`.
pub type LevelPaths = Vec<String>;

/// Revision identifiers (timestamps) returned by `list_level_revisions`.
pub type LevelRevisions = Vec<String>;

/// Status codes carried in [`StoreResponse::status_code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum StoreStatus {
    Success = 0,
    BadRequest = 1,
    NullData = 2,
    InvalidInput = 4,
    ServerError = 5,
    DuplicateData = 6,
}

impl StoreStatus {
    /// Map a raw status code back to a known status.
    #[must_use]
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Success),
            1 => Some(Self::BadRequest),
            2 => Some(Self::NullData),
            4 => Some(Self::InvalidInput),
            5 => Some(Self::ServerError),
            6 => Some(Self::DuplicateData),
            _ => None,
        }
    }

    /// The raw code.
    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }
}

/// One stored revision of a level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelState {
    pub path: String,
    pub level: String,
    pub revision: String,
    pub data: String,
}

/// Request body posted to the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreRequest {
    pub path: String,
    pub revision: String,
    pub method: String,
    pub data: String,
}

impl StoreRequest {
    fn method(method: &str) -> Self {
        Self {
            method: method.to_string(),
            ..Self::default()
        }
    }
}

/// Store reply. Check `status_code` before reading `result`, which is only
/// present on success and may be absent even then.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct StoreResponse<T> {
    pub status_code: i32,
    #[serde(default)]
    pub status_info: String,
    #[serde(default)]
    pub result: Option<T>,
}

impl<T> StoreResponse<T> {
    /// A response synthesised on the client side for a failed exchange.
    #[must_use]
    pub fn failure(status: StoreStatus, info: impl Into<String>) -> Self {
        Self {
            status_code: status.code(),
            status_info: info.into(),
            result: None,
        }
    }

    /// The status, if the code is a known one.
    #[must_use]
    pub fn status(&self) -> Option<StoreStatus> {
        StoreStatus::from_code(self.status_code)
    }

    /// Returns `true` if the store reported success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status_code == StoreStatus::Success.code()
    }
}

/// Posts a JSON body to an endpoint and returns the response body.
pub trait StoreTransport {
    /// Send `body` to `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] on network failure or a non-success HTTP
    /// status.
    fn post(&self, endpoint: &str, body: &str) -> Result<String, TransportError>;
}

/// Level store API consumer.
#[derive(Debug, Clone)]
pub struct StoreClient<T> {
    endpoint: Option<String>,
    transport: T,
}

impl<T: StoreTransport> StoreClient<T> {
    /// Create a client, optionally bound to an endpoint.
    #[must_use]
    pub fn new(endpoint: Option<String>, transport: T) -> Self {
        Self {
            endpoint,
            transport,
        }
    }

    /// Point the client at a different store.
    pub fn set_endpoint(&mut self, endpoint: impl Into<String>) {
        self.endpoint = Some(endpoint.into());
    }

    /// The configured endpoint.
    #[must_use]
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    /// List available level paths.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::EndpointNotSet`] if no endpoint is configured.
    pub fn list_levels(&self) -> Result<StoreResponse<LevelPaths>, StoreError> {
        self.post(StoreRequest::method("list_levels"))
    }

    /// List the revisions of the level at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::EndpointNotSet`] if no endpoint is configured.
    pub fn list_level_revisions(
        &self,
        path: &str,
    ) -> Result<StoreResponse<LevelRevisions>, StoreError> {
        self.post(StoreRequest {
            path: path.to_string(),
            ..StoreRequest::method("list_level_revisions")
        })
    }

    /// Fetch one revision of a level.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::EndpointNotSet`] if no endpoint is configured.
    pub fn fetch_level(
        &self,
        path: &str,
        revision: &str,
    ) -> Result<StoreResponse<LevelState>, StoreError> {
        self.post(StoreRequest {
            path: path.to_string(),
            revision: revision.to_string(),
            ..StoreRequest::method("fetch_level")
        })
    }

    /// Save `data` as a new revision of the level at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::EndpointNotSet`] if no endpoint is configured.
    pub fn save_level(
        &self,
        path: &str,
        data: &str,
    ) -> Result<StoreResponse<serde_json::Value>, StoreError> {
        self.post(StoreRequest {
            path: path.to_string(),
            data: data.to_string(),
            ..StoreRequest::method("save_level")
        })
    }

    fn post<R: DeserializeOwned>(
        &self,
        request: StoreRequest,
    ) -> Result<StoreResponse<R>, StoreError> {
        let endpoint = self.endpoint.as_deref().ok_or(StoreError::EndpointNotSet)?;
        let body = match serde_json::to_string(&request) {
            Ok(body) => body,
            Err(e) => {
                return Ok(StoreResponse::failure(
                    StoreStatus::BadRequest,
                    e.to_string(),
                ));
            }
        };
        debug!(endpoint, method = request.method, "posting store request");

        let reply = match self.transport.post(endpoint, &body) {
            Ok(reply) => reply,
            Err(e) => {
                warn!(endpoint, %e, "store unavailable");
                return Ok(StoreResponse::failure(
                    StoreStatus::ServerError,
                    format!("server({endpoint}) unavailable"),
                ));
            }
        };

        Ok(serde_json::from_str(&reply).unwrap_or_else(|e| {
            warn!(endpoint, %e, "unparseable store reply");
            StoreResponse::failure(StoreStatus::ServerError, format!("invalid reply: {e}"))
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    /// Replays a fixed reply and records every request body.
    struct Scripted {
        reply: Result<String, TransportError>,
        seen: RefCell<Vec<(String, String)>>,
    }

    impl Scripted {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                seen: RefCell::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err(TransportError("connection refused".to_string())),
                seen: RefCell::new(Vec::new()),
            }
        }

        fn last_request(&self) -> StoreRequest {
            let seen = self.seen.borrow();
            serde_json::from_str(&seen.last().unwrap().1).unwrap()
        }
    }

    impl StoreTransport for &Scripted {
        fn post(&self, endpoint: &str, body: &str) -> Result<String, TransportError> {
            self.seen
                .borrow_mut()
                .push((endpoint.to_string(), body.to_string()));
            self.reply.clone()
        }
    }

    const ENDPOINT: &str = "http://store.local/api";

    #[test]
    fn test_missing_endpoint_is_misuse() {
        let transport = Scripted::replying("{}");
        let client = StoreClient::new(None, &transport);
        assert_eq!(client.list_levels(), Err(StoreError::EndpointNotSet));
        assert!(transport.seen.borrow().is_empty());
    }

    #[test]
    fn test_list_levels_parses_result() {
        let transport =
            Scripted::replying(r#"{"status_code":0,"status_info":"ok","result":["a/b","c"]}"#);
        let client = StoreClient::new(Some(ENDPOINT.to_string()), &transport);

        let response = client.list_levels().unwrap();

        assert!(response.is_success());
        assert_eq!(response.result, Some(vec!["a/b".to_string(), "c".to_string()]));
        assert_eq!(transport.last_request().method, "list_levels");
        assert_eq!(transport.seen.borrow()[0].0, ENDPOINT);
    }

    #[test]
    fn test_fetch_level_sends_path_and_revision() {
        let transport = Scripted::replying(
            r#"{"status_code":0,"status_info":"","result":{"path":"p","level":"l","revision":"r1","data":"{}"}}"#,
        );
        let client = StoreClient::new(Some(ENDPOINT.to_string()), &transport);

        let response = client.fetch_level("p", "r1").unwrap();

        let request = transport.last_request();
        assert_eq!(request.method, "fetch_level");
        assert_eq!(request.path, "p");
        assert_eq!(request.revision, "r1");
        assert_eq!(response.result.unwrap().level, "l");
    }

    #[test]
    fn test_server_status_is_propagated() {
        let transport = Scripted::replying(r#"{"status_code":6,"status_info":"exists"}"#);
        let client = StoreClient::new(Some(ENDPOINT.to_string()), &transport);

        let response = client.save_level("p", "payload").unwrap();

        assert_eq!(response.status(), Some(StoreStatus::DuplicateData));
        assert_eq!(response.status_info, "exists");
        assert!(response.result.is_none());
        assert_eq!(transport.last_request().data, "payload");
    }

    #[test]
    fn test_transport_failure_becomes_server_error() {
        let transport = Scripted::failing();
        let client = StoreClient::new(Some(ENDPOINT.to_string()), &transport);

        let response = client.list_level_revisions("p").unwrap();

        assert_eq!(response.status(), Some(StoreStatus::ServerError));
        assert_eq!(response.status_info, format!("server({ENDPOINT}) unavailable"));
    }

    #[test]
    fn test_garbage_reply_becomes_server_error() {
        let transport = Scripted::replying("<html>");
        let mut client = StoreClient::new(None, &transport);
        client.set_endpoint(ENDPOINT);

        let response = client.list_levels().unwrap();

        assert_eq!(response.status(), Some(StoreStatus::ServerError));
    }
}
