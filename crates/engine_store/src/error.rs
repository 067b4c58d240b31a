//! Store error types.

/// Misuse of the store client.
///
/// Server-side and transport failures are not errors; they come back as a
/// [`StoreResponse`](crate::StoreResponse) status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A request was made before an endpoint was configured.
    #[error("store endpoint is not set")]
    EndpointNotSet,
}

/// A failure reported by a [`StoreTransport`](crate::StoreTransport).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("store transport failed: {0}")]
pub struct TransportError(pub String);
