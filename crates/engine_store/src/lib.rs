//! # engine_store
//!
//! Client for the level persistence store. The store speaks a small JSON
//! request/response protocol over HTTP POST; every call returns a
//! [`StoreResponse`] whose `status_code` must be checked before `result` is
//! used.
//!
//! Requests go through a [`StoreTransport`]. [`HttpTransport`] is the
//! blocking HTTP implementation; tests and hosts with their own stack can
//! supply another.

pub mod client;
pub mod error;
pub mod http;

pub use client::{
    LevelState, StoreClient, StoreRequest, StoreResponse, StoreStatus, StoreTransport,
};
pub use error::{StoreError, TransportError};
pub use http::HttpTransport;
