//! I/O boundary traits for testability
//!
//! These traits abstract the remote connection API, allowing services
//! to be tested with fake implementations.

use thiserror::Error;
use uuid::Uuid;

use crate::domain::{Connection, ConnectionPage, NewConnection, PageRequest};

/// Failures reported by a connection API backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("not authorized, check the token file of the current context")]
    Unauthorized,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("server responded with status {code}: {body}")]
    Status { code: u16, body: String },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("cannot decode response: {0}")]
    Decode(String),
}

/// Result type for connection API calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Remote store of connections.
pub trait ConnectionApi: Send + Sync {
    /// Fetch one page of connections, optionally filtered by a search term.
    fn list(&self, request: &PageRequest) -> ApiResult<ConnectionPage>;

    /// Delete the connection with the given id.
    fn delete(&self, id: Uuid) -> ApiResult<()>;

    /// Register a new connection and return it as stored.
    fn create(&self, connection: &NewConnection) -> ApiResult<Connection>;
}
