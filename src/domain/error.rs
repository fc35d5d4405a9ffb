//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent validation failures on connection data.
/// These are independent of transport and configuration concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid page number: {0} (pages start at 1)")]
    InvalidPage(u32),

    #[error("invalid page size: {0} (must be at least 1)")]
    InvalidPageSize(u32),

    #[error("invalid connection id: '{0}' is not a UUID")]
    InvalidConnectionId(String),

    #[error("connection not found: {0}")]
    ConnectionNotFound(String),

    #[error("unsupported connection type '{value}', supported types: {supported}")]
    UnsupportedPlatform { value: String, supported: String },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
