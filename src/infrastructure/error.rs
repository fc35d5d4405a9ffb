//! Infrastructure-level errors

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while wiring up I/O: files, tokens and the HTTP client.
#[derive(Error, Debug)]
pub enum InfraError {
    #[error("I/O error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot create HTTP client: {message}")]
    Http { message: String },

    #[error("invalid token file {}: {message}", path.display())]
    Token { path: PathBuf, message: String },
}

impl InfraError {
    /// Create an I/O error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

/// Result type for infrastructure layer operations.
pub type InfraResult<T> = Result<T, InfraError>;
