//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::DomainError;
use crate::infrastructure::traits::ApiError;

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("config error: {message}")]
    Config { message: String },

    #[error("{context}: {source}")]
    Api {
        context: String,
        #[source]
        source: ApiError,
    },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
