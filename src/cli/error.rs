//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::exitcode;
use crate::infrastructure::traits::ApiError;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("please provide a subcommand")]
    MissingSubcommand,

    #[error("{message}")]
    InvalidSubcommand {
        token: String,
        choices: Vec<String>,
        message: String,
    },

    #[error("error loading configuration: {source}")]
    ConfigLoad {
        #[source]
        source: ApplicationError,
    },

    #[error("{0}")]
    Application(#[from] ApplicationError),

    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("cannot render {format}: {message}")]
    Render {
        format: &'static str,
        message: String,
    },
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Wrap a failure of the configuration loader.
    pub fn config_load(source: ApplicationError) -> Self {
        Self::ConfigLoad { source }
    }

    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::MissingSubcommand
            | CliError::InvalidSubcommand { .. }
            | CliError::InvalidArgs(_) => exitcode::USAGE,
            CliError::ConfigLoad { .. } => exitcode::CONFIG,
            CliError::Render { .. } => exitcode::SOFTWARE,
            CliError::Application(e) => application_exit_code(e),
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => exitcode::IOERR,
                InfraError::Token { .. } => exitcode::CONFIG,
                InfraError::Http { .. } => exitcode::SOFTWARE,
            },
        }
    }
}

fn application_exit_code(e: &ApplicationError) -> i32 {
    match e {
        ApplicationError::Domain(_) => exitcode::DATAERR,
        ApplicationError::Config { .. } => exitcode::CONFIG,
        ApplicationError::Api { source, .. } => match source {
            ApiError::Unauthorized => exitcode::NOPERM,
            ApiError::Transport(_) => exitcode::UNAVAILABLE,
            ApiError::NotFound(_) => exitcode::DATAERR,
            ApiError::Status { .. } | ApiError::Decode(_) => exitcode::SOFTWARE,
        },
    }
}
