//! CLI layer: argument parsing and command dispatch

pub mod args;
pub mod commands;
pub mod error;
pub mod output;
pub mod router;

pub use args::{Cli, Commands, ConnectionCommands};
pub use error::{CliError, CliResult};
pub use router::{CommandRouter, ConnectionSubcommand};
