//! Validation and fallback for the `connection` command group
//!
//! clap dispatches registered subcommands itself. Whatever reaches the router
//! is either nothing or a token clap could not match.

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use clap::CommandFactory;
use tracing::debug;

use crate::cli::args::Cli;
use crate::cli::{CliError, CliResult};
use crate::config::ContextLoader;

/// Name of the command group.
pub const GROUP: &str = "connection";

/// Subcommands registered under `connection`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionSubcommand {
    List,
    View,
    Delete,
    Create,
}

impl ConnectionSubcommand {
    pub const ALL: [ConnectionSubcommand; 4] = [
        ConnectionSubcommand::List,
        ConnectionSubcommand::View,
        ConnectionSubcommand::Delete,
        ConnectionSubcommand::Create,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ConnectionSubcommand::List => "list",
            ConnectionSubcommand::View => "view",
            ConnectionSubcommand::Delete => "delete",
            ConnectionSubcommand::Create => "create",
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(Self::name).collect()
    }
}

impl fmt::Display for ConnectionSubcommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ConnectionSubcommand {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|c| c.name() == s).ok_or(())
    }
}

/// Message for a token that names no subcommand of a group.
pub fn invalid_subcommand_message(token: &str, choices: &[&str], group_path: &str) -> String {
    format!(
        "'{}' is an invalid subcommand. Please provide required options from [{}]. Use '{} --help' to display usage guide.",
        token,
        choices.join("|"),
        group_path
    )
}

/// Validates the first argument of a command group and prints usage as fallback.
#[derive(Debug, Clone)]
pub struct CommandRouter {
    /// e.g. "meshconn connection"
    group_path: String,
    usage: String,
}

impl CommandRouter {
    pub fn new(group_path: impl Into<String>, usage: impl Into<String>) -> Self {
        Self {
            group_path: group_path.into(),
            usage: usage.into(),
        }
    }

    /// Router for `connection` with usage rendered from the clap definition.
    pub fn for_connection() -> Self {
        // built so global options propagate into the group's help
        let mut root = Cli::command();
        root.build();
        let group_path = format!("{} {}", root.get_name(), GROUP);
        let usage = root
            .find_subcommand(GROUP)
            .cloned()
            .map(|mut sub| sub.render_help().to_string())
            .unwrap_or_default();
        Self::new(group_path, usage)
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }

    /// Validate `args` and fall back to usage.
    ///
    /// - no args: usage is written, then `MissingSubcommand`
    /// - unknown first arg: `InvalidSubcommand`, nothing written
    /// - known first arg: the context must load, then usage is written
    pub fn route<W: Write>(
        &self,
        args: &[String],
        loader: &dyn ContextLoader,
        out: &mut W,
    ) -> CliResult<()> {
        let Some(first) = args.first() else {
            if let Err(e) = self.print_usage(out) {
                debug!("route: cannot print usage: {}", e);
            }
            return Err(CliError::MissingSubcommand);
        };

        let subcommand: ConnectionSubcommand =
            first.parse().map_err(|_| self.invalid(first))?;
        debug!("route: '{}' names a registered subcommand", subcommand);

        let context = loader.load_context().map_err(CliError::config_load)?;
        debug!("route: context '{}' loaded", context.name);

        self.print_usage(out)?;
        Ok(())
    }

    fn invalid(&self, token: &str) -> CliError {
        let choices = ConnectionSubcommand::names();
        CliError::InvalidSubcommand {
            token: token.to_string(),
            message: invalid_subcommand_message(token, &choices, &self.group_path),
            choices: choices.into_iter().map(String::from).collect(),
        }
    }

    fn print_usage<W: Write>(&self, out: &mut W) -> CliResult<()> {
        out.write_all(self.usage.as_bytes())
            .and_then(|_| out.flush())
            .map_err(|e| crate::infrastructure::InfraError::io("write usage", e))?;
        Ok(())
    }
}
