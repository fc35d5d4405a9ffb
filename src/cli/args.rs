//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum, ValueHint};

use crate::application::services::CreateRequest;
use crate::domain::{PageRequest, DEFAULT_PAGE_SIZE};

const CONNECTION_EXAMPLES: &str = "\
Examples:
  // List all the connections
  meshconn connection list

  // View a specific connection
  meshconn connection view [connection-name]

  // Delete a connection
  meshconn connection delete [connection-id]

  // Create a new Kubernetes connection
  meshconn connection create --type gke";

/// Manage connections to the platforms and services your control plane talks to
#[derive(Parser, Debug)]
#[command(name = "meshconn")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Config file (default: ~/.config/meshconn/config.toml)
    #[arg(long, global = true, env = "MESHCONN_CONFIG", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Context to use instead of current_context
    #[arg(long, global = true)]
    pub context: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage connections
    #[command(long_about = "Manage connections to various platforms and services")]
    #[command(after_help = CONNECTION_EXAMPLES)]
    Connection(ConnectionArgs),

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// `connection` group: either a known subcommand or raw arguments for the router.
#[derive(Args, Debug)]
#[command(args_conflicts_with_subcommands = true)]
pub struct ConnectionArgs {
    #[command(subcommand)]
    pub command: Option<ConnectionCommands>,

    /// Anything that is not a registered subcommand
    #[arg(hide = true)]
    pub args: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum ConnectionCommands {
    /// List all the connections
    List(ListArgs),

    /// View a specific connection
    View(ViewArgs),

    /// Delete a connection
    Delete(DeleteArgs),

    /// Create a new Kubernetes connection
    Create(CreateArgs),
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ListArgs {
    /// Display the count of connections
    #[arg(short, long)]
    pub count: bool,

    /// Page number
    #[arg(short, long, default_value_t = 1)]
    pub page: u32,

    /// Connections per page
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: u32,
}

impl ListArgs {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.page_size)
    }
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ViewArgs {
    /// Connection name (default: all connections)
    #[arg(value_name = "connection-name")]
    pub name: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    pub output_format: OutputFormat,

    /// Save output to a file in the current directory instead of printing it
    #[arg(short, long)]
    pub save: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Json,
    Toml,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Toml => "toml",
        }
    }
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct DeleteArgs {
    /// ID of the connection to be deleted
    #[arg(value_name = "connection-id", conflicts_with = "id")]
    pub connection_id: Option<String>,

    /// ID of the connection to be deleted
    #[arg(short, long)]
    pub id: Option<String>,
}

impl DeleteArgs {
    /// The id given either as flag or positional argument.
    pub fn target(&self) -> Option<&str> {
        self.id
            .as_deref()
            .or(self.connection_id.as_deref())
            .filter(|id| !id.trim().is_empty())
    }
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct CreateArgs {
    /// Platform of the cluster: aks, eks, gke or minikube
    #[arg(long = "type", value_name = "TYPE")]
    pub platform: Option<String>,

    /// Connection name (default: <type>-connection)
    #[arg(long)]
    pub name: Option<String>,
}

impl CreateArgs {
    pub fn to_request(&self) -> CreateRequest {
        CreateRequest {
            platform: self.platform.clone(),
            name: self.name.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Show config path
    Path,

    /// Create config template
    Init {
        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },
}
