//! Command execution: parsed arguments to router, services and output

use std::io::{self, Write};
use std::path::Path;

use clap::CommandFactory;
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tracing::{debug, instrument};

use crate::application::services::ConnectionService;
use crate::cli::args::{
    Cli, Commands, ConfigCommands, ConnectionArgs, ConnectionCommands, CreateArgs, DeleteArgs,
    ListArgs, OutputFormat, ViewArgs,
};
use crate::cli::output;
use crate::cli::router::CommandRouter;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, ContextLoader, Settings, SettingsLoader};
use crate::domain::{Connection, Platform};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let loader = SettingsLoader::new(cli.config.clone(), cli.context.clone());
    match &cli.command {
        Some(Commands::Connection(args)) => cmd_connection(args, &loader),
        Some(Commands::Config { command }) => cmd_config(command, &loader),
        Some(Commands::Completion { shell }) => cmd_completion(*shell),
        None => {
            Cli::command()
                .print_help()
                .map_err(|e| InfraError::io("write help", e))?;
            Ok(())
        }
    }
}

#[instrument(skip(loader))]
fn cmd_connection(args: &ConnectionArgs, loader: &SettingsLoader) -> CliResult<()> {
    let mut stdout = io::stdout().lock();
    match &args.command {
        None => CommandRouter::for_connection().route(&args.args, loader, &mut stdout),
        Some(command) => {
            let context = loader.load_context().map_err(CliError::config_load)?;
            let container = ServiceContainer::new(context)?;
            let cwd = std::env::current_dir()
                .map_err(|e| InfraError::io("resolve current directory", e))?;
            run_connection_command(command, &container.connections, &cwd, &mut stdout)
        }
    }
}

/// Run one `connection` subcommand against `service`, writing to `out`.
///
/// `save_dir` receives files written by `view --save`.
pub fn run_connection_command<W: Write>(
    command: &ConnectionCommands,
    service: &ConnectionService,
    save_dir: &Path,
    out: &mut W,
) -> CliResult<()> {
    match command {
        ConnectionCommands::List(args) => list_connections(args, service, out),
        ConnectionCommands::View(args) => view_connections(args, service, save_dir, out),
        ConnectionCommands::Delete(args) => delete_connection(args, service, out),
        ConnectionCommands::Create(args) => create_connection(args, service, out),
    }
}

#[derive(Tabled)]
struct ConnectionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Type")]
    connection_type: String,
    #[tabled(rename = "Sub Type")]
    sub_type: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Created")]
    created: String,
}

impl From<&Connection> for ConnectionRow {
    fn from(c: &Connection) -> Self {
        Self {
            id: c.id.to_string(),
            name: c.name.clone(),
            kind: c.kind.clone(),
            connection_type: c.connection_type.clone(),
            sub_type: c.sub_type.clone(),
            status: c.status.clone(),
            created: c
                .created_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
        }
    }
}

fn write_err(e: io::Error) -> CliError {
    InfraError::io("write output", e).into()
}

fn list_connections<W: Write>(
    args: &ListArgs,
    service: &ConnectionService,
    out: &mut W,
) -> CliResult<()> {
    if args.count {
        let total = service.count()?;
        writeln!(out, "Total number of connections: {total}").map_err(write_err)?;
        return Ok(());
    }

    let page = service.list(&args.page_request())?;
    debug!("list: {} connection(s) on page", page.connections.len());
    if page.connections.is_empty() {
        writeln!(out, "No connections found").map_err(write_err)?;
        return Ok(());
    }

    let rows: Vec<ConnectionRow> = page.connections.iter().map(ConnectionRow::from).collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    writeln!(out, "{table}").map_err(write_err)?;
    output::write_header(
        out,
        &format!(
            "Page {} of {} ({} connections)",
            args.page,
            page.total_pages(),
            page.total_count
        ),
    )
    .map_err(write_err)?;
    Ok(())
}

#[derive(Serialize)]
struct ConnectionDocument<'a> {
    connections: &'a [Connection],
}

/// Render connections.
///
/// JSON is an object only for a named lookup with exactly one match; otherwise an array.
pub fn render_connections(
    connections: &[Connection],
    name: Option<&str>,
    format: OutputFormat,
) -> CliResult<String> {
    match format {
        OutputFormat::Json => {
            let rendered = match (name, connections) {
                (Some(_), [single]) => serde_json::to_string_pretty(single),
                (_, many) => serde_json::to_string_pretty(many),
            };
            rendered.map_err(|e| CliError::Render {
                format: "json",
                message: e.to_string(),
            })
        }
        OutputFormat::Toml => toml::to_string_pretty(&ConnectionDocument { connections })
            .map_err(|e| CliError::Render {
                format: "toml",
                message: e.to_string(),
            }),
    }
}

/// File name used by `view --save`.
pub fn save_file_name(name: Option<&str>, format: OutputFormat) -> String {
    let stem = name
        .map(|n| {
            n.chars()
                .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
                .collect::<String>()
        })
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "connections".to_string());
    format!("{}.{}", stem, format.extension())
}

fn view_connections<W: Write>(
    args: &ViewArgs,
    service: &ConnectionService,
    save_dir: &Path,
    out: &mut W,
) -> CliResult<()> {
    let connections = service.view(args.name.as_deref())?;
    if connections.is_empty() {
        writeln!(out, "No connections found").map_err(write_err)?;
        return Ok(());
    }

    let rendered = render_connections(&connections, args.name.as_deref(), args.output_format)?;
    if args.save {
        let path = save_dir.join(save_file_name(args.name.as_deref(), args.output_format));
        std::fs::write(&path, format!("{rendered}\n"))
            .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
        output::write_success(out, &format!("Saved to {}", path.display())).map_err(write_err)?;
    } else {
        writeln!(out, "{rendered}").map_err(write_err)?;
    }
    Ok(())
}

fn delete_connection<W: Write>(
    args: &DeleteArgs,
    service: &ConnectionService,
    out: &mut W,
) -> CliResult<()> {
    let target = args.target().ok_or_else(|| {
        CliError::InvalidArgs("please provide a connection id with --id or as an argument".into())
    })?;
    let id = service.delete(target)?;
    output::write_success(out, &format!("Connection {id} deleted")).map_err(write_err)?;
    Ok(())
}

fn create_connection<W: Write>(
    args: &CreateArgs,
    service: &ConnectionService,
    out: &mut W,
) -> CliResult<()> {
    if args.platform.is_none() {
        return Err(CliError::InvalidArgs(format!(
            "please provide a connection type with --type ({})",
            Platform::supported()
        )));
    }
    let connection = service.create(&args.to_request())?;
    output::write_success(
        out,
        &format!("Connection '{}' created ({})", connection.name, connection.id),
    )
    .map_err(write_err)?;
    Ok(())
}

#[instrument(skip(loader))]
fn cmd_config(command: &ConfigCommands, loader: &SettingsLoader) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = loader.load_settings().map_err(CliError::config_load)?;
            output::info(&settings.to_toml()?);
            Ok(())
        }
        ConfigCommands::Path => {
            match loader.config_path.clone().or_else(global_config_path) {
                Some(path) => output::info(&path.display()),
                None => output::warning("cannot determine config directory"),
            }
            Ok(())
        }
        ConfigCommands::Init { force } => {
            let path = loader
                .config_path
                .clone()
                .or_else(global_config_path)
                .ok_or_else(|| CliError::InvalidArgs("cannot determine config directory".into()))?;
            if path.exists() && !force {
                return Err(CliError::InvalidArgs(format!(
                    "config file already exists: {} (use --force to overwrite)",
                    path.display()
                )));
            }
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| InfraError::io(format!("create {}", parent.display()), e))?;
            }
            std::fs::write(&path, Settings::template())
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::success(&format!("Created {}", path.display()));
            Ok(())
        }
    }
}

fn cmd_completion(shell: clap_complete::Shell) -> CliResult<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_connection_name_when_building_save_file_then_sanitizes() {
        assert_eq!(
            save_file_name(Some("prod/cluster 1"), OutputFormat::Json),
            "prod_cluster_1.json"
        );
        assert_eq!(save_file_name(None, OutputFormat::Toml), "connections.toml");
    }

    #[test]
    fn given_no_connections_when_rendering_json_then_empty_array() {
        let rendered = render_connections(&[], None, OutputFormat::Json).unwrap();
        assert_eq!(rendered, "[]");
    }
}
