//! mcpconf - inspect and edit MCP server entries across AI clients
//!
//! Usage:
//!   mcpconf list                       # Detected clients and server counts
//!   mcpconf show claude                # Effective servers of one client
//!   mcpconf copy claude fs all         # Propagate a server
//!   mcpconf env-update-all API_KEY v   # Bulk env-var update

mod render;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mcpconf_core::config::ServerEntry;
use mcpconf_core::context::{GLOBAL_STORE_ENV, REGISTRY_ENV};
use mcpconf_core::propagation::EnvTarget;
use mcpconf_core::transfer::{ImportKind, write_export};
use mcpconf_core::{ConfigManager, EngineConfig, WritePolicy};

use crate::render::Renderer;

#[derive(Parser)]
#[command(name = "mcpconf")]
#[command(about = "Manage MCP server configurations across AI clients", long_about = None)]
#[command(version)]
struct Cli {
    /// TOML file replacing the built-in client registry
    #[arg(long, global = true, env = REGISTRY_ENV)]
    registry: Option<PathBuf>,

    /// Path of the global servers file
    #[arg(long, global = true, env = GLOBAL_STORE_ENV)]
    global_store: Option<PathBuf>,

    /// Copy global servers into client files on every write
    #[arg(long, global = true)]
    materialize: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "table")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
enum OutputFormat {
    /// Human-readable output
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// List detected clients and their config status
    List,

    /// Show the effective MCP servers of a client
    Show {
        client: String,
    },

    /// Add an MCP server to one or more clients
    Add {
        /// Target client (omit when using --clients)
        client: Option<String>,
        /// Server name
        #[arg(long, short)]
        name: String,
        /// Command to run the server
        #[arg(long, short)]
        command: Option<String>,
        /// Argument for the command (repeatable)
        #[arg(long = "arg", short, allow_hyphen_values = true)]
        args: Vec<String>,
        /// Environment variable (KEY=VALUE, repeatable)
        #[arg(long, short, value_name = "KEY=VALUE")]
        env: Vec<String>,
        /// Add to several clients at once
        #[arg(long, value_delimiter = ',')]
        clients: Vec<String>,
    },

    /// Remove an MCP server from a client ("all" for every detected client)
    #[command(alias = "rm")]
    Remove {
        client: String,
        server: String,
    },

    /// Copy an MCP server to another client ("all" for every detected client)
    Copy {
        from: String,
        server: String,
        to: String,
        /// New name for the copied server
        #[arg(long, short)]
        new_name: Option<String>,
    },

    /// Rename a server in the global store and every detected client
    Rename {
        old_name: String,
        new_name: String,
    },

    /// Manage environment variables of one server
    Env {
        client: String,
        server: String,
        #[arg(value_enum)]
        action: EnvAction,
        key: Option<String>,
        value: Option<String>,
    },

    /// View all environment variables across all configs
    EnvView {
        /// Only this key
        #[arg(long, short)]
        key: Option<String>,
        /// Show actual values (default: masked)
        #[arg(long, short = 'v')]
        show_values: bool,
    },

    /// Update an environment variable everywhere it is already set
    EnvUpdateAll {
        key: String,
        value: Option<String>,
        /// Remove the variable instead of updating it
        #[arg(long)]
        unset: bool,
        /// Only update in these clients
        #[arg(long, value_delimiter = ',')]
        clients: Vec<String>,
        /// Only update in these servers
        #[arg(long, value_delimiter = ',')]
        servers: Vec<String>,
        /// Show what would change without writing
        #[arg(long, short)]
        dry_run: bool,
    },

    /// Export a client's servers (or one server) as JSON
    Export {
        client: String,
        /// Output file (stdout when omitted)
        output: Option<PathBuf>,
        /// Export only this server
        #[arg(long, short)]
        server: Option<String>,
    },

    /// Import an exported document into a client
    Import {
        client: String,
        file: PathBuf,
    },

    /// Manage the global server store
    #[command(subcommand)]
    Global(GlobalCommand),
}

#[derive(Clone, Copy, ValueEnum)]
enum EnvAction {
    Set,
    Unset,
    List,
}

#[derive(Subcommand)]
enum GlobalCommand {
    /// List global servers
    List,
    /// Add a global server
    Add {
        name: String,
        #[arg(long, short)]
        command: Option<String>,
        #[arg(long = "arg", short, allow_hyphen_values = true)]
        args: Vec<String>,
        #[arg(long, short, value_name = "KEY=VALUE")]
        env: Vec<String>,
    },
    /// Remove a global server
    Remove { name: String },
    /// Set or unset one env var of a global server
    Env {
        name: String,
        key: String,
        /// New value (unset when omitted)
        value: Option<String>,
    },
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mcpconf=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let policy = if cli.materialize {
        WritePolicy::Materialize
    } else {
        WritePolicy::Delta
    };
    let config = EngineConfig::discover(cli.registry.as_deref(), cli.global_store.clone())?
        .with_write_policy(policy);
    let manager = ConfigManager::new(config);
    tracing::debug!(
        global_store = %manager.config().global_store_path().display(),
        ?policy,
        "Engine ready"
    );
    let out = Renderer::new(cli.format == OutputFormat::Json);

    run(&manager, &out, cli.command)
}

fn run(manager: &ConfigManager, out: &Renderer, command: Commands) -> Result<()> {
    match command {
        Commands::List => out.clients(&manager.list_clients())?,
        Commands::Show { client } => {
            let config = manager.read_config(&client)?;
            out.servers(&format!("MCP Servers for {client}"), &config.servers)?;
        }
        Commands::Add {
            client,
            name,
            command,
            args,
            env,
            clients,
        } => {
            let entry = build_entry(command, args, &env)?;
            if !clients.is_empty() {
                let results = manager.add_server_to_multiple_clients(&name, &entry, &clients)?;
                out.batch(&format!("Added '{name}'"), &results)?;
            } else {
                let client = client.ok_or_else(|| {
                    anyhow::anyhow!("Missing required argument: client (or use --clients)")
                })?;
                manager.add_server(&client, &name, entry)?;
                out.done(&format!("Added server '{name}' to {client}"))?;
            }
        }
        Commands::Remove { client, server } => {
            if client == "all" {
                let results = manager.remove_server_from_all_clients(&server)?;
                out.batch(&format!("Removed '{server}'"), &results)?;
            } else {
                manager.remove_server(&client, &server)?;
                out.done(&format!("Removed server '{server}' from {client}"))?;
            }
        }
        Commands::Copy {
            from,
            server,
            to,
            new_name,
        } => {
            if to == "all" {
                let results =
                    manager.copy_server_to_all_clients(&from, &server, new_name.as_deref())?;
                out.batch(&format!("Copied '{server}'"), &results)?;
            } else {
                manager.copy_server(&from, &server, &to, new_name.as_deref())?;
                let target = new_name.as_deref().unwrap_or(&server);
                out.done(&format!(
                    "Copied '{server}' from {from} to {to} as '{target}'"
                ))?;
            }
        }
        Commands::Rename { old_name, new_name } => {
            let report = manager.rename_server_across_clients(&old_name, &new_name)?;
            out.rename(&old_name, &new_name, &report)?;
        }
        Commands::Env {
            client,
            server,
            action,
            key,
            value,
        } => run_env(manager, out, &client, &server, action, key, value)?,
        Commands::EnvView { key, show_values } => {
            let mut index = manager.get_all_environment_variables();
            if let Some(key) = key {
                index.retain(|entry| entry.key == key);
            }
            out.env_index(&index, show_values)?;
        }
        Commands::EnvUpdateAll {
            key,
            value,
            unset,
            clients,
            servers,
            dry_run,
        } => {
            let new_value = if unset {
                None
            } else {
                Some(value.ok_or_else(|| {
                    anyhow::anyhow!("A value is required unless --unset is given")
                })?)
            };
            let targets = env_targets(manager, &key, &clients, &servers);
            let results = if dry_run {
                manager.plan_env_update(&key, new_value.as_deref(), targets.as_deref())?
            } else {
                manager.update_environment_variable_across_configs(
                    &key,
                    new_value.as_deref(),
                    targets.as_deref(),
                )?
            };
            let verb = if dry_run { "Would update" } else { "Updated" };
            out.batch(&format!("{verb} {key}"), &results)?;
        }
        Commands::Export {
            client,
            output,
            server,
        } => match (server, output) {
            (Some(server), Some(path)) => {
                write_export(&path, &manager.export_server(&client, &server)?)?;
                out.done(&format!("Exported '{server}' to {}", path.display()))?;
            }
            (Some(server), None) => out.json(&manager.export_server(&client, &server)?)?,
            (None, Some(path)) => {
                write_export(&path, &manager.export_config(&client)?)?;
                out.done(&format!("Exported {client} to {}", path.display()))?;
            }
            (None, None) => out.json(&manager.export_config(&client)?)?,
        },
        Commands::Import { client, file } => match manager.import_config(&client, &file)? {
            ImportKind::Servers(count) => {
                out.done(&format!("Imported {count} server(s) into {client}"))?
            }
            ImportKind::Server => out.done(&format!("Imported server into {client}"))?,
        },
        Commands::Global(command) => run_global(manager, out, command)?,
    }
    Ok(())
}

fn run_env(
    manager: &ConfigManager,
    out: &Renderer,
    client: &str,
    server: &str,
    action: EnvAction,
    key: Option<String>,
    value: Option<String>,
) -> Result<()> {
    match action {
        EnvAction::List => {
            let entry = manager.effective_server(client, server)?;
            out.server_env(server, &entry)?;
        }
        EnvAction::Set => {
            let (Some(key), Some(value)) = (key, value) else {
                anyhow::bail!("Both key and value required for set action");
            };
            manager.update_server_env(client, server, &key, Some(&value))?;
            out.done(&format!("Set {key} for server '{server}' in {client}"))?;
        }
        EnvAction::Unset => {
            let key = key.ok_or_else(|| anyhow::anyhow!("Key required for unset action"))?;
            manager.update_server_env(client, server, &key, None)?;
            out.done(&format!("Unset {key} for server '{server}' in {client}"))?;
        }
    }
    Ok(())
}

fn run_global(manager: &ConfigManager, out: &Renderer, command: GlobalCommand) -> Result<()> {
    match command {
        GlobalCommand::List => {
            out.servers("Global MCP Servers", &manager.read_global_servers()?)?;
        }
        GlobalCommand::Add {
            name,
            command,
            args,
            env,
        } => {
            manager.add_global_server(&name, build_entry(command, args, &env)?)?;
            out.done(&format!("Added global server '{name}'"))?;
        }
        GlobalCommand::Remove { name } => {
            manager.remove_global_server(&name)?;
            out.done(&format!("Removed global server '{name}'"))?;
        }
        GlobalCommand::Env { name, key, value } => {
            manager.update_global_server_env(&name, &key, value.as_deref())?;
            let verb = if value.is_some() { "Set" } else { "Unset" };
            out.done(&format!("{verb} {key} for global server '{name}'"))?;
        }
    }
    Ok(())
}

fn build_entry(command: Option<String>, args: Vec<String>, env: &[String]) -> Result<ServerEntry> {
    let mut entry = ServerEntry {
        command,
        ..ServerEntry::default()
    };
    if !args.is_empty() {
        entry.args = Some(args);
    }
    for pair in env {
        let (key, value) = parse_env_pair(pair)?;
        entry.set_env(key, Some(value));
    }
    Ok(entry)
}

fn parse_env_pair(pair: &str) -> Result<(&str, &str)> {
    match pair.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key, value)),
        _ => anyhow::bail!("Invalid environment variable '{pair}', expected KEY=VALUE"),
    }
}

/// Turn `--clients` / `--servers` filters into explicit targets.
fn env_targets(
    manager: &ConfigManager,
    key: &str,
    clients: &[String],
    servers: &[String],
) -> Option<Vec<EnvTarget>> {
    if clients.is_empty() && servers.is_empty() {
        return None;
    }
    let locations = manager
        .find_environment_variable(key)
        .map(|entry| entry.locations)
        .unwrap_or_default();
    Some(
        locations
            .into_iter()
            .filter(|loc| clients.is_empty() || clients.contains(&loc.client_id))
            .filter(|loc| servers.is_empty() || servers.contains(&loc.server_name))
            .map(|loc| EnvTarget::new(loc.client_id, loc.server_name))
            .collect(),
    )
}
