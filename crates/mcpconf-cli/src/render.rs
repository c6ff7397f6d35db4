//! Terminal and JSON output for command results.

use anyhow::Result;
use console::style;
use serde::Serialize;

use mcpconf_core::config::{ServerEntry, ServerMap};
use mcpconf_core::env_index::{EnvVarIndexEntry, mask_env_value};
use mcpconf_core::inventory::ClientSummary;
use mcpconf_core::propagation::{BatchResult, BatchStatus, BatchSummary, RenameReport};

pub struct Renderer {
    json: bool,
}

impl Renderer {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    pub fn json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    pub fn done(&self, message: &str) -> Result<()> {
        if self.json {
            return self.json(&serde_json::json!({ "success": true, "message": message }));
        }
        println!("{} {message}", style("✓").green());
        Ok(())
    }

    pub fn clients(&self, clients: &[ClientSummary]) -> Result<()> {
        if self.json {
            return self.json(clients);
        }
        println!("\n{}\n", style("Detected MCP Clients:").bold());
        if clients.is_empty() {
            println!("  No client configuration files found");
        }
        for client in clients {
            let status = if client.exists {
                format!("✓ {} server(s)", client.server_count)
            } else {
                "✗ Unreadable config".to_string()
            };
            println!(
                "  {:<20} {:<20} {}",
                client.name,
                status,
                style(client.config_path.display()).dim()
            );
        }
        Ok(())
    }

    pub fn servers(&self, title: &str, servers: &ServerMap) -> Result<()> {
        if self.json {
            return self.json(servers);
        }
        println!("\n{}\n", style(format!("{title}:")).bold());
        if servers.is_empty() {
            println!("  No servers configured");
        }
        for (name, entry) in servers {
            println!("  {}:", style(name).cyan());
            println!("    Command: {}", entry.command.as_deref().unwrap_or("N/A"));
            if let Some(args) = &entry.args {
                println!("    Args: {}", args.join(" "));
            }
            if let Some(env) = &entry.env {
                println!("    Environment variables:");
                for (key, value) in env {
                    println!("      {key}: {}", mask_env_value(key, value));
                }
            }
            println!();
        }
        Ok(())
    }

    pub fn server_env(&self, server: &str, entry: &ServerEntry) -> Result<()> {
        if self.json {
            return self.json(&entry.env);
        }
        println!("\nEnvironment variables for {server}:\n");
        match &entry.env {
            Some(env) if !env.is_empty() => {
                for (key, value) in env {
                    println!("  {key}: {}", mask_env_value(key, value));
                }
            }
            _ => println!("  No environment variables set"),
        }
        Ok(())
    }

    pub fn env_index(&self, index: &[EnvVarIndexEntry], show_values: bool) -> Result<()> {
        if self.json {
            return self.json(index);
        }
        if index.is_empty() {
            println!("No environment variables found");
            return Ok(());
        }
        for entry in index {
            println!(
                "\n{} ({} location(s))",
                style(&entry.key).bold(),
                entry.locations.len()
            );
            for loc in &entry.locations {
                let value = if show_values {
                    loc.value.clone()
                } else {
                    mask_env_value(&entry.key, &loc.value)
                };
                println!(
                    "  {} / {}: {value}",
                    loc.client_display_name, loc.server_name
                );
            }
        }
        Ok(())
    }

    pub fn batch(&self, title: &str, results: &[BatchResult]) -> Result<()> {
        if self.json {
            return self.json(results);
        }
        for result in results {
            println!("  {}", batch_line(result));
        }
        let summary = BatchSummary::of(results);
        println!(
            "\n{title}: {} succeeded, {} failed, {} not found",
            style(summary.applied).green(),
            style(summary.failed).red(),
            summary.not_found
        );
        Ok(())
    }

    pub fn rename(&self, old: &str, new: &str, report: &RenameReport) -> Result<()> {
        if self.json {
            return self.json(report);
        }
        if report.unchanged {
            println!("Server name is the same, no action taken.");
            return Ok(());
        }
        if report.global_renamed {
            println!("  {} Renamed in global store", style("✓").green());
        }
        self.batch(&format!("Renamed '{old}' to '{new}'"), &report.results)
    }
}

fn batch_line(result: &BatchResult) -> String {
    let target = match (&result.client_name, &result.server) {
        (Some(name), Some(server)) => format!("{name} / {server}"),
        (Some(name), None) => name.clone(),
        (None, Some(server)) => format!("{} / {server}", result.client),
        (None, None) => result.client.clone(),
    };
    match result.status {
        BatchStatus::Applied => {
            let change = match (&result.old_value, &result.new_value) {
                (Some(old), Some(new)) => format!(" ({old} → {new})"),
                (Some(old), None) => format!(" (removed {old})"),
                _ => String::new(),
            };
            format!("{} {target}{change}", style("✓").green())
        }
        BatchStatus::NotFound => format!(
            "{} {target}: {}",
            style("-").dim(),
            result.message.as_deref().unwrap_or("not found")
        ),
        BatchStatus::Failed => format!(
            "{} {target}: {}",
            style("✗").red(),
            result.error.as_deref().unwrap_or("failed")
        ),
    }
}
