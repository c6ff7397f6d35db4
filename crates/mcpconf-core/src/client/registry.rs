//! Client registry: the static table of known clients.
//!
//! Defaults to the built-in table. A TOML registry file can replace it,
//! which is how sandboxed test clients are wired in.

use std::path::Path;

use serde::Deserialize;

use super::ClientDescriptor;
use crate::config::client_config::read_optional;
use crate::error::{ConfigError, Result};
use crate::types::{FormatTag, PathTemplate};

/// Ordered table of client descriptors, unique by id.
#[derive(Debug, Clone)]
pub struct ClientRegistry {
    clients: Vec<ClientDescriptor>,
}

impl Default for ClientRegistry {
    fn default() -> Self {
        Self::with_default_clients()
    }
}

impl ClientRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            clients: Vec::new(),
        }
    }

    /// Create a registry with every built-in client.
    pub fn with_default_clients() -> Self {
        let clients = vec![
            ClientDescriptor::new(
                "claude",
                "Claude Desktop",
                PathTemplate::new(
                    "~/Library/Application Support/Claude/claude_desktop_config.json",
                    "{appdata}/Claude/claude_desktop_config.json",
                    "~/.config/Claude/claude_desktop_config.json",
                ),
                FormatTag::McpServers,
            ),
            ClientDescriptor::new(
                "claude-code",
                "Claude Code",
                PathTemplate::uniform(".mcp.json"),
                FormatTag::McpServers,
            ),
            ClientDescriptor::new(
                "vscode",
                "VS Code",
                PathTemplate::uniform(".vscode/mcp.json"),
                FormatTag::NestedMcpServers,
            ),
            ClientDescriptor::new(
                "cursor",
                "Cursor",
                PathTemplate::uniform(".cursor/mcp.json"),
                FormatTag::McpServers,
            ),
            ClientDescriptor::new(
                "gemini",
                "Gemini",
                PathTemplate::uniform("~/.gemini/settings.json"),
                FormatTag::McpServers,
            ),
            ClientDescriptor::new(
                "windsurf",
                "Windsurf",
                PathTemplate::uniform("~/.codeium/windsurf/mcp_config.json"),
                FormatTag::McpServers,
            ),
            ClientDescriptor::new(
                "amazonq",
                "Amazon Q Developer",
                PathTemplate::uniform("~/.aws/amazonq/mcp.json"),
                FormatTag::McpServers,
            ),
            ClientDescriptor::new(
                "codex",
                "Codex",
                PathTemplate::uniform("~/.codex/config.toml"),
                FormatTag::TomlMcpServers,
            ),
        ];
        Self { clients }
    }

    /// Build a registry from explicit descriptors, rejecting duplicate ids.
    pub fn from_clients(clients: impl IntoIterator<Item = ClientDescriptor>) -> Result<Self> {
        let mut registry = Self::new();
        for client in clients {
            registry.register(client)?;
        }
        Ok(registry)
    }

    /// Parse a TOML registry document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: RegistryFile = toml::from_str(content)
            .map_err(|e| ConfigError::validation(format!("Invalid client registry: {e}")))?;
        let clients = file
            .clients
            .into_iter()
            .map(RegistryFileEntry::into_descriptor)
            .collect::<Result<Vec<_>>>()?;
        Self::from_clients(clients)
    }

    /// Load a TOML registry file. Unlike client files, it must exist.
    pub fn load(path: &Path) -> Result<Self> {
        let content = read_optional(path)?.ok_or_else(|| {
            ConfigError::not_found(format!("Client registry not found: {}", path.display()))
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            ConfigError::Validation(message) => ConfigError::parse(path, message),
            other => other,
        })
    }

    /// Register a client descriptor.
    pub fn register(&mut self, client: ClientDescriptor) -> Result<()> {
        if client.id.trim().is_empty() {
            return Err(ConfigError::validation("Client id cannot be empty"));
        }
        if self.get(&client.id).is_some() {
            return Err(ConfigError::validation(format!(
                "Duplicate client id: {}",
                client.id
            )));
        }
        self.clients.push(client);
        Ok(())
    }

    /// Get all registered clients in declaration order.
    pub fn all(&self) -> &[ClientDescriptor] {
        &self.clients
    }

    /// Get a client by ID.
    pub fn get(&self, id: &str) -> Option<&ClientDescriptor> {
        self.clients.iter().find(|c| c.id == id)
    }

    /// Get a client by ID or fail with `NotFound`.
    pub fn require(&self, id: &str) -> Result<&ClientDescriptor> {
        self.get(id)
            .ok_or_else(|| ConfigError::not_found(format!("Unknown client: {id}")))
    }

    /// List all client IDs.
    pub fn client_ids(&self) -> Vec<&str> {
        self.clients.iter().map(|c| c.id.as_str()).collect()
    }
}

#[derive(Debug, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    clients: Vec<RegistryFileEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RegistryFileEntry {
    id: String,
    name: String,
    format: FormatTag,
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    paths: Option<PathTemplate>,
}

impl RegistryFileEntry {
    fn into_descriptor(self) -> Result<ClientDescriptor> {
        let template = match (self.path, self.paths) {
            (Some(path), None) => PathTemplate::uniform(path),
            (None, Some(paths)) => paths,
            _ => {
                return Err(ConfigError::validation(format!(
                    "Client '{}' must set exactly one of 'path' or 'paths'",
                    self.id
                )));
            }
        };
        Ok(ClientDescriptor::new(self.id, self.name, template, self.format))
    }
}
