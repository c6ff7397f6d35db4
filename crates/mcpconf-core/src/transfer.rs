//! Export and import of servers as standalone JSON documents.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::config::client_config::{read_optional, write_file};
use crate::config::{ServerEntry, ServerMap};
use crate::error::{ConfigError, Result};
use crate::manager::ConfigManager;

/// Every effective server of one client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigExport {
    pub client: String,
    pub timestamp: String,
    pub servers: ServerMap,
}

/// One server of one client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerExport {
    pub client: String,
    pub server_name: String,
    pub timestamp: String,
    pub config: ServerEntry,
}

/// What an import file turned out to contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    /// Replaced the client's servers.
    Servers(usize),
    /// Added a single server.
    Server,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportDocument {
    #[serde(default)]
    servers: Option<ServerMap>,
    #[serde(default)]
    config: Option<ServerEntry>,
    #[serde(default)]
    server_name: Option<String>,
}

fn timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Serialize an export document to `path` as pretty JSON.
pub fn write_export<T: Serialize>(path: &Path, document: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(document)
        .map_err(|e| ConfigError::validation(format!("Failed to serialize export: {e}")))?;
    write_file(path, &content)
}

impl ConfigManager {
    pub fn export_config(&self, client_id: &str) -> Result<ConfigExport> {
        let config = self.read_config(client_id)?;
        Ok(ConfigExport {
            client: client_id.to_string(),
            timestamp: timestamp(Utc::now()),
            servers: config.servers,
        })
    }

    pub fn export_server(&self, client_id: &str, server_name: &str) -> Result<ServerExport> {
        let config = self.effective_server(client_id, server_name)?;
        Ok(ServerExport {
            client: client_id.to_string(),
            server_name: server_name.to_string(),
            timestamp: timestamp(Utc::now()),
            config,
        })
    }

    /// Import a document written by one of the export calls.
    ///
    /// A `servers` document replaces the client's servers, persisted under
    /// the configured write policy; a `config` + `serverName` document adds
    /// one server.
    pub fn import_config(&self, client_id: &str, import_path: &Path) -> Result<ImportKind> {
        self.client(client_id)?;
        let content = read_optional(import_path)?.ok_or_else(|| {
            ConfigError::not_found(format!("Import file not found: {}", import_path.display()))
        })?;
        let document: ImportDocument =
            serde_json::from_str(&content).map_err(|e| ConfigError::parse(import_path, e))?;

        match document {
            ImportDocument {
                servers: Some(servers),
                ..
            } => {
                self.persist_effective(client_id, &servers)?;
                tracing::info!(client = client_id, servers = servers.len(), "Imported servers");
                Ok(ImportKind::Servers(servers.len()))
            }
            ImportDocument {
                config: Some(config),
                server_name: Some(name),
                ..
            } => {
                self.add_server(client_id, &name, config)?;
                Ok(ImportKind::Server)
            }
            _ => Err(ConfigError::validation("Invalid import file format")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_is_rfc3339_utc() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        assert_eq!(timestamp(at), "2024-05-01T12:30:00.000Z");
    }

    #[test]
    fn test_server_export_field_names() {
        let export = ServerExport {
            client: "c".into(),
            server_name: "s".into(),
            timestamp: "t".into(),
            config: ServerEntry::with_command("npx"),
        };
        let json = serde_json::to_value(&export).unwrap();
        assert_eq!(json["serverName"], "s");
        assert_eq!(json["config"]["command"], "npx");
    }
}
