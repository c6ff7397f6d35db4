//! Client listing and the cross-client server inventory.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::path::PathBuf;

use serde::Serialize;

use crate::config::ServerEntry;
use crate::error::{ConfigError, Result};
use crate::manager::ConfigManager;

/// One row of the client list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSummary {
    pub id: String,
    pub name: String,
    pub config_path: PathBuf,
    pub server_count: usize,
    /// False when the client was detected but its config could not be read.
    pub exists: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRef {
    pub id: String,
    pub name: String,
    pub config_path: PathBuf,
}

/// Where one server name appears.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerInventoryEntry {
    pub clients: Vec<ClientRef>,
    /// The name exists in the global store.
    pub global: bool,
    /// First definition seen: the global one if any, else the first client's.
    pub config: ServerEntry,
    pub config_hash: String,
}

/// blake3 hash of an entry's canonical JSON, ignoring `env`.
///
/// Entries that differ only in credentials hash the same.
pub fn config_hash(entry: &ServerEntry) -> Result<String> {
    let mut without_env = entry.clone();
    without_env.env = None;
    let bytes = serde_json::to_vec(&without_env)
        .map_err(|e| ConfigError::validation(format!("Failed to serialize server entry: {e}")))?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}

impl ConfigManager {
    /// Detected clients with their effective server counts.
    pub fn list_clients(&self) -> Vec<ClientSummary> {
        self.available_clients()
            .into_iter()
            .map(|client| {
                let config_path = self.config().client_path(client);
                let (server_count, exists) = match self.read_config(&client.id) {
                    Ok(config) => (config.servers.len(), true),
                    Err(err) => {
                        tracing::warn!(client = %client.id, error = %err, "Could not read client config");
                        (0, false)
                    }
                };
                ClientSummary {
                    id: client.id.clone(),
                    name: client.display_name.clone(),
                    config_path,
                    server_count,
                    exists,
                }
            })
            .collect()
    }

    /// `(id, display name)` of detected clients.
    pub fn supported_clients(&self) -> Vec<(String, String)> {
        self.available_clients()
            .into_iter()
            .map(|client| (client.id.clone(), client.display_name.clone()))
            .collect()
    }

    /// Every server name across the global store and detected clients.
    ///
    /// A corrupt global store fails the call; unreadable clients are skipped.
    pub fn servers_in_clients(&self) -> Result<BTreeMap<String, ServerInventoryEntry>> {
        let global = self.read_global_servers()?;
        let mut inventory = BTreeMap::new();
        for (name, entry) in &global {
            inventory.insert(
                name.clone(),
                ServerInventoryEntry {
                    clients: Vec::new(),
                    global: true,
                    config: entry.clone(),
                    config_hash: config_hash(entry)?,
                },
            );
        }

        for client in self.available_clients() {
            let config = match self.read_config(&client.id) {
                Ok(config) => config,
                Err(err) => {
                    tracing::warn!(client = %client.id, error = %err, "Skipping client in inventory");
                    continue;
                }
            };
            let client_ref = ClientRef {
                id: client.id.clone(),
                name: client.display_name.clone(),
                config_path: self.config().client_path(client),
            };
            for (name, entry) in config.servers {
                let slot = match inventory.entry(name) {
                    Entry::Occupied(slot) => slot.into_mut(),
                    Entry::Vacant(slot) => {
                        let in_global = global.contains_key(slot.key());
                        slot.insert(ServerInventoryEntry {
                            clients: Vec::new(),
                            global: in_global,
                            config_hash: config_hash(&entry)?,
                            config: entry,
                        })
                    }
                };
                slot.clients.push(client_ref.clone());
            }
        }
        Ok(inventory)
    }
}
