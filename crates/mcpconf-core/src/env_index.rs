//! Reverse index of environment variables across every client.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::manager::ConfigManager;

/// One place an environment variable is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvVarLocation {
    pub client_id: String,
    pub client_display_name: String,
    pub server_name: String,
    pub value: String,
}

/// Every location of one environment variable key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvVarIndexEntry {
    pub key: String,
    pub locations: Vec<EnvVarLocation>,
}

const SENSITIVE_MARKERS: [&str; 4] = ["KEY", "SECRET", "TOKEN", "PASSWORD"];

/// Mask a value for display when the key or the value looks sensitive.
pub fn mask_env_value(key: &str, value: &str) -> String {
    let sensitive = SENSITIVE_MARKERS
        .iter()
        .any(|marker| key.to_uppercase().contains(marker) || value.contains(marker));
    if !sensitive {
        return value.to_string();
    }
    let prefix: String = value.chars().take(4).collect();
    format!("{prefix}***")
}

impl ConfigManager {
    /// Build the reverse index, sorted by key.
    ///
    /// Rebuilt from disk on every call. Clients that cannot be read are
    /// skipped.
    pub fn get_all_environment_variables(&self) -> Vec<EnvVarIndexEntry> {
        let mut index: BTreeMap<String, Vec<EnvVarLocation>> = BTreeMap::new();

        for client in self.config().registry().all() {
            let config = match self.read_config(&client.id) {
                Ok(config) => config,
                Err(err) => {
                    tracing::warn!(client = %client.id, error = %err, "Skipping client in env index");
                    continue;
                }
            };
            for (server_name, entry) in &config.servers {
                let Some(env) = &entry.env else {
                    continue;
                };
                for (key, value) in env {
                    index.entry(key.clone()).or_default().push(EnvVarLocation {
                        client_id: client.id.clone(),
                        client_display_name: client.display_name.clone(),
                        server_name: server_name.clone(),
                        value: value.clone(),
                    });
                }
            }
        }

        index
            .into_iter()
            .map(|(key, locations)| EnvVarIndexEntry { key, locations })
            .collect()
    }

    /// Index entry for one key, if any server sets it.
    pub fn find_environment_variable(&self, key: &str) -> Option<EnvVarIndexEntry> {
        self.get_all_environment_variables()
            .into_iter()
            .find(|entry| entry.key == key)
    }
}
