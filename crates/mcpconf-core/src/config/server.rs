//! Canonical in-memory model of one MCP server entry.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ConfigError, Result};

/// Servers keyed by name, the canonical shape every format normalizes to.
pub type ServerMap = BTreeMap<String, ServerEntry>;

/// A server definition as stored by a client.
///
/// `command`, `args` and `env` are the recognized fields. Everything else a
/// client stores (`type`, `url`, `headers`, `disabled`, ...) lands in `extra`
/// and is written back untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<BTreeMap<String, String>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ServerEntry {
    pub fn with_command(command: impl Into<String>) -> Self {
        Self {
            command: Some(command.into()),
            ..Self::default()
        }
    }

    pub fn env_value(&self, key: &str) -> Option<&str> {
        self.env.as_ref()?.get(key).map(String::as_str)
    }

    pub fn has_env(&self, key: &str) -> bool {
        self.env.as_ref().is_some_and(|env| env.contains_key(key))
    }

    /// Set `key` to `value`, or delete it when `value` is `None`.
    ///
    /// Returns the previous value.
    pub fn set_env(&mut self, key: &str, value: Option<&str>) -> Option<String> {
        let env = self.env.get_or_insert_with(BTreeMap::new);
        match value {
            Some(value) => env.insert(key.to_string(), value.to_string()),
            None => env.remove(key),
        }
    }

    /// Overlay every top-level field present on `other` onto `self`.
    ///
    /// Nested maps are replaced wholesale: an overriding `env` does not
    /// merge key-by-key with the one underneath.
    pub fn overlay(&mut self, other: &ServerEntry) {
        if other.command.is_some() {
            self.command = other.command.clone();
        }
        if other.args.is_some() {
            self.args = other.args.clone();
        }
        if other.env.is_some() {
            self.env = other.env.clone();
        }
        for (key, value) in &other.extra {
            self.extra.insert(key.clone(), value.clone());
        }
    }

    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self)
            .map_err(|e| ConfigError::validation(format!("Failed to serialize server entry: {e}")))
    }
}

/// Convert a raw JSON object of servers into typed entries.
pub fn servers_from_map(map: &Map<String, Value>) -> std::result::Result<ServerMap, String> {
    let mut servers = ServerMap::new();
    for (name, value) in map {
        let entry: ServerEntry = serde_json::from_value(value.clone())
            .map_err(|e| format!("invalid server entry '{name}': {e}"))?;
        servers.insert(name.clone(), entry);
    }
    Ok(servers)
}

/// Convert typed entries back into a raw JSON object.
pub fn servers_to_map(servers: &ServerMap) -> Result<Map<String, Value>> {
    let mut map = Map::new();
    for (name, entry) in servers {
        map.insert(name.clone(), entry.to_value()?);
    }
    Ok(map)
}
