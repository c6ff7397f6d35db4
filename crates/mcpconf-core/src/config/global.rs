//! Global overlay store: one JSON file of servers applied to every client.

use std::path::{Path, PathBuf};

use super::client_config::{ConfigSerializer, JsonSerializer};
use super::server::{ServerEntry, ServerMap, servers_from_map, servers_to_map};
use crate::error::{ConfigError, Result};

/// Handle on the global servers file.
///
/// Holds no cached contents; every call reads or replaces the whole file.
#[derive(Debug, Clone)]
pub struct GlobalStore {
    path: PathBuf,
}

impl GlobalStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every global server. An absent file is an empty store.
    pub fn read(&self) -> Result<ServerMap> {
        let Some(map) = JsonSerializer.load(&self.path)? else {
            return Ok(ServerMap::new());
        };
        servers_from_map(&map).map_err(|message| ConfigError::parse(&self.path, message))
    }

    /// Replace the file contents with `servers`.
    pub fn write(&self, servers: &ServerMap) -> Result<()> {
        JsonSerializer.save(&self.path, &servers_to_map(servers)?)
    }

    pub fn add(&self, name: &str, entry: ServerEntry) -> Result<()> {
        let mut servers = self.read()?;
        servers.insert(name.to_string(), entry);
        self.write(&servers)?;
        tracing::info!(server = name, "Added global server");
        Ok(())
    }

    /// Remove `name`. Removing an absent entry still rewrites the file.
    pub fn remove(&self, name: &str) -> Result<()> {
        let mut servers = self.read()?;
        let existed = servers.remove(name).is_some();
        self.write(&servers)?;
        tracing::info!(server = name, existed, "Removed global server");
        Ok(())
    }

    /// Set one env key of a global server, or delete it when `value` is `None`.
    pub fn update_env(&self, name: &str, key: &str, value: Option<&str>) -> Result<()> {
        let mut servers = self.read()?;
        let entry = servers
            .get_mut(name)
            .ok_or_else(|| ConfigError::not_found(format!("Global server {name} not found")))?;
        entry.set_env(key, value);
        self.write(&servers)?;
        tracing::info!(server = name, key, unset = value.is_none(), "Updated global server env");
        Ok(())
    }

    /// Move the entry stored under `old` to `new`. Returns whether it existed.
    pub fn rename(&self, old: &str, new: &str) -> Result<bool> {
        let mut servers = self.read()?;
        let Some(entry) = servers.remove(old) else {
            return Ok(false);
        };
        servers.insert(new.to_string(), entry);
        self.write(&servers)?;
        tracing::info!(from = old, to = new, "Renamed global server");
        Ok(true)
    }
}
