//! Effective-config reader/writer.
//!
//! [`ConfigManager`] is the entry point of the engine. Every call reads the
//! files it needs fresh and writes immediately; nothing is cached except the
//! detector's list of available clients.
//!
//! No lock is taken on any file. Two managers (or an external application)
//! mutating the same client file concurrently can lose one side's update.

use std::path::PathBuf;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::client::{ClientDescriptor, ClientDetector};
use crate::config::client_config::serializer_for_format;
use crate::config::{
    GlobalStore, ServerEntry, ServerMap, delta_against_global, denormalize, normalize,
    overlay_servers,
};
use crate::context::{EngineConfig, WritePolicy};
use crate::error::{ConfigError, Result};

/// Computed `global ⊕ client` view of one client. Never persisted as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EffectiveClientConfig {
    pub servers: ServerMap,
}

#[derive(Debug)]
pub struct ConfigManager {
    config: EngineConfig,
    global: GlobalStore,
    detector: ClientDetector,
}

impl ConfigManager {
    pub fn new(config: EngineConfig) -> Self {
        let global = GlobalStore::new(config.global_store_path());
        Self {
            config,
            global,
            detector: ClientDetector::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ----------------------------------------------------------------
    // Global overlay store
    // ----------------------------------------------------------------

    pub fn global_store(&self) -> &GlobalStore {
        &self.global
    }

    pub fn read_global_servers(&self) -> Result<ServerMap> {
        self.global.read()
    }

    pub fn write_global_servers(&self, servers: &ServerMap) -> Result<()> {
        self.global.write(servers)
    }

    pub fn add_global_server(&self, name: &str, entry: ServerEntry) -> Result<()> {
        require_name(name)?;
        self.global.add(name, entry)
    }

    pub fn remove_global_server(&self, name: &str) -> Result<()> {
        self.global.remove(name)
    }

    pub fn update_global_server_env(
        &self,
        name: &str,
        key: &str,
        value: Option<&str>,
    ) -> Result<()> {
        require_env_key(key)?;
        self.global.update_env(name, key, value)
    }

    // ----------------------------------------------------------------
    // Registry lookups and detection
    // ----------------------------------------------------------------

    pub fn client(&self, client_id: &str) -> Result<&ClientDescriptor> {
        self.config.registry().require(client_id)
    }

    /// Resolved config file path of a client on the configured platform.
    pub fn config_path(&self, client_id: &str) -> Result<PathBuf> {
        Ok(self.config.client_path(self.client(client_id)?))
    }

    /// Clients whose config file exists, memoised for this manager's lifetime.
    pub fn available_clients(&self) -> Vec<&ClientDescriptor> {
        let ids = self
            .detector
            .detected(self.config.registry(), |c| self.config.client_path(c));
        self.descriptors(&ids)
    }

    /// Probe the filesystem again, replacing the memoised result.
    pub fn detect_clients(&self) -> Vec<&ClientDescriptor> {
        let ids = self
            .detector
            .redetect(self.config.registry(), |c| self.config.client_path(c));
        self.descriptors(&ids)
    }

    pub fn invalidate_detection(&self) {
        self.detector.invalidate();
    }

    fn descriptors(&self, ids: &[String]) -> Vec<&ClientDescriptor> {
        ids.iter()
            .filter_map(|id| self.config.registry().get(id))
            .collect()
    }

    // ----------------------------------------------------------------
    // Per-client read / write
    // ----------------------------------------------------------------

    /// Servers stored in the client's own file, without the global overlay.
    pub fn read_client_servers(&self, client_id: &str) -> Result<ServerMap> {
        let client = self.client(client_id)?;
        let path = self.config.client_path(client);
        let Some(body) = self.load_body(client, &path)? else {
            return Ok(ServerMap::new());
        };
        normalize(&body, client.format).map_err(|message| ConfigError::parse(&path, message))
    }

    /// Effective view: the global store overlaid with the client's own entries.
    pub fn read_config(&self, client_id: &str) -> Result<EffectiveClientConfig> {
        let client_servers = self.read_client_servers(client_id)?;
        let global = self.global.read()?;
        Ok(EffectiveClientConfig {
            servers: overlay_servers(&global, &client_servers),
        })
    }

    /// Persist `servers` verbatim as the client's own servers, keeping every
    /// other key of the existing document.
    pub fn write_config(&self, client_id: &str, servers: &ServerMap) -> Result<()> {
        let client = self.client(client_id)?;
        let path = self.config.client_path(client);
        let original = self.load_body(client, &path)?;
        let body = denormalize(servers, client.format, original.as_ref())?;
        serializer_for_format(client.format.into()).save(&path, &body)?;
        tracing::debug!(client = client_id, servers = servers.len(), "Wrote client config");
        Ok(())
    }

    /// Persist an effective map according to the configured [`WritePolicy`].
    pub(crate) fn persist_effective(&self, client_id: &str, effective: &ServerMap) -> Result<()> {
        match self.config.write_policy() {
            WritePolicy::Materialize => self.write_config(client_id, effective),
            WritePolicy::Delta => {
                let global = self.global.read()?;
                let own = self.read_client_servers(client_id)?;
                self.write_config(client_id, &delta_against_global(effective, &global, &own))
            }
        }
    }

    fn load_body(
        &self,
        client: &ClientDescriptor,
        path: &std::path::Path,
    ) -> Result<Option<Map<String, Value>>> {
        serializer_for_format(client.format.into()).load(path)
    }

    // ----------------------------------------------------------------
    // Read-modify-write helpers
    // ----------------------------------------------------------------

    pub fn add_server(&self, client_id: &str, name: &str, entry: ServerEntry) -> Result<()> {
        require_name(name)?;
        let mut config = self.read_config(client_id)?;
        config.servers.insert(name.to_string(), entry);
        self.persist_effective(client_id, &config.servers)?;
        tracing::info!(client = client_id, server = name, "Added server");
        Ok(())
    }

    /// Remove `name` from the client's file. Absent entries are not an error.
    ///
    /// A server that only exists in the global store keeps showing up in the
    /// effective view; remove it from the store instead.
    pub fn remove_server(&self, client_id: &str, name: &str) -> Result<()> {
        let mut config = self.read_config(client_id)?;
        let existed = config.servers.remove(name).is_some();
        self.persist_effective(client_id, &config.servers)?;
        tracing::info!(client = client_id, server = name, existed, "Removed server");
        Ok(())
    }

    pub fn update_server_env(
        &self,
        client_id: &str,
        name: &str,
        key: &str,
        value: Option<&str>,
    ) -> Result<()> {
        require_env_key(key)?;
        let mut config = self.read_config(client_id)?;
        let entry = config.servers.get_mut(name).ok_or_else(|| {
            ConfigError::not_found(format!("Server {name} not found in {client_id}"))
        })?;
        entry.set_env(key, value);
        self.persist_effective(client_id, &config.servers)?;
        tracing::info!(
            client = client_id,
            server = name,
            key,
            unset = value.is_none(),
            "Updated server env"
        );
        Ok(())
    }

    /// Copy one server between clients, overwriting any entry of the target
    /// name. Fails with `NotFound` before writing if the source lacks it.
    pub fn copy_server(
        &self,
        from_client: &str,
        from_server: &str,
        to_client: &str,
        to_server: Option<&str>,
    ) -> Result<()> {
        let entry = self.effective_server(from_client, from_server)?;
        let target = to_server.unwrap_or(from_server);
        self.add_server(to_client, target, entry)
    }

    /// One server from a client's effective view.
    pub fn effective_server(&self, client_id: &str, name: &str) -> Result<ServerEntry> {
        self.read_config(client_id)?
            .servers
            .remove(name)
            .ok_or_else(|| ConfigError::not_found(format!("Server {name} not found in {client_id}")))
    }
}

pub(crate) fn require_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(ConfigError::validation("Server name cannot be empty"));
    }
    Ok(())
}

pub(crate) fn require_env_key(key: &str) -> Result<()> {
    if key.trim().is_empty() {
        return Err(ConfigError::validation(
            "Environment variable key cannot be empty",
        ));
    }
    Ok(())
}
