//! Cross-config propagation engine.
//!
//! Every operation here visits its targets one at a time, wraps each attempt
//! in its own error boundary and records a [`BatchResult`]. A failing target
//! never stops the loop and nothing already applied is rolled back. The
//! `Err` arm of the returned `Result` is reserved for malformed input and for
//! failures that happen before any target is visited.

use serde::{Deserialize, Serialize};

use crate::client::ClientDescriptor;
use crate::config::ServerEntry;
use crate::error::{ConfigError, Result};
use crate::manager::{ConfigManager, require_env_key, require_name};

/// Outcome of one target of a batch operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Applied,
    /// The target did not hold the entry; not counted as a failure.
    NotFound,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    pub client: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    pub status: BatchStatus,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<String>,
}

impl BatchResult {
    fn new(client: &str, server: Option<&str>, status: BatchStatus) -> Self {
        Self {
            client: client.to_string(),
            client_name: None,
            server: server.map(str::to_string),
            status,
            success: status == BatchStatus::Applied,
            error: None,
            message: None,
            old_value: None,
            new_value: None,
        }
    }

    pub fn applied(client: &str, server: Option<&str>) -> Self {
        Self::new(client, server, BatchStatus::Applied)
    }

    pub fn not_found(client: &str, server: Option<&str>, message: impl Into<String>) -> Self {
        let mut result = Self::new(client, server, BatchStatus::NotFound);
        result.message = Some(message.into());
        result
    }

    pub fn failed(client: &str, server: Option<&str>, error: &ConfigError) -> Self {
        let mut result = Self::new(client, server, BatchStatus::Failed);
        result.error = Some(error.to_string());
        result
    }

    pub fn with_client_name(mut self, name: &str) -> Self {
        self.client_name = Some(name.to_string());
        self
    }

    pub fn with_values(mut self, old_value: Option<String>, new_value: Option<&str>) -> Self {
        self.old_value = old_value;
        self.new_value = new_value.map(str::to_string);
        self
    }

    fn into_failed(mut self, error: &ConfigError) -> Self {
        self.status = BatchStatus::Failed;
        self.success = false;
        self.error = Some(error.to_string());
        self
    }
}

/// Per-status counts of a result list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub applied: usize,
    pub not_found: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn of(results: &[BatchResult]) -> Self {
        results.iter().fold(Self::default(), |mut summary, result| {
            match result.status {
                BatchStatus::Applied => summary.applied += 1,
                BatchStatus::NotFound => summary.not_found += 1,
                BatchStatus::Failed => summary.failed += 1,
            }
            summary
        })
    }
}

/// Result of renaming a server everywhere.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameReport {
    /// Old and new names were equal; nothing was touched.
    pub unchanged: bool,
    /// The global store held the old name and was rewritten.
    pub global_renamed: bool,
    pub results: Vec<BatchResult>,
}

/// Restricts an env update to one `(client, server)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnvTarget {
    pub client: String,
    pub server: String,
}

impl EnvTarget {
    pub fn new(client: impl Into<String>, server: impl Into<String>) -> Self {
        Self {
            client: client.into(),
            server: server.into(),
        }
    }
}

impl ConfigManager {
    /// Add the same server to several clients.
    pub fn add_server_to_multiple_clients(
        &self,
        name: &str,
        entry: &ServerEntry,
        client_ids: &[String],
    ) -> Result<Vec<BatchResult>> {
        require_name(name)?;
        if client_ids.is_empty() {
            return Err(ConfigError::validation("At least one client id is required"));
        }

        let mut results = Vec::with_capacity(client_ids.len());
        for client_id in client_ids {
            let result = match self.add_server(client_id, name, entry.clone()) {
                Ok(()) => BatchResult::applied(client_id, Some(name)),
                Err(err) => {
                    tracing::warn!(client = %client_id, server = name, error = %err, "Failed to add server");
                    BatchResult::failed(client_id, Some(name), &err)
                }
            };
            results.push(self.named(result));
        }
        Ok(results)
    }

    /// Copy one server to every detected client other than the source.
    pub fn copy_server_to_all_clients(
        &self,
        from_client: &str,
        from_server: &str,
        to_server: Option<&str>,
    ) -> Result<Vec<BatchResult>> {
        let entry = self.effective_server(from_client, from_server)?;
        let target = to_server.unwrap_or(from_server);

        let mut results = Vec::new();
        for client in self.available_clients() {
            if client.id == from_client {
                continue;
            }
            let result = match self.add_server(&client.id, target, entry.clone()) {
                Ok(()) => BatchResult::applied(&client.id, Some(target)),
                Err(err) => {
                    tracing::warn!(client = %client.id, server = target, error = %err, "Failed to copy server");
                    BatchResult::failed(&client.id, Some(target), &err)
                }
            };
            results.push(result.with_client_name(&client.display_name));
        }
        Ok(results)
    }

    /// Rename a server in the global store and in every detected client.
    pub fn rename_server_across_clients(&self, old_name: &str, new_name: &str) -> Result<RenameReport> {
        require_name(new_name)?;
        if old_name == new_name {
            return Ok(RenameReport {
                unchanged: true,
                ..RenameReport::default()
            });
        }

        let global_renamed = self.global_store().rename(old_name, new_name)?;

        let mut results = Vec::new();
        for client in self.available_clients() {
            let result = match self.rename_in_client(client, old_name, new_name) {
                Ok(true) => BatchResult::applied(&client.id, Some(new_name)),
                Ok(false) => BatchResult::not_found(
                    &client.id,
                    Some(old_name),
                    "Server not found in client config.",
                ),
                Err(err) => {
                    tracing::warn!(client = %client.id, server = old_name, error = %err, "Failed to rename server");
                    BatchResult::failed(&client.id, Some(old_name), &err)
                }
            };
            results.push(result.with_client_name(&client.display_name));
        }

        Ok(RenameReport {
            unchanged: false,
            global_renamed,
            results,
        })
    }

    fn rename_in_client(
        &self,
        client: &ClientDescriptor,
        old_name: &str,
        new_name: &str,
    ) -> Result<bool> {
        let mut config = self.read_config(&client.id)?;
        let Some(entry) = config.servers.remove(old_name) else {
            return Ok(false);
        };
        config.servers.insert(new_name.to_string(), entry);
        self.persist_effective(&client.id, &config.servers)?;
        tracing::info!(client = %client.id, from = old_name, to = new_name, "Renamed server");
        Ok(true)
    }

    /// Remove a server from every detected client whose own file holds it.
    pub fn remove_server_from_all_clients(&self, name: &str) -> Result<Vec<BatchResult>> {
        require_name(name)?;
        let mut results = Vec::new();
        for client in self.available_clients() {
            let outcome = self.read_client_servers(&client.id).and_then(|own| {
                if own.contains_key(name) {
                    self.remove_server(&client.id, name).map(|()| true)
                } else {
                    Ok(false)
                }
            });
            let result = match outcome {
                Ok(true) => BatchResult::applied(&client.id, Some(name)),
                Ok(false) => BatchResult::not_found(
                    &client.id,
                    Some(name),
                    "Server not found in client config.",
                ),
                Err(err) => {
                    tracing::warn!(client = %client.id, server = name, error = %err, "Failed to remove server");
                    BatchResult::failed(&client.id, Some(name), &err)
                }
            };
            results.push(result.with_client_name(&client.display_name));
        }
        Ok(results)
    }

    /// Set (or, with `None`, delete) `key` in every server env that already
    /// contains it, across every registry client.
    ///
    /// Each client file is written at most once. Unreadable clients produce
    /// one failed result without a server name.
    pub fn update_environment_variable_across_configs(
        &self,
        key: &str,
        new_value: Option<&str>,
        targets: Option<&[EnvTarget]>,
    ) -> Result<Vec<BatchResult>> {
        self.env_update(key, new_value, targets, true)
    }

    /// Same results as [`Self::update_environment_variable_across_configs`]
    /// without writing anything.
    pub fn plan_env_update(
        &self,
        key: &str,
        new_value: Option<&str>,
        targets: Option<&[EnvTarget]>,
    ) -> Result<Vec<BatchResult>> {
        self.env_update(key, new_value, targets, false)
    }

    fn env_update(
        &self,
        key: &str,
        new_value: Option<&str>,
        targets: Option<&[EnvTarget]>,
        write: bool,
    ) -> Result<Vec<BatchResult>> {
        require_env_key(key)?;
        let is_target = |client: &str, server: &str| {
            targets.is_none_or(|targets| {
                targets
                    .iter()
                    .any(|t| t.client == client && t.server == server)
            })
        };

        let mut results = Vec::new();
        for client in self.config().registry().all() {
            let mut config = match self.read_config(&client.id) {
                Ok(config) => config,
                Err(err) => {
                    tracing::warn!(client = %client.id, error = %err, "Skipping unreadable client");
                    results.push(
                        BatchResult::failed(&client.id, None, &err)
                            .with_client_name(&client.display_name),
                    );
                    continue;
                }
            };

            let mut pending = Vec::new();
            for (server_name, entry) in config.servers.iter_mut() {
                if !entry.has_env(key) || !is_target(&client.id, server_name.as_str()) {
                    continue;
                }
                let old_value = entry.set_env(key, new_value);
                pending.push(
                    BatchResult::applied(&client.id, Some(server_name.as_str()))
                        .with_client_name(&client.display_name)
                        .with_values(old_value, new_value),
                );
            }

            if write && !pending.is_empty() {
                if let Err(err) = self.persist_effective(&client.id, &config.servers) {
                    tracing::warn!(client = %client.id, error = %err, "Failed to write env update");
                    pending = pending.into_iter().map(|r| r.into_failed(&err)).collect();
                } else {
                    tracing::info!(client = %client.id, key, servers = pending.len(), "Updated env across servers");
                }
            }
            results.extend(pending);
        }
        Ok(results)
    }

    fn named(&self, result: BatchResult) -> BatchResult {
        match self.config().registry().get(&result.client) {
            Some(client) => result.with_client_name(&client.display_name),
            None => result,
        }
    }
}
