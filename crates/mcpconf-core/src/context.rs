//! Engine configuration, passed explicitly into [`crate::ConfigManager`].
//!
//! Nothing here is process-global: tests build isolated instances with
//! their own registry, global store path and directory roots.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::client::{ClientDescriptor, ClientRegistry};
use crate::error::{ConfigError, Result};
use crate::types::{PathRoots, Platform};

/// Environment variable overriding the global store path.
pub const GLOBAL_STORE_ENV: &str = "MCPCONF_GLOBAL_SERVERS";
/// Environment variable naming a TOML client registry file.
pub const REGISTRY_ENV: &str = "MCPCONF_REGISTRY";
/// File name of the global store inside the home directory.
pub const GLOBAL_STORE_FILE: &str = ".mcp-global-servers.json";

/// How read-modify-write helpers persist an effective servers map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WritePolicy {
    /// Persist only entries that differ from the global store.
    #[default]
    Delta,
    /// Persist the whole effective map, copying global entries into the
    /// client file.
    Materialize,
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    registry: ClientRegistry,
    global_store_path: PathBuf,
    home_dir: PathBuf,
    appdata_dir: PathBuf,
    project_root: PathBuf,
    platform: Platform,
    write_policy: WritePolicy,
}

impl EngineConfig {
    /// Create a configuration with explicit paths for the current platform.
    pub fn new(
        registry: ClientRegistry,
        global_store_path: PathBuf,
        home_dir: PathBuf,
        project_root: PathBuf,
    ) -> Self {
        let appdata_dir = dirs::config_dir().unwrap_or_else(|| home_dir.join(".config"));
        Self {
            registry,
            global_store_path,
            home_dir,
            appdata_dir,
            project_root,
            platform: Platform::current(),
            write_policy: WritePolicy::default(),
        }
    }

    /// Build from the user's environment.
    ///
    /// Reads [`REGISTRY_ENV`] and [`GLOBAL_STORE_ENV`] when set.
    pub fn from_env() -> Result<Self> {
        let registry_path = std::env::var_os(REGISTRY_ENV).map(PathBuf::from);
        let global_store = std::env::var_os(GLOBAL_STORE_ENV).map(PathBuf::from);
        Self::discover(registry_path.as_deref(), global_store)
    }

    /// Build from the user's home and current directory, with optional
    /// registry file and global store overrides.
    pub fn discover(registry_path: Option<&Path>, global_store: Option<PathBuf>) -> Result<Self> {
        let home_dir = dirs::home_dir()
            .ok_or_else(|| ConfigError::validation("Could not determine home directory"))?;
        let project_root = std::env::current_dir()
            .map_err(|e| ConfigError::io("Failed to read current directory", Path::new("."), e))?;
        let registry = match registry_path {
            Some(path) => ClientRegistry::load(path)?,
            None => ClientRegistry::with_default_clients(),
        };
        let global_store_path = global_store.unwrap_or_else(|| home_dir.join(GLOBAL_STORE_FILE));

        tracing::debug!(
            global_store = %global_store_path.display(),
            project_root = %project_root.display(),
            clients = registry.all().len(),
            "Resolved engine configuration"
        );

        Ok(Self::new(registry, global_store_path, home_dir, project_root))
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_write_policy(mut self, write_policy: WritePolicy) -> Self {
        self.write_policy = write_policy;
        self
    }

    pub fn with_appdata_dir(mut self, appdata_dir: PathBuf) -> Self {
        self.appdata_dir = appdata_dir;
        self
    }

    pub fn registry(&self) -> &ClientRegistry {
        &self.registry
    }

    pub fn global_store_path(&self) -> &Path {
        &self.global_store_path
    }

    pub fn home_dir(&self) -> &Path {
        &self.home_dir
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn write_policy(&self) -> WritePolicy {
        self.write_policy
    }

    /// Concrete config file path of `client` on the configured platform.
    pub fn client_path(&self, client: &ClientDescriptor) -> PathBuf {
        client.path_template.resolve(
            self.platform,
            &PathRoots {
                home: &self.home_dir,
                appdata: &self.appdata_dir,
                project_root: &self.project_root,
            },
        )
    }
}
