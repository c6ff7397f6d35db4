#![allow(dead_code)]

use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::TempDir;

use mcpconf_core::client::{ClientDescriptor, ClientRegistry};
use mcpconf_core::types::{FormatTag, PathTemplate};
use mcpconf_core::{ConfigManager, EngineConfig, WritePolicy};

/// Isolated engine over a temp directory.
///
/// Client `<id>` lives at `<temp>/clients/<id>.json` (`.toml` for TOML
/// clients); the global store at `<temp>/global.json`.
pub struct Sandbox {
    pub temp: TempDir,
    pub manager: ConfigManager,
}

impl Sandbox {
    pub fn new(clients: &[(&str, FormatTag)]) -> Self {
        Self::with_policy(clients, WritePolicy::Delta)
    }

    pub fn with_policy(clients: &[(&str, FormatTag)], policy: WritePolicy) -> Self {
        let temp = TempDir::new().expect("create temp dir");
        let registry = ClientRegistry::from_clients(clients.iter().map(|(id, format)| {
            ClientDescriptor::new(
                *id,
                display_name(id),
                PathTemplate::uniform(client_file(temp.path(), id, *format).to_string_lossy()),
                *format,
            )
        }))
        .expect("valid registry");

        let home = temp.path().join("home");
        let project = temp.path().join("project");
        let config = EngineConfig::new(registry, temp.path().join("global.json"), home, project)
            .with_write_policy(policy);

        Self {
            temp,
            manager: ConfigManager::new(config),
        }
    }

    pub fn client_path(&self, id: &str) -> PathBuf {
        self.manager.config_path(id).expect("registered client")
    }

    pub fn global_path(&self) -> PathBuf {
        self.temp.path().join("global.json")
    }

    pub fn write_client(&self, id: &str, body: &Value) {
        write_json(&self.client_path(id), body);
    }

    pub fn write_client_raw(&self, id: &str, content: &str) {
        let path = self.client_path(id);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    pub fn read_client(&self, id: &str) -> Value {
        read_json(&self.client_path(id))
    }

    pub fn write_global(&self, body: &Value) {
        write_json(&self.global_path(), body);
    }

    pub fn read_global(&self) -> Value {
        read_json(&self.global_path())
    }
}

pub fn display_name(id: &str) -> String {
    format!("Client {id}")
}

fn client_file(root: &Path, id: &str, format: FormatTag) -> PathBuf {
    let ext = match format {
        FormatTag::TomlMcpServers => "toml",
        _ => "json",
    };
    root.join("clients").join(format!("{id}.{ext}"))
}

pub fn write_json(path: &Path, body: &Value) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, serde_json::to_vec_pretty(body).unwrap()).unwrap();
}

pub fn read_json(path: &Path) -> Value {
    serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap()
}

pub fn entry(value: Value) -> mcpconf_core::config::ServerEntry {
    serde_json::from_value(value).expect("valid server entry")
}
