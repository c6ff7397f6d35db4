//! On-disk serializers for client configuration files.
//!
//! Both formats load into `serde_json::Map<String, Value>` so the format
//! normalizer only ever deals with one document shape.

mod json;
mod toml;

use std::io::ErrorKind;
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{ConfigError, Result};
use crate::types::FormatTag;

pub use json::JsonSerializer;
pub use toml::TomlSerializer;

/// Document syntax of a configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl From<FormatTag> for ConfigFormat {
    fn from(tag: FormatTag) -> Self {
        match tag {
            FormatTag::TomlMcpServers => ConfigFormat::Toml,
            // Every other tag, unknown included, is JSON-based
            FormatTag::McpServers | FormatTag::NestedMcpServers | FormatTag::Unknown => {
                ConfigFormat::Json
            }
        }
    }
}

/// Reads and writes one document syntax.
pub trait ConfigSerializer: Send + Sync {
    /// Parse a document body into a JSON-compatible map.
    fn parse(&self, path: &Path, content: &str) -> Result<Map<String, Value>>;

    /// Render a JSON-compatible map as a document body.
    fn render(&self, path: &Path, map: &Map<String, Value>) -> Result<String>;

    fn format(&self) -> ConfigFormat;

    /// Load a file. Returns `Ok(None)` when the file does not exist.
    fn load(&self, path: &Path) -> Result<Option<Map<String, Value>>> {
        match read_optional(path)? {
            Some(content) => self.parse(path, &content).map(Some),
            None => Ok(None),
        }
    }

    /// Replace the file's contents, creating parent directories as needed.
    fn save(&self, path: &Path, map: &Map<String, Value>) -> Result<()> {
        let content = self.render(path, map)?;
        write_file(path, &content)
    }
}

pub fn serializer_for_format(format: ConfigFormat) -> Box<dyn ConfigSerializer> {
    match format {
        ConfigFormat::Json => Box::new(JsonSerializer),
        ConfigFormat::Toml => Box::new(TomlSerializer),
    }
}

/// Read a UTF-8 file, mapping "does not exist" to `None`.
pub fn read_optional(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            tracing::debug!(path = %path.display(), "Read config file");
            Ok(Some(content))
        }
        Err(err) if err.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "Config file absent");
            Ok(None)
        }
        Err(err) => Err(ConfigError::io("Failed to read config file", path, err)),
    }
}

/// Overwrite `path` with `content`, creating parent directories first.
pub fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .map_err(|e| ConfigError::io("Failed to create config directory", parent, e))?;
    }
    std::fs::write(path, content)
        .map_err(|e| ConfigError::io("Failed to write config file", path, e))?;
    tracing::debug!(path = %path.display(), bytes = content.len(), "Wrote config file");
    Ok(())
}
