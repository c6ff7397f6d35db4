//! JSON serializer for client configuration files.

use std::path::Path;

use serde_json::{Map, Value};

use super::{ConfigFormat, ConfigSerializer};
use crate::error::{ConfigError, Result};

/// JSON configuration file serializer.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonSerializer;

impl ConfigSerializer for JsonSerializer {
    fn parse(&self, path: &Path, content: &str) -> Result<Map<String, Value>> {
        let value: Value =
            serde_json::from_str(content).map_err(|e| ConfigError::parse(path, e))?;
        match value {
            Value::Object(map) => Ok(map),
            _ => Err(ConfigError::parse(path, "expected a JSON object at root")),
        }
    }

    fn render(&self, path: &Path, map: &Map<String, Value>) -> Result<String> {
        serde_json::to_string_pretty(map).map_err(|e| {
            ConfigError::validation(format!(
                "Failed to serialize JSON config {}: {e}",
                path.display()
            ))
        })
    }

    fn format(&self) -> ConfigFormat {
        ConfigFormat::Json
    }
}
