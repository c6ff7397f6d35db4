//! TOML serializer for client configuration files.

use std::path::Path;

use serde_json::{Map, Value};

use super::{ConfigFormat, ConfigSerializer};
use crate::error::{ConfigError, Result};

/// TOML configuration file serializer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TomlSerializer;

impl ConfigSerializer for TomlSerializer {
    fn parse(&self, path: &Path, content: &str) -> Result<Map<String, Value>> {
        let toml_value: toml::Value =
            toml::from_str(content).map_err(|e| ConfigError::parse(path, e))?;
        match toml_value {
            toml::Value::Table(table) => Ok(table
                .into_iter()
                .map(|(key, value)| (key, toml_to_json_value(value)))
                .collect()),
            _ => Err(ConfigError::parse(path, "expected a TOML table at root")),
        }
    }

    fn render(&self, path: &Path, map: &Map<String, Value>) -> Result<String> {
        let mut table = toml::map::Map::new();
        for (key, value) in map {
            table.insert(key.clone(), json_to_toml_value(value)?);
        }
        toml::to_string_pretty(&toml::Value::Table(table)).map_err(|e| {
            ConfigError::validation(format!(
                "Failed to serialize TOML config {}: {e}",
                path.display()
            ))
        })
    }

    fn format(&self) -> ConfigFormat {
        ConfigFormat::Toml
    }
}

/// Key wrapping a TOML datetime in the JSON model so it renders back as a
/// datetime rather than a string. Matches the field name `toml` itself uses
/// when serializing `Datetime`.
const DATETIME_KEY: &str = "$__toml_private_datetime";

fn toml_to_json_value(toml_value: toml::Value) -> Value {
    match toml_value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => {
            // serde_json::Number doesn't support NaN/Infinity, fall back to string
            serde_json::Number::from_f64(f)
                .map(Value::Number)
                .unwrap_or_else(|| Value::String(f.to_string()))
        }
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => {
            let mut tagged = Map::new();
            tagged.insert(DATETIME_KEY.to_string(), Value::String(dt.to_string()));
            Value::Object(tagged)
        }
        toml::Value::Array(arr) => Value::Array(arr.into_iter().map(toml_to_json_value).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(key, value)| (key, toml_to_json_value(value)))
                .collect(),
        ),
    }
}

fn json_to_toml_value(json_value: &Value) -> Result<toml::Value> {
    match json_value {
        // TOML has no null
        Value::Null => Err(ConfigError::validation(
            "TOML cannot represent null values",
        )),
        Value::Bool(b) => Ok(toml::Value::Boolean(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(toml::Value::Integer(i))
            } else if let Some(f) = n.as_f64() {
                Ok(toml::Value::Float(f))
            } else {
                Err(ConfigError::validation(format!("Unsupported number: {n}")))
            }
        }
        Value::String(s) => Ok(toml::Value::String(s.clone())),
        Value::Array(arr) => arr
            .iter()
            .map(json_to_toml_value)
            .collect::<Result<Vec<_>>>()
            .map(toml::Value::Array),
        Value::Object(obj) => {
            if let Some(datetime) = tagged_datetime(obj)? {
                return Ok(toml::Value::Datetime(datetime));
            }
            let mut table = toml::map::Map::new();
            for (key, value) in obj {
                table.insert(key.clone(), json_to_toml_value(value)?);
            }
            Ok(toml::Value::Table(table))
        }
    }
}

fn tagged_datetime(obj: &Map<String, Value>) -> Result<Option<toml::value::Datetime>> {
    match (obj.len(), obj.get(DATETIME_KEY)) {
        (1, Some(Value::String(raw))) => raw
            .parse()
            .map(Some)
            .map_err(|e| ConfigError::validation(format!("Invalid TOML datetime {raw}: {e}"))),
        _ => Ok(None),
    }
}
