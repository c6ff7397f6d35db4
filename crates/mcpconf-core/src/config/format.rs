//! Format normalizer/denormalizer.
//!
//! Converts a parsed client document to and from the canonical
//! [`ServerMap`], touching only the servers location declared by the
//! client's [`FormatTag`]. Sibling keys at every level are preserved.

use serde_json::{Map, Value};

use super::server::{ServerMap, servers_from_map, servers_to_map};
use crate::error::{ConfigError, Result};
use crate::types::FormatTag;

/// Extract the servers map from a parsed document.
///
/// Unknown tags and documents without the servers location yield an empty
/// map. A servers location holding something other than an object of server
/// objects is reported as `Err` with a description of the problem.
pub fn normalize(body: &Map<String, Value>, tag: FormatTag) -> std::result::Result<ServerMap, String> {
    let Some(path) = tag.servers_path() else {
        return Ok(ServerMap::new());
    };
    match extract_map_at_path(body, path)? {
        Some(map) => servers_from_map(map),
        None => Ok(ServerMap::new()),
    }
}

/// Write `servers` into a copy of `original` at the tag's servers location.
///
/// With no original document the result holds only the servers location.
/// Unknown tags return the original document unchanged.
pub fn denormalize(
    servers: &ServerMap,
    tag: FormatTag,
    original: Option<&Map<String, Value>>,
) -> Result<Map<String, Value>> {
    let mut body = original.cloned().unwrap_or_default();
    let Some(path) = tag.servers_path() else {
        return Ok(body);
    };
    set_map_at_path(&mut body, path, servers_to_map(servers)?)?;
    Ok(body)
}

/// Walk `path` and return the object found at its end, if any.
fn extract_map_at_path<'a>(
    root: &'a Map<String, Value>,
    path: &[&str],
) -> std::result::Result<Option<&'a Map<String, Value>>, String> {
    let mut current = root;
    for (idx, segment) in path.iter().enumerate() {
        let value = match current.get(*segment) {
            Some(Value::Null) | None => return Ok(None),
            Some(value) => value,
        };
        match value {
            Value::Object(map) if idx == path.len() - 1 => return Ok(Some(map)),
            Value::Object(map) => current = map,
            _ => return Err(format!("expected '{}' to be an object", path[..=idx].join("."))),
        }
    }
    Ok(None)
}

/// Set a map at a nested path, creating intermediate objects as needed.
fn set_map_at_path(
    root: &mut Map<String, Value>,
    path: &[&str],
    map: Map<String, Value>,
) -> Result<()> {
    let Some((last, parents)) = path.split_last() else {
        return Err(ConfigError::validation("servers path cannot be empty"));
    };
    let mut current = root;
    for (idx, segment) in parents.iter().enumerate() {
        let next = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if next.is_null() {
            *next = Value::Object(Map::new());
        }
        match next {
            Value::Object(inner) => current = inner,
            _ => {
                return Err(ConfigError::validation(format!(
                    "cannot write servers: '{}' is not an object",
                    path[..=idx].join(".")
                )));
            }
        }
    }
    current.insert(last.to_string(), Value::Object(map));
    Ok(())
}
