//! Overlay of client-specific servers onto the global store, and the
//! inverse delta used when persisting an effective view.

use super::server::ServerMap;

/// Compute `global ⊕ client`.
///
/// Starts from a copy of the global store; each client entry is overlaid
/// field by field onto the global entry of the same name, or inserted when
/// there is none.
pub fn overlay_servers(global: &ServerMap, client: &ServerMap) -> ServerMap {
    let mut merged = global.clone();
    for (name, entry) in client {
        merged
            .entry(name.clone())
            .and_modify(|existing| existing.overlay(entry))
            .or_insert_with(|| entry.clone());
    }
    merged
}

/// Entries to persist in a client's file for an `effective` view, given the
/// entries the file holds now (`own`).
///
/// Per name: an entry whose effective value still equals `global ⊕ own`
/// keeps its on-disk shape; an entry the file never held is dropped when it
/// equals the global one; anything else is persisted as the effective entry.
/// Names missing from `effective` are dropped.
pub fn delta_against_global(
    effective: &ServerMap,
    global: &ServerMap,
    own: &ServerMap,
) -> ServerMap {
    let mut delta = ServerMap::new();
    for (name, entry) in effective {
        match own.get(name) {
            Some(stored) => {
                let unchanged = match global.get(name) {
                    Some(base) => {
                        let mut merged = base.clone();
                        merged.overlay(stored);
                        merged == *entry
                    }
                    None => stored == entry,
                };
                let keep = if unchanged { stored } else { entry };
                delta.insert(name.clone(), keep.clone());
            }
            None if global.get(name) == Some(entry) => {}
            None => {
                delta.insert(name.clone(), entry.clone());
            }
        }
    }
    delta
}
