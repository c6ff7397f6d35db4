//! Client detection: which registry entries have a config file on disk.

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use super::{ClientDescriptor, ClientRegistry};

/// Memoised detector.
///
/// The first call to [`ClientDetector::detected`] probes the filesystem;
/// later calls return the cached ids until [`ClientDetector::invalidate`] or
/// [`ClientDetector::redetect`] is called. Clients installed or removed in the
/// meantime are not noticed.
#[derive(Debug, Default)]
pub struct ClientDetector {
    cache: Mutex<Option<Vec<String>>>,
}

impl ClientDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids of detected clients, in registry order.
    pub fn detected<F>(&self, registry: &ClientRegistry, resolve: F) -> Vec<String>
    where
        F: Fn(&ClientDescriptor) -> PathBuf,
    {
        let mut cache = self.lock();
        if let Some(ids) = cache.as_ref() {
            return ids.clone();
        }
        let ids = probe(registry, resolve);
        *cache = Some(ids.clone());
        ids
    }

    /// Probe again and replace the cached result.
    pub fn redetect<F>(&self, registry: &ClientRegistry, resolve: F) -> Vec<String>
    where
        F: Fn(&ClientDescriptor) -> PathBuf,
    {
        let ids = probe(registry, resolve);
        *self.lock() = Some(ids.clone());
        ids
    }

    /// Drop the cached result; the next query probes again.
    pub fn invalidate(&self) {
        *self.lock() = None;
    }

    pub fn is_cached(&self) -> bool {
        self.lock().is_some()
    }

    fn lock(&self) -> MutexGuard<'_, Option<Vec<String>>> {
        // The cache holds plain data; a panic elsewhere cannot leave it torn
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn probe<F>(registry: &ClientRegistry, resolve: F) -> Vec<String>
where
    F: Fn(&ClientDescriptor) -> PathBuf,
{
    let ids: Vec<String> = registry
        .all()
        .iter()
        .filter(|client| {
            let path = resolve(*client);
            let found = path.try_exists().unwrap_or(false);
            tracing::debug!(client = %client.id, path = %path.display(), found, "Probed client config");
            found
        })
        .map(|client| client.id.clone())
        .collect();
    tracing::debug!(count = ids.len(), "Detected clients");
    ids
}
