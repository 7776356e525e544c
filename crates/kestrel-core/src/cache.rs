use crate::analysis::{Device, MetricsSnapshot};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    url: String,
    device: Device,
}

/// Session-local cache of computed snapshots keyed by (normalized URL,
/// device). Entries live until the process exits; a repeated analysis of
/// the same key within a session never re-issues the audit.
#[derive(Debug, Default)]
pub struct ResultCache {
    entries: HashMap<CacheKey, MetricsSnapshot>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, url: &str, device: Device) -> Option<MetricsSnapshot> {
        let key = CacheKey {
            url: url.to_string(),
            device,
        };
        self.entries.get(&key).cloned()
    }

    /// Insert a snapshot, silently replacing any entry under the same key
    pub fn put(&mut self, url: &str, device: Device, snapshot: MetricsSnapshot) {
        let key = CacheKey {
            url: url.to_string(),
            device,
        };
        self.entries.insert(key, snapshot);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
