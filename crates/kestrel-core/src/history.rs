use crate::Result;
use crate::analysis::MetricsSnapshot;
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

/// Fixed key the analysis history is stored under
pub const HISTORY_KEY: &str = "kestrel.history";

/// Fixed key the set of implemented opportunity ids is stored under
pub const IMPLEMENTED_KEY: &str = "kestrel.implemented-opportunities";

/// Number of history entries retained by default
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// Minimal key-value persistence the history layer delegates to. Values
/// are JSON strings under fixed keys.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Store backed by a single JSON object file
pub struct JsonFileStore {
    path: PathBuf,
    values: HashMap<String, String>,
}

impl JsonFileStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = if path.exists() {
            let content = fs::read_to_string(&path)?;
            match serde_json::from_str(&content) {
                Ok(values) => values,
                Err(err) => {
                    tracing::warn!("Ignoring unreadable store at {}: {}", path.display(), err);
                    HashMap::new()
                }
            }
        } else {
            HashMap::new()
        };

        Ok(Self { path, values })
    }

    /// Open the store inside the given directory, creating it as needed
    pub fn open_in(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        Self::open(dir.join("store.json"))
    }

    /// Open the store in the platform data directory
    pub fn open_default() -> Result<Self> {
        let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::open_in(&base.join("kestrel"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        let content = serde_json::to_string_pretty(&self.values)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

/// In-memory store for tests and ephemeral sessions
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Bounded, most-recent-first sequence of past snapshots. Persistence is
/// delegated to the key-value store; a store that fails to persist is
/// logged and never fails the analysis flow.
pub struct HistoryStore<S: KeyValueStore> {
    store: S,
    capacity: usize,
    entries: Vec<MetricsSnapshot>,
}

impl<S: KeyValueStore> HistoryStore<S> {
    pub fn load(store: S) -> Self {
        Self::with_capacity(store, DEFAULT_HISTORY_CAPACITY)
    }

    pub fn with_capacity(store: S, capacity: usize) -> Self {
        let entries = match store.get(HISTORY_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<MetricsSnapshot>>(&raw) {
                Ok(mut entries) => {
                    entries.truncate(capacity);
                    entries
                }
                Err(err) => {
                    tracing::warn!("Ignoring unreadable history: {}", err);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(err) => {
                tracing::warn!("Failed to load history: {}", err);
                Vec::new()
            }
        };

        Self {
            store,
            capacity,
            entries,
        }
    }

    /// Prepend a snapshot, evicting the oldest entries past capacity
    pub fn append(&mut self, snapshot: MetricsSnapshot) {
        self.entries.insert(0, snapshot);
        self.entries.truncate(self.capacity);
        self.persist();
    }

    /// Prepend a desktop/mobile pair from one combined run, trimming the
    /// prior entries to capacity - 2 to make room
    pub fn append_pair(&mut self, primary: MetricsSnapshot, secondary: MetricsSnapshot) {
        self.entries.truncate(self.capacity.saturating_sub(2));
        self.entries.insert(0, secondary);
        self.entries.insert(0, primary);
        self.persist();
    }

    /// All retained entries, most recent first
    pub fn load_all(&self) -> &[MetricsSnapshot] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn persist(&mut self) {
        let serialized = match serde_json::to_string(&self.entries) {
            Ok(serialized) => serialized,
            Err(err) => {
                tracing::warn!("Failed to serialize history: {}", err);
                return;
            }
        };
        if let Err(err) = self.store.set(HISTORY_KEY, &serialized) {
            tracing::warn!("Failed to persist history: {}", err);
        }
    }
}

/// Persisted set of opportunity audit ids the user has marked as done
pub struct ImplementedOpportunities<S: KeyValueStore> {
    store: S,
    ids: BTreeSet<String>,
}

impl<S: KeyValueStore> ImplementedOpportunities<S> {
    pub fn load(store: S) -> Self {
        let ids = match store.get(IMPLEMENTED_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                tracing::warn!("Ignoring unreadable implemented-opportunity set: {}", err);
                BTreeSet::new()
            }),
            Ok(None) => BTreeSet::new(),
            Err(err) => {
                tracing::warn!("Failed to load implemented-opportunity set: {}", err);
                BTreeSet::new()
            }
        };

        Self { store, ids }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    /// Returns false when the id was already marked
    pub fn mark(&mut self, id: &str) -> Result<bool> {
        let added = self.ids.insert(id.to_string());
        if added {
            self.persist()?;
        }
        Ok(added)
    }

    /// Returns false when the id was not marked
    pub fn unmark(&mut self, id: &str) -> Result<bool> {
        let removed = self.ids.remove(id);
        if removed {
            self.persist()?;
        }
        Ok(removed)
    }

    fn persist(&mut self) -> Result<()> {
        let serialized = serde_json::to_string(&self.ids)?;
        self.store.set(IMPLEMENTED_KEY, &serialized)
    }
}
