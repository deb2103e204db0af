use super::json_store::{JsonStore, Storable};
use super::PersistenceError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;

/// Raw text of an imported collection, kept so it can be re-parsed on
/// the next start.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredCollection {
    pub name: String,
    pub text: String,
    /// Whether duplicate suppression was on when it was imported
    #[serde(default)]
    pub dedup: bool,
    pub saved_at: u64,
}

impl Storable for StoredCollection {
    fn id(&self) -> &str {
        &self.name
    }
}

/// Durable key-value storage for collection text, keyed by collection name.
pub trait KeyValueStore: Send + Sync {
    /// Insert or replace the record stored under `key`.
    fn put(&self, key: &str, value: &StoredCollection) -> Result<(), PersistenceError>;
    fn get_all(&self) -> Result<Vec<StoredCollection>, PersistenceError>;
    fn delete(&self, key: &str) -> Result<(), PersistenceError>;
}

/// One JSON file per collection under a directory.
pub struct JsonKvStore {
    inner: JsonStore<StoredCollection>,
}

impl JsonKvStore {
    /// Create a store rooted at `<data_dir>/collections`.
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            inner: JsonStore::new(data_dir.join("collections")),
        }
    }
}

impl KeyValueStore for JsonKvStore {
    fn put(&self, key: &str, value: &StoredCollection) -> Result<(), PersistenceError> {
        if value.name == key {
            self.inner.save(value)?;
        } else {
            let mut keyed = value.clone();
            keyed.name = key.to_string();
            self.inner.save(&keyed)?;
        }
        Ok(())
    }

    fn get_all(&self) -> Result<Vec<StoredCollection>, PersistenceError> {
        self.inner.load_all()
    }

    fn delete(&self, key: &str) -> Result<(), PersistenceError> {
        self.inner.delete(key)
    }
}

/// Non-durable store, for tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryKvStore {
    entries: Mutex<BTreeMap<String, StoredCollection>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, StoredCollection>> {
        // A poisoned map is still a valid map
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl KeyValueStore for MemoryKvStore {
    fn put(&self, key: &str, value: &StoredCollection) -> Result<(), PersistenceError> {
        let mut keyed = value.clone();
        keyed.name = key.to_string();
        self.lock().insert(key.to_string(), keyed);
        Ok(())
    }

    fn get_all(&self) -> Result<Vec<StoredCollection>, PersistenceError> {
        Ok(self.lock().values().cloned().collect())
    }

    fn delete(&self, key: &str) -> Result<(), PersistenceError> {
        self.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, text: &str, saved_at: u64) -> StoredCollection {
        StoredCollection {
            name: name.into(),
            text: text.into(),
            dedup: false,
            saved_at,
        }
    }

    fn exercise(store: &dyn KeyValueStore) {
        store.put("Club Games", &record("Club Games", "[Event \"a\"]", 1)).unwrap();
        store.put("Club Games", &record("Club Games", "[Event \"b\"]", 2)).unwrap();
        store.put("Tal/Botvinnik 1960", &record("ignored", "[Event \"c\"]", 3)).unwrap();

        let mut all = store.get_all().unwrap();
        all.sort_by_key(|r| r.saved_at);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].text, "[Event \"b\"]");
        assert_eq!(all[1].name, "Tal/Botvinnik 1960");

        store.delete("Club Games").unwrap();
        assert_eq!(store.get_all().unwrap().len(), 1);
    }

    #[test]
    fn test_json_kv_store() {
        let dir = tempfile::tempdir().unwrap();
        exercise(&JsonKvStore::new(dir.path().to_path_buf()));
    }

    #[test]
    fn test_memory_kv_store() {
        exercise(&MemoryKvStore::new());
    }

    #[test]
    fn test_json_kv_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        JsonKvStore::new(dir.path().to_path_buf())
            .put("Keep", &record("Keep", "text", 5))
            .unwrap();

        let reopened = JsonKvStore::new(dir.path().to_path_buf());
        assert_eq!(reopened.get_all().unwrap(), vec![record("Keep", "text", 5)]);
    }

    #[test]
    fn test_long_name_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let name = "Ü".repeat(200);
        JsonKvStore::new(dir.path().to_path_buf())
            .put(&name, &record(&name, "text", 5))
            .unwrap();

        let reopened = JsonKvStore::new(dir.path().to_path_buf());
        assert_eq!(reopened.get_all().unwrap(), vec![record(&name, "text", 5)]);
        reopened.delete(&name).unwrap();
        assert!(reopened.get_all().unwrap().is_empty());
    }

    #[test]
    fn test_missing_dedup_flag_defaults_false() {
        let parsed: StoredCollection =
            serde_json::from_str(r#"{"name":"x","text":"y","saved_at":0}"#).unwrap();
        assert!(!parsed.dedup);
    }
}
