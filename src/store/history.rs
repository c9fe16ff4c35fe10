//! Bounded history log
//!
//! A newest-first list of records capped at a fixed capacity and persisted
//! to the key-value store after every change.

use std::sync::Arc;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::kv::{load_state, save_state, KeyValueStore};
use super::StoreResult;

/// Default number of entries kept per log
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// One immutable history record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry<T> {
    pub id: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    pub record: T,
}

#[derive(Deserialize)]
struct HistoryState<T> {
    history: Vec<HistoryEntry<T>>,
}

#[derive(Serialize)]
struct HistoryStateRef<'a, T> {
    history: &'a [HistoryEntry<T>],
}

pub struct HistoryLog<T> {
    key: String,
    capacity: usize,
    entries: Vec<HistoryEntry<T>>,
    storage: Arc<dyn KeyValueStore>,
}

impl<T> HistoryLog<T>
where
    T: Clone + Serialize + DeserializeOwned,
{
    /// Open the log stored under `key`, restoring any persisted entries
    pub fn open(storage: Arc<dyn KeyValueStore>, key: impl Into<String>, capacity: usize) -> StoreResult<Self> {
        let key = key.into();
        let capacity = capacity.max(1);

        let mut entries = load_state::<HistoryState<T>>(storage.as_ref(), &key)?
            .map(|state| state.history)
            .unwrap_or_default();
        entries.truncate(capacity);

        tracing::debug!("Opened history '{}' with {} entries", key, entries.len());

        Ok(Self {
            key,
            capacity,
            entries,
            storage,
        })
    }

    /// Record a new entry stamped with a fresh id and the current time
    pub fn add(&mut self, record: T) -> StoreResult<HistoryEntry<T>> {
        self.add_with_timestamp(record, Utc::now().timestamp_millis())
    }

    /// Record a new entry with an explicit timestamp
    pub fn add_with_timestamp(&mut self, record: T, timestamp: i64) -> StoreResult<HistoryEntry<T>> {
        let entry = HistoryEntry {
            id: Uuid::new_v4().to_string(),
            timestamp,
            record,
        };

        let mut next = Vec::with_capacity(self.capacity);
        next.push(entry.clone());
        next.extend(self.entries.iter().take(self.capacity - 1).cloned());

        self.persist(&next)?;
        self.entries = next;
        Ok(entry)
    }

    /// Remove every entry
    pub fn clear(&mut self) -> StoreResult<()> {
        self.persist(&[])?;
        self.entries.clear();
        Ok(())
    }

    pub fn get_by_id(&self, id: &str) -> Option<&HistoryEntry<T>> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Entries, newest first
    pub fn entries(&self) -> &[HistoryEntry<T>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn persist(&self, entries: &[HistoryEntry<T>]) -> StoreResult<()> {
        save_state(self.storage.as_ref(), &self.key, &HistoryStateRef { history: entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::kv::MemoryStore;
    use crate::store::StoreError;

    fn open_log(storage: &Arc<MemoryStore>) -> HistoryLog<String> {
        HistoryLog::open(storage.clone(), "test-storage", DEFAULT_HISTORY_CAPACITY).unwrap()
    }

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> StoreResult<Option<String>> {
            Ok(None)
        }

        fn set(&self, _key: &str, _value: &str) -> StoreResult<()> {
            Err(StoreError::Poisoned("failing store"))
        }
    }

    #[test]
    fn test_add_prepends() {
        let storage = Arc::new(MemoryStore::new());
        let mut log = open_log(&storage);
        log.add("first".to_string()).unwrap();
        log.add("second".to_string()).unwrap();

        let records: Vec<_> = log.entries().iter().map(|e| e.record.as_str()).collect();
        assert_eq!(records, vec!["second", "first"]);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let storage = Arc::new(MemoryStore::new());
        let mut log = open_log(&storage);
        let mut first_id = String::new();
        for i in 1..=51 {
            let entry = log.add(format!("meal {}", i)).unwrap();
            if i == 1 {
                first_id = entry.id;
            }
        }

        assert_eq!(log.len(), 50);
        assert_eq!(log.entries()[0].record, "meal 51");
        assert_eq!(log.entries()[49].record, "meal 2");
        assert!(log.get_by_id(&first_id).is_none());
    }

    #[test]
    fn test_ids_are_unique() {
        let storage = Arc::new(MemoryStore::new());
        let mut log = open_log(&storage);
        let a = log.add("a".to_string()).unwrap();
        let b = log.add("a".to_string()).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(log.get_by_id(&a.id).unwrap().record, "a");
    }

    #[test]
    fn test_clear_forgets_every_id() {
        let storage = Arc::new(MemoryStore::new());
        let mut log = open_log(&storage);
        let ids: Vec<String> = (0..5)
            .map(|i| log.add(i.to_string()).unwrap().id)
            .collect();

        log.clear().unwrap();
        assert!(log.is_empty());
        for id in &ids {
            assert!(log.get_by_id(id).is_none());
        }

        let reopened = open_log(&storage);
        assert!(reopened.is_empty());
    }

    #[test]
    fn test_entries_survive_reopen() {
        let storage = Arc::new(MemoryStore::new());
        let mut log = open_log(&storage);
        let entry = log.add_with_timestamp("pasta".to_string(), 1_700_000_000_000).unwrap();
        log.add("salad".to_string()).unwrap();

        let reopened = open_log(&storage);
        assert_eq!(reopened.len(), 2);
        assert_eq!(reopened.entries()[1], entry);
        assert_eq!(reopened.entries()[0].record, "salad");
    }

    #[test]
    fn test_snapshot_shape() {
        let storage = Arc::new(MemoryStore::new());
        let mut log = open_log(&storage);
        log.add_with_timestamp("rice".to_string(), 42).unwrap();

        let raw = storage.get("test-storage").unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["version"], 0);
        assert_eq!(value["state"]["history"][0]["record"], "rice");
        assert_eq!(value["state"]["history"][0]["timestamp"], 42);
    }

    #[test]
    fn test_reopen_truncates_to_capacity() {
        let storage = Arc::new(MemoryStore::new());
        let mut log = open_log(&storage);
        for i in 0..10 {
            log.add(i.to_string()).unwrap();
        }

        let small: HistoryLog<String> = HistoryLog::open(storage.clone(), "test-storage", 3).unwrap();
        assert_eq!(small.len(), 3);
        assert_eq!(small.entries()[0].record, "9");
    }

    #[test]
    fn test_corrupt_snapshot_starts_empty() {
        let storage = Arc::new(MemoryStore::new());
        storage.set("test-storage", "{\"state\": 17}").unwrap();
        let log = open_log(&storage);
        assert!(log.is_empty());
    }

    #[test]
    fn test_failed_write_leaves_log_unchanged() {
        let mut log: HistoryLog<String> =
            HistoryLog::open(Arc::new(FailingStore), "test-storage", 5).unwrap();
        assert!(log.add("lost".to_string()).is_err());
        assert!(log.is_empty());
    }
}
