//! Key-value persistence
//!
//! Each store writes its whole state as one JSON snapshot under its own key.

use std::collections::HashMap;
use std::sync::Mutex;

use rusqlite::params;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{StoreError, StoreResult};
use crate::db::Database;

/// Snapshot format version written alongside the state
pub const SNAPSHOT_VERSION: u32 = 0;

/// Durable string storage keyed by store name
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
}

impl KeyValueStore for Database {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let value = self.with_conn(|conn| {
            let result = conn.query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                [key],
                |row| row.get::<_, String>(0),
            );
            match result {
                Ok(value) => Ok(Some(value)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.with_conn(|conn| {
            conn.execute(
                r#"
                INSERT INTO kv_store (key, value, updated_at)
                VALUES (?1, ?2, datetime('now'))
                ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at
                "#,
                params![key, value],
            )?;
            Ok(())
        })?;
        Ok(())
    }
}

/// In-process storage, used when nothing needs to survive a restart
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let values = self.values.lock().map_err(|_| StoreError::Poisoned("memory store"))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut values = self.values.lock().map_err(|_| StoreError::Poisoned("memory store"))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Envelope around a persisted store state
#[derive(Debug, Serialize, Deserialize)]
pub struct Snapshot<S> {
    pub state: S,
    pub version: u32,
}

/// Write `state` under `key`
pub fn save_state<S: Serialize>(storage: &dyn KeyValueStore, key: &str, state: &S) -> StoreResult<()> {
    let json = serde_json::to_string(&Snapshot {
        state,
        version: SNAPSHOT_VERSION,
    })?;
    storage.set(key, &json)
}

/// Read the state under `key`.
///
/// A snapshot that no longer decodes is logged and treated as absent.
pub fn load_state<S: DeserializeOwned>(storage: &dyn KeyValueStore, key: &str) -> StoreResult<Option<S>> {
    let Some(json) = storage.get(key)? else {
        return Ok(None);
    };

    match serde_json::from_str::<Snapshot<S>>(&json) {
        Ok(snapshot) => Ok(Some(snapshot.state)),
        Err(e) => {
            tracing::warn!("Discarding unreadable snapshot for '{}': {}", key, e);
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn temp_database() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let database = Database::new(dir.path().join("kv.db")).unwrap();
        database.with_conn(|conn| run_migrations(conn)).unwrap();
        (dir, database)
    }

    #[test]
    fn test_sqlite_get_missing_key() {
        let (_dir, database) = temp_database();
        assert_eq!(database.get("meal-storage").unwrap(), None);
    }

    #[test]
    fn test_sqlite_set_overwrites() {
        let (_dir, database) = temp_database();
        database.set("auth-storage", "{\"a\":1}").unwrap();
        database.set("auth-storage", "{\"a\":2}").unwrap();
        assert_eq!(database.get("auth-storage").unwrap().as_deref(), Some("{\"a\":2}"));
    }

    #[test]
    fn test_sqlite_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kv.db");
        {
            let database = Database::new(&path).unwrap();
            database.with_conn(|conn| run_migrations(conn)).unwrap();
            database.set("meal-log-storage", "[]").unwrap();
        }
        let reopened = Database::new(&path).unwrap();
        assert_eq!(reopened.get("meal-log-storage").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_snapshot_round_trip_and_corruption() {
        let storage = MemoryStore::new();
        save_state(&storage, "k", &vec![1, 2, 3]).unwrap();
        let raw = storage.get("k").unwrap().unwrap();
        assert_eq!(raw, r#"{"state":[1,2,3],"version":0}"#);
        assert_eq!(load_state::<Vec<i32>>(&storage, "k").unwrap(), Some(vec![1, 2, 3]));

        storage.set("k", "not json").unwrap();
        assert_eq!(load_state::<Vec<i32>>(&storage, "k").unwrap(), None);
        assert_eq!(load_state::<Vec<i32>>(&storage, "missing").unwrap(), None);
    }
}
