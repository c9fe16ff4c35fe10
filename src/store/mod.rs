//! Client-side stores
//!
//! Persisted session and history state, each saved as a JSON snapshot in a
//! key-value store under its own name.

pub mod auth;
pub mod history;
pub mod kv;

use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;

use crate::api::ApiClient;
use crate::db::DbError;
use crate::models::LookupResult;

pub use auth::{AuthState, AuthStore};
pub use history::{HistoryEntry, HistoryLog, DEFAULT_HISTORY_CAPACITY};
pub use kv::{KeyValueStore, MemoryStore};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Db(#[from] DbError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0} lock poisoned")]
    Poisoned(&'static str),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// The three lookup histories kept by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryKind {
    /// Results from the calorie lookup page
    #[default]
    CalorieLookup,
    /// Meals logged for the day-by-day journal
    MealLog,
    /// Raw lookups from the quick meal form
    Meal,
}

impl HistoryKind {
    pub const ALL: [HistoryKind; 3] = [HistoryKind::CalorieLookup, HistoryKind::MealLog, HistoryKind::Meal];

    pub fn storage_key(&self) -> &'static str {
        match self {
            HistoryKind::CalorieLookup => "calorie-lookup-storage",
            HistoryKind::MealLog => "meal-log-storage",
            HistoryKind::Meal => "meal-storage",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryKind::CalorieLookup => "calorie_lookup",
            HistoryKind::MealLog => "meal_log",
            HistoryKind::Meal => "meal",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "calorie_lookup" | "lookup" => Some(HistoryKind::CalorieLookup),
            "meal_log" => Some(HistoryKind::MealLog),
            "meal" => Some(HistoryKind::Meal),
            _ => None,
        }
    }
}

pub type LookupHistory = HistoryLog<LookupResult>;

/// All stores of one client session
pub struct Stores {
    auth: Mutex<AuthStore>,
    calorie_lookup: Mutex<LookupHistory>,
    meal_log: Mutex<LookupHistory>,
    meal: Mutex<LookupHistory>,
}

impl Stores {
    pub fn open(storage: Arc<dyn KeyValueStore>, api: Arc<ApiClient>, capacity: usize) -> StoreResult<Self> {
        let open_history = |kind: HistoryKind| {
            HistoryLog::<LookupResult>::open(storage.clone(), kind.storage_key(), capacity).map(Mutex::new)
        };

        Ok(Self {
            calorie_lookup: open_history(HistoryKind::CalorieLookup)?,
            meal_log: open_history(HistoryKind::MealLog)?,
            meal: open_history(HistoryKind::Meal)?,
            auth: Mutex::new(AuthStore::open(storage.clone(), api)?),
        })
    }

    pub fn auth(&self) -> StoreResult<MutexGuard<'_, AuthStore>> {
        self.auth.lock().map_err(|_| StoreError::Poisoned("auth store"))
    }

    pub fn history(&self, kind: HistoryKind) -> StoreResult<MutexGuard<'_, LookupHistory>> {
        let log = match kind {
            HistoryKind::CalorieLookup => &self.calorie_lookup,
            HistoryKind::MealLog => &self.meal_log,
            HistoryKind::Meal => &self.meal,
        };
        log.lock().map_err(|_| StoreError::Poisoned(kind.storage_key()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_kind_parsing() {
        assert_eq!(HistoryKind::from_str("meal-log"), Some(HistoryKind::MealLog));
        assert_eq!(HistoryKind::from_str("Calorie_Lookup"), Some(HistoryKind::CalorieLookup));
        assert_eq!(HistoryKind::from_str("meal"), Some(HistoryKind::Meal));
        assert_eq!(HistoryKind::from_str("dinner"), None);
        for kind in HistoryKind::ALL {
            assert_eq!(HistoryKind::from_str(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn test_histories_use_separate_keys() {
        let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let api = Arc::new(ApiClient::new("http://localhost:8000").unwrap());
        let stores = Stores::open(storage.clone(), api, DEFAULT_HISTORY_CAPACITY).unwrap();

        let raw: LookupResult = serde_json::from_value(serde_json::json!({"dish_name": "toast"})).unwrap();
        stores.history(HistoryKind::MealLog).unwrap().add(raw).unwrap();

        assert_eq!(stores.history(HistoryKind::MealLog).unwrap().len(), 1);
        assert!(stores.history(HistoryKind::CalorieLookup).unwrap().is_empty());
        assert!(storage.get("meal-log-storage").unwrap().is_some());
        assert!(storage.get("calorie-lookup-storage").unwrap().is_none());
    }
}
