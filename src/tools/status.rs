//! Calorie Tracker Status Tool
//!
//! Provides runtime status information about the calorie tracker service.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;
use crate::store::{HistoryKind, Stores};

/// Usage instructions for AI assistants
pub const USAGE_INSTRUCTIONS: &str = r#"
# Calorie Tracker Instructions

## Session

Every lookup and history tool needs a signed-in session.

1. `register` with first_name, last_name, email and password (6+ characters), or
2. `login` with email and password.

The session is saved and restored on the next start. `whoami` refreshes the
user from the server, `logout` forgets the token.

## Looking Up a Dish

**Tool:** `lookup_calories`

| Parameter | Meaning |
|-----------|---------|
| dish_name | Free text, 1-100 characters |
| mode | `servings` (default) or `grams` |
| amount | 0.1 to 1000; at most 50 in servings mode |
| history | `calorie_lookup` (default) or `meal_log` |

The server is always asked for one serving. The result is scaled locally:

- **servings**: every nutrient is multiplied by `amount`
- **grams**: nutrients are multiplied by `amount / serving grams`, where the
  serving grams come from the serving size (e.g. "150 g")

When the serving size is not in grams (e.g. "1 cup") the conversion assumes
100 g per serving and the response carries `low_confidence: true`. Tell the
user the figure is an estimate in that case.

**Tool:** `quick_log_meal` logs a dish by servings using the server's own
totals and records it in the `meal` history.

## Histories

| Name | Filled by |
|------|-----------|
| calorie_lookup | lookup_calories |
| meal_log | lookup_calories with history=meal_log |
| meal | quick_log_meal |

Each keeps the 50 most recent entries, newest first.

- `list_history`: cards with calories, protein, fat and carbs
- `get_history_entry`: the full stored result for one id
- `history_stats`: total searches, total calories, average calories
- `history_by_day`: entries grouped by local day ("Today", "Yesterday", ...)
- `clear_history`: removes every entry of one history

## Errors

- "Dish Not Found" is reported as a warning; suggest a different name
- Validation errors list every failing field
"#;

/// Runtime status of the calorie tracker service
#[derive(Debug, Clone, Serialize)]
pub struct CalorieTrackerStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,

    /// Session and stores
    pub api_base_url: String,
    pub authenticated: bool,
    pub history_sizes: Vec<HistorySize>,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistorySize {
    pub history: &'static str,
    pub entries: usize,
    pub capacity: usize,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
    api_base_url: String,
}

impl StatusTracker {
    pub fn new(database_path: PathBuf, api_base_url: impl Into<String>) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
            api_base_url: api_base_url.into(),
        }
    }

    /// Get the current status
    pub fn get_status(&self, stores: &Stores) -> Result<CalorieTrackerStatus, String> {
        let build_info = BuildInfo::current();

        // Get database size if it exists
        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let authenticated = stores.auth().map_err(|e| e.to_string())?.is_authenticated();
        let mut history_sizes = Vec::with_capacity(HistoryKind::ALL.len());
        for kind in HistoryKind::ALL {
            let log = stores.history(kind).map_err(|e| e.to_string())?;
            history_sizes.push(HistorySize {
                history: kind.as_str(),
                entries: log.len(),
                capacity: log.capacity(),
            });
        }

        // Get process info
        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        Ok(CalorieTrackerStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            api_base_url: self.api_base_url.clone(),
            authenticated,
            history_sizes,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_stores;

    #[test]
    fn test_status_reports_stores() {
        let stores = test_stores();
        let tracker = StatusTracker::new(PathBuf::from("/nonexistent/caltrack.db"), "http://localhost:8000");
        let status = tracker.get_status(&stores).unwrap();

        assert!(!status.authenticated);
        assert_eq!(status.database_size_bytes, None);
        assert_eq!(status.history_sizes.len(), 3);
        assert!(status.history_sizes.iter().all(|h| h.entries == 0 && h.capacity == 50));
        assert_eq!(status.process_id, std::process::id());
    }
}
