//! History tools
//!
//! Read, summarize and clear the persisted lookup histories.

use std::collections::BTreeMap;

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use serde::Serialize;

use super::require_auth;
use crate::models::{LookupResult, MeasurementMode};
use crate::nutrition::{get_calories, measurement_label, MacroSummary};
use crate::store::{HistoryEntry, HistoryKind, Stores};

/// One history card
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntrySummary {
    pub id: String,
    pub dish_name: String,
    pub selected_food: String,
    pub measurement: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<MeasurementMode>,
    #[serde(flatten)]
    pub totals: MacroSummary,
    pub low_confidence: bool,
    pub timestamp: i64,
    pub recorded_at: Option<String>,
}

impl HistoryEntrySummary {
    pub fn from_entry(entry: &HistoryEntry<LookupResult>) -> Self {
        let details = entry.record.details();
        let low_confidence = match &entry.record {
            LookupResult::Scaled(scaled) => scaled.conversion.basis.is_low_confidence(),
            LookupResult::Raw(_) => false,
        };

        Self {
            id: entry.id.clone(),
            dish_name: details.dish_name.clone(),
            selected_food: details.selected_food.clone(),
            measurement: measurement_label(&entry.record),
            mode: entry.record.mode(),
            totals: MacroSummary::from_nutrients(entry.record.effective_total_nutrients()),
            low_confidence,
            timestamp: entry.timestamp,
            recorded_at: Utc.timestamp_millis_opt(entry.timestamp).single().map(|t| t.to_rfc3339()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListHistoryResponse {
    pub history: &'static str,
    pub total: usize,
    pub capacity: usize,
    pub entries: Vec<HistoryEntrySummary>,
}

#[derive(Debug, Serialize)]
pub struct ClearHistoryResponse {
    pub history: &'static str,
    pub removed: usize,
    pub message: String,
}

/// Aggregates shown above a history list
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistoryStats {
    pub total_searches: usize,
    pub total_calories: i64,
    pub avg_calories_per_meal: i64,
}

/// Entries recorded on one local calendar day
#[derive(Debug, Clone, Serialize)]
pub struct DayGroup {
    /// YYYY-MM-DD
    pub date_key: String,
    /// "Today", "Yesterday" or e.g. "Mar 4, 2026"
    pub label: String,
    /// e.g. "Wednesday, March 4, 2026"
    pub full_date: String,
    pub meal_count: usize,
    pub total_calories: i64,
    pub entries: Vec<HistoryEntrySummary>,
}

#[derive(Debug, Serialize)]
pub struct HistoryByDayResponse {
    pub history: &'static str,
    pub days: Vec<DayGroup>,
}

pub fn list_history(stores: &Stores, kind: HistoryKind, limit: Option<usize>) -> Result<ListHistoryResponse, String> {
    require_auth(stores)?;
    let log = stores.history(kind).map_err(|e| e.to_string())?;
    let limit = limit.unwrap_or(usize::MAX);

    Ok(ListHistoryResponse {
        history: kind.as_str(),
        total: log.len(),
        capacity: log.capacity(),
        entries: log.entries().iter().take(limit).map(HistoryEntrySummary::from_entry).collect(),
    })
}

pub fn get_history_entry(
    stores: &Stores,
    kind: HistoryKind,
    id: &str,
) -> Result<Option<HistoryEntry<LookupResult>>, String> {
    require_auth(stores)?;
    let log = stores.history(kind).map_err(|e| e.to_string())?;
    Ok(log.get_by_id(id).cloned())
}

pub fn clear_history(stores: &Stores, kind: HistoryKind) -> Result<ClearHistoryResponse, String> {
    require_auth(stores)?;
    let mut log = stores.history(kind).map_err(|e| e.to_string())?;
    let removed = log.len();
    log.clear().map_err(|e| format!("Failed to clear history: {}", e))?;
    tracing::info!("Cleared {} entries from {}", removed, kind.storage_key());

    Ok(ClearHistoryResponse {
        history: kind.as_str(),
        removed,
        message: "History cleared".to_string(),
    })
}

pub fn history_stats(stores: &Stores, kind: HistoryKind) -> Result<HistoryStats, String> {
    require_auth(stores)?;
    let log = stores.history(kind).map_err(|e| e.to_string())?;
    Ok(compute_stats(log.entries()))
}

pub fn history_by_day(stores: &Stores, kind: HistoryKind) -> Result<HistoryByDayResponse, String> {
    require_auth(stores)?;
    let log = stores.history(kind).map_err(|e| e.to_string())?;
    Ok(HistoryByDayResponse {
        history: kind.as_str(),
        days: group_by_day(log.entries(), Local::now()),
    })
}

fn entry_calories(entry: &HistoryEntry<LookupResult>) -> i64 {
    get_calories(Some(entry.record.effective_total_nutrients()))
}

pub fn compute_stats(entries: &[HistoryEntry<LookupResult>]) -> HistoryStats {
    let total_searches = entries.len();
    let total_calories: i64 = entries.iter().map(entry_calories).sum();
    let avg_calories_per_meal = if total_searches > 0 {
        (total_calories as f64 / total_searches as f64).round() as i64
    } else {
        0
    };

    HistoryStats {
        total_searches,
        total_calories,
        avg_calories_per_meal,
    }
}

/// Group entries by calendar day in `now`'s time zone, newest day first.
/// Entries keep their newest-first order inside each day.
pub fn group_by_day<Tz: TimeZone>(entries: &[HistoryEntry<LookupResult>], now: DateTime<Tz>) -> Vec<DayGroup> {
    let zone = now.timezone();
    let today = now.date_naive();
    let yesterday = today.pred_opt();

    let mut days: BTreeMap<NaiveDate, Vec<&HistoryEntry<LookupResult>>> = BTreeMap::new();
    for entry in entries {
        match zone.timestamp_millis_opt(entry.timestamp).single() {
            Some(at) => days.entry(at.date_naive()).or_default().push(entry),
            None => tracing::warn!("Skipping history entry {} with invalid timestamp {}", entry.id, entry.timestamp),
        }
    }

    days.into_iter()
        .rev()
        .map(|(date, day_entries)| {
            let label = if date == today {
                "Today".to_string()
            } else if Some(date) == yesterday {
                "Yesterday".to_string()
            } else {
                date.format("%b %-d, %Y").to_string()
            };

            DayGroup {
                date_key: date.format("%Y-%m-%d").to_string(),
                label,
                full_date: date.format("%A, %B %-d, %Y").to_string(),
                meal_count: day_entries.len(),
                total_calories: day_entries.iter().map(|e| entry_calories(e)).sum(),
                entries: day_entries.into_iter().map(HistoryEntrySummary::from_entry).collect(),
            }
        })
        .collect()
}
