//! Utility to print the persisted lookup histories
//!
//! Usage: show-history [calorie_lookup|meal_log|meal]

use std::sync::Arc;

use calorie_tracker::config::AppConfig;
use calorie_tracker::db::{migrations, Database};
use calorie_tracker::models::LookupResult;
use calorie_tracker::store::{HistoryKind, HistoryLog, KeyValueStore};
use calorie_tracker::tools::history::{compute_stats, HistoryEntrySummary};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;
    println!("Database path: {}", config.database_path.display());

    let kinds = match std::env::args().nth(1) {
        Some(name) => match HistoryKind::from_str(&name) {
            Some(kind) => vec![kind],
            None => return Err(format!("Unknown history '{}'", name).into()),
        },
        None => HistoryKind::ALL.to_vec(),
    };

    let database = Database::new(&config.database_path)?;

    // Run migrations
    database.with_conn(|conn| {
        migrations::run_migrations(conn)?;
        Ok(())
    })?;

    let storage: Arc<dyn KeyValueStore> = Arc::new(database);
    for kind in kinds {
        let log = HistoryLog::<LookupResult>::open(storage.clone(), kind.storage_key(), config.history_capacity)?;
        let stats = compute_stats(log.entries());

        println!();
        println!("{} ({} of {} entries)", kind.storage_key(), log.len(), log.capacity());
        println!(
            "  Total calories: {} | Average per meal: {}",
            stats.total_calories, stats.avg_calories_per_meal
        );

        for entry in log.entries() {
            let summary = HistoryEntrySummary::from_entry(entry);
            println!(
                "  {}  {:<30} {:>22}  {:>5} kcal  P {:.1}g  F {:.1}g  C {:.1}g{}",
                summary.recorded_at.as_deref().unwrap_or("-"),
                summary.dish_name,
                summary.measurement,
                summary.totals.calories,
                summary.totals.protein,
                summary.totals.fat,
                summary.totals.carbs,
                if summary.low_confidence { "  (estimate)" } else { "" }
            );
        }
    }

    Ok(())
}
