//! Calorie lookup tools
//!
//! Fetch a dish from the API, scale it, and record it in a history.

use serde::Serialize;

use super::{describe_lookup_error, require_auth};
use crate::api::ApiClient;
use crate::models::{CalorieRequest, LookupResult};
use crate::nutrition::{measurement_label, scale_lookup, MacroSummary};
use crate::store::{HistoryKind, Stores};
use crate::validation::validate_calorie_form;

/// Response for lookup_calories and quick_log_meal
#[derive(Debug, Serialize)]
pub struct LookupResponse {
    pub entry_id: String,
    pub history: &'static str,
    pub message: String,
    pub measurement: String,
    pub totals: MacroSummary,
    /// True when grams were converted against an assumed 100 g basis
    pub low_confidence: bool,
    pub result: LookupResult,
}

/// Look up a dish for one serving, scale it to `amount` in `mode`, and
/// record it in `kind`
pub async fn lookup_calories(
    api: &ApiClient,
    stores: &Stores,
    dish_name: &str,
    mode: &str,
    amount: f64,
    kind: HistoryKind,
) -> Result<LookupResponse, String> {
    require_auth(stores)?;
    let form = validate_calorie_form(dish_name, mode, amount).map_err(|e| e.to_string())?;

    let request = CalorieRequest {
        dish_name: form.dish_name.clone(),
        servings: 1.0,
    };
    let base = api
        .get_calories(&request)
        .await
        .map_err(|e| describe_lookup_error(&e))?;

    let scaled = scale_lookup(&base, form.mode, form.amount);
    let low_confidence = scaled.conversion.basis.is_low_confidence();
    let message = format!(
        "Found calorie information for {} ({} {})",
        form.dish_name,
        form.amount,
        form.mode.as_str()
    );

    tracing::info!(
        "Looked up '{}' ({} {}, factor {})",
        form.dish_name,
        form.amount,
        form.mode.as_str(),
        scaled.conversion.scale_factor
    );

    record(stores, kind, LookupResult::Scaled(scaled), message, low_confidence)
}

/// Log `servings` of a dish using the API's own totals, unscaled
pub async fn quick_log_meal(
    api: &ApiClient,
    stores: &Stores,
    dish_name: &str,
    servings: f64,
) -> Result<LookupResponse, String> {
    require_auth(stores)?;
    let form = validate_calorie_form(dish_name, "servings", servings).map_err(|e| e.to_string())?;

    let request = CalorieRequest {
        dish_name: form.dish_name,
        servings: form.amount,
    };
    let raw = api
        .get_calories(&request)
        .await
        .map_err(|e| describe_lookup_error(&e))?;

    let message = format!("Found calorie information for {}", raw.dish_name);
    record(stores, HistoryKind::Meal, LookupResult::Raw(raw), message, false)
}

fn record(
    stores: &Stores,
    kind: HistoryKind,
    result: LookupResult,
    message: String,
    low_confidence: bool,
) -> Result<LookupResponse, String> {
    let totals = MacroSummary::from_nutrients(result.effective_total_nutrients());
    let measurement = measurement_label(&result);

    let entry = stores
        .history(kind)
        .map_err(|e| e.to_string())?
        .add(result)
        .map_err(|e| format!("Failed to save history: {}", e))?;

    Ok(LookupResponse {
        entry_id: entry.id,
        history: kind.as_str(),
        message,
        measurement,
        totals,
        low_confidence,
        result: entry.record,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{test_stores, NOT_AUTHENTICATED};

    fn offline_api() -> ApiClient {
        ApiClient::new("http://127.0.0.1:9").unwrap()
    }

    #[tokio::test]
    async fn test_lookup_requires_session() {
        let stores = test_stores();
        let err = lookup_calories(&offline_api(), &stores, "rice", "grams", 100.0, HistoryKind::CalorieLookup)
            .await
            .unwrap_err();
        assert_eq!(err, NOT_AUTHENTICATED);
    }

    #[tokio::test]
    async fn test_invalid_form_is_rejected_before_request() {
        let stores = test_stores();
        stores.auth().unwrap().set_auth(Some("tok".into()), None).unwrap();

        let err = lookup_calories(&offline_api(), &stores, "rice", "servings", 75.0, HistoryKind::CalorieLookup)
            .await
            .unwrap_err();
        assert_eq!(err, "amount: Maximum 50 servings");

        let err = quick_log_meal(&offline_api(), &stores, "", 1.0).await.unwrap_err();
        assert_eq!(err, "dish_name: Dish name is required");
        assert!(stores.history(HistoryKind::Meal).unwrap().is_empty());
    }
}
