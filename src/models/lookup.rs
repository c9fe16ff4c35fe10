//! Calorie lookup results
//!
//! The raw API response for one serving, the scaled result for the
//! user's requested quantity, and the variant that holds either.

use serde::{Deserialize, Serialize};

use super::Nutrient;

/// How the requested amount is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementMode {
    #[default]
    Servings,
    Grams,
}

impl MeasurementMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeasurementMode::Servings => "servings",
            MeasurementMode::Grams => "grams",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "servings" => Some(MeasurementMode::Servings),
            "grams" => Some(MeasurementMode::Grams),
            _ => None,
        }
    }
}

fn default_total_servings() -> f64 {
    1.0
}

/// Nutrition data as returned by `POST /get-calories`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseLookupResult {
    pub dish_name: String,
    #[serde(default)]
    pub selected_food: String,
    #[serde(default)]
    pub fdc_id: Option<i64>,
    /// Serving size string such as "150 g" or "1 cup"
    #[serde(default)]
    pub serving_size: String,
    #[serde(default)]
    pub household_serving_text: Option<String>,
    #[serde(default = "default_total_servings")]
    pub total_servings: f64,
    #[serde(default)]
    pub per_100g_nutrients: Vec<Nutrient>,
    #[serde(default)]
    pub per_serving_nutrients: Vec<Nutrient>,
    #[serde(default)]
    pub total_nutrients: Vec<Nutrient>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// What a scale factor was derived from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "basis", rename_all = "snake_case")]
pub enum ConversionBasis {
    /// Amount was a serving count
    Servings,
    /// Serving size parsed as a gram quantity
    ServingSizeGrams { grams: f64 },
    /// Serving size was in grams but its number did not parse; 100 g assumed
    UnparsedServingSize { serving_size: String },
    /// Serving size unit is not grams; nutrients treated as per 100 g
    NonGramUnit { unit: String },
}

impl ConversionBasis {
    /// True when the factor came from the per-100 approximation
    pub fn is_low_confidence(&self) -> bool {
        matches!(
            self,
            ConversionBasis::UnparsedServingSize { .. } | ConversionBasis::NonGramUnit { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversion {
    pub scale_factor: f64,
    pub basis: ConversionBasis,
}

/// A lookup rescaled to the requested mode and amount.
///
/// `lookup.per_serving_nutrients` holds values for the requested amount and
/// `lookup.total_servings` equals `amount`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaledLookupResult {
    #[serde(flatten)]
    pub lookup: BaseLookupResult,
    pub mode: MeasurementMode,
    pub amount: f64,
    pub computed_total_nutrients: Vec<Nutrient>,
    pub conversion: Conversion,
}

/// Either an unscaled API response or a scaled one.
///
/// Scaled is listed first so records carrying `mode`, `amount` and
/// `computed_total_nutrients` decode as Scaled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LookupResult {
    Scaled(ScaledLookupResult),
    Raw(BaseLookupResult),
}

impl LookupResult {
    /// The lookup fields shared by both variants
    pub fn details(&self) -> &BaseLookupResult {
        match self {
            LookupResult::Scaled(scaled) => &scaled.lookup,
            LookupResult::Raw(raw) => raw,
        }
    }

    pub fn dish_name(&self) -> &str {
        &self.details().dish_name
    }

    /// Totals for the quantity the user asked for
    pub fn effective_total_nutrients(&self) -> &[Nutrient] {
        match self {
            LookupResult::Scaled(scaled) => &scaled.computed_total_nutrients,
            LookupResult::Raw(raw) => &raw.total_nutrients,
        }
    }

    pub fn mode(&self) -> Option<MeasurementMode> {
        match self {
            LookupResult::Scaled(scaled) => Some(scaled.mode),
            LookupResult::Raw(_) => None,
        }
    }
}

impl From<BaseLookupResult> for LookupResult {
    fn from(raw: BaseLookupResult) -> Self {
        LookupResult::Raw(raw)
    }
}

impl From<ScaledLookupResult> for LookupResult {
    fn from(scaled: ScaledLookupResult) -> Self {
        LookupResult::Scaled(scaled)
    }
}
