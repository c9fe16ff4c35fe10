//! Nutrient scaling
//!
//! Turns a lookup fetched for one serving into values for the amount the
//! user asked for, either as a serving count or as a gram weight.

use super::units::{parse_leading_number, parse_serving_size, FALLBACK_BASIS_GRAMS};
use crate::models::{
    scale_nutrients, BaseLookupResult, Conversion, ConversionBasis, LookupResult,
    MeasurementMode, ScaledLookupResult,
};

/// Work out the scale factor for a requested amount.
///
/// Servings scale directly. Grams divide by the serving size when it is a
/// gram weight, otherwise by 100 on the assumption that the API data is per
/// 100 g. The basis records which rule applied.
pub fn calculate_conversion(serving_size: &str, mode: MeasurementMode, amount: f64) -> Conversion {
    match mode {
        MeasurementMode::Servings => Conversion {
            scale_factor: amount,
            basis: ConversionBasis::Servings,
        },
        MeasurementMode::Grams => {
            let parsed = parse_serving_size(serving_size);
            let (grams, basis) = if !parsed.is_grams() {
                let basis = if parsed.unit.is_empty() {
                    ConversionBasis::UnparsedServingSize {
                        serving_size: serving_size.to_string(),
                    }
                } else {
                    ConversionBasis::NonGramUnit { unit: parsed.unit.clone() }
                };
                (FALLBACK_BASIS_GRAMS, basis)
            } else {
                match parsed.usable_quantity() {
                    Some(grams) => (grams, ConversionBasis::ServingSizeGrams { grams }),
                    None => (
                        FALLBACK_BASIS_GRAMS,
                        ConversionBasis::UnparsedServingSize {
                            serving_size: serving_size.to_string(),
                        },
                    ),
                }
            };

            if basis.is_low_confidence() {
                tracing::warn!(
                    "Serving size '{}' is not a gram weight. Treating {}g against a {}g basis.",
                    serving_size,
                    amount,
                    FALLBACK_BASIS_GRAMS
                );
            }

            Conversion {
                scale_factor: amount / grams,
                basis,
            }
        }
    }
}

/// Scale a one-serving lookup to the requested mode and amount.
///
/// `per_serving_nutrients` in the result holds values for the requested
/// amount and `total_servings` is set to `amount`. Pure: equal inputs give
/// equal outputs.
pub fn scale_lookup(base: &BaseLookupResult, mode: MeasurementMode, amount: f64) -> ScaledLookupResult {
    let conversion = calculate_conversion(&base.serving_size, mode, amount);
    let factor = conversion.scale_factor;

    let lookup = BaseLookupResult {
        total_servings: amount,
        per_serving_nutrients: scale_nutrients(&base.per_serving_nutrients, factor),
        ..base.clone()
    };

    ScaledLookupResult {
        computed_total_nutrients: scale_nutrients(&base.total_nutrients, factor),
        lookup,
        mode,
        amount,
        conversion,
    }
}

/// Human readable quantity, e.g. "2 servings (300g)" or "250g"
pub fn measurement_label(result: &LookupResult) -> String {
    match result {
        LookupResult::Scaled(scaled) => match scaled.mode {
            MeasurementMode::Servings => {
                let grams_per_serving = parse_leading_number(&scaled.lookup.serving_size)
                    .map(|(value, _)| value)
                    .unwrap_or(0.0);
                format!(
                    "{} serving{} ({:.0}g)",
                    scaled.amount,
                    plural(scaled.amount),
                    scaled.amount * grams_per_serving
                )
            }
            MeasurementMode::Grams => format!("{}g", scaled.amount),
        },
        LookupResult::Raw(raw) => {
            format!("{} serving{}", raw.total_servings, plural(raw.total_servings))
        }
    }
}

fn plural(amount: f64) -> &'static str {
    if amount == 1.0 {
        ""
    } else {
        "s"
    }
}
