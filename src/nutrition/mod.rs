//! Nutrition calculation module
//!
//! Serving-size parsing, scaling to a requested amount, and nutrient lookup.

pub mod extraction;
pub mod scaling;
pub mod units;

pub use extraction::{get_calories, get_nutrient_value, MacroSummary};
pub use scaling::{calculate_conversion, measurement_label, scale_lookup};
pub use units::{parse_leading_number, parse_serving_size, ParsedServingSize};
