//! Nutrient extraction
//!
//! Reads named values out of a nutrient list. A missing nutrient reads as 0.

use serde::Serialize;

use crate::models::Nutrient;

pub const ENERGY: &str = "Energy";
pub const KCAL: &str = "kcal";
pub const PROTEIN: &str = "Protein";
pub const FAT: &str = "Total lipid (fat)";
pub const CARBS: &str = "Carbohydrate, by difference";

/// Calories (Energy in kcal) rounded to the nearest integer
pub fn get_calories(nutrients: Option<&[Nutrient]>) -> i64 {
    nutrients
        .and_then(|list| list.iter().find(|n| n.name == ENERGY && n.unit == KCAL))
        .map(|n| n.value.round() as i64)
        .unwrap_or(0)
}

/// Value of the first nutrient called `name`, rounded to 2 decimals
pub fn get_nutrient_value(nutrients: Option<&[Nutrient]>, name: &str) -> f64 {
    nutrients
        .and_then(|list| list.iter().find(|n| n.name == name))
        .map(|n| round_to_hundredths(n.value))
        .unwrap_or(0.0)
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Calories and macros as shown on a history card
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MacroSummary {
    pub calories: i64,
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
}

impl MacroSummary {
    pub fn from_nutrients(nutrients: &[Nutrient]) -> Self {
        let list = Some(nutrients);
        Self {
            calories: get_calories(list),
            protein: get_nutrient_value(list, PROTEIN),
            fat: get_nutrient_value(list, FAT),
            carbs: get_nutrient_value(list, CARBS),
        }
    }
}
