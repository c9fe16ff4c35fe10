//! Nutrient data structure
//!
//! A single named nutrient value as reported by the calorie API.

use serde::{Deserialize, Serialize};

/// One nutrient in a per-100g, per-serving or total list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nutrient {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    pub value: f64,
    pub unit: String,
}

impl Nutrient {
    pub fn new(id: i64, name: impl Into<String>, value: f64, unit: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            value,
            unit: unit.into(),
        }
    }

    /// Scale the value by a multiplier, keeping identity and unit
    pub fn scale(&self, multiplier: f64) -> Self {
        Self {
            id: self.id,
            name: self.name.clone(),
            value: self.value * multiplier,
            unit: self.unit.clone(),
        }
    }
}

/// Scale every nutrient in a list by the same multiplier
pub fn scale_nutrients(nutrients: &[Nutrient], multiplier: f64) -> Vec<Nutrient> {
    nutrients.iter().map(|n| n.scale(multiplier)).collect()
}

impl std::ops::Mul<f64> for &Nutrient {
    type Output = Nutrient;

    fn mul(self, multiplier: f64) -> Nutrient {
        self.scale(multiplier)
    }
}
