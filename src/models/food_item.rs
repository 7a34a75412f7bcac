//! Food item model
//!
//! One detected food entry from the analysis service. The order of items
//! reflects detection order and is preserved for display.

use serde::{Deserialize, Serialize};

use super::NutritionTotals;

/// A single detected food item with its nutrition contribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    pub name: String,
    /// Free-form quantity string from the service, e.g. "1" or "2 slices"
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default, alias = "carbohydrates")]
    pub carbs: f64,
    #[serde(default)]
    pub fat: f64,
}

impl FoodItem {
    /// This item's contribution as a totals value
    pub fn totals(&self) -> NutritionTotals {
        NutritionTotals {
            protein: self.protein,
            carbs: self.carbs,
            fat: self.fat,
            calories: self.calories,
        }
    }
}
