//! Shared nutrition totals structure
//!
//! Used for both per-meal totals and synthesized sample results.

use serde::{Deserialize, Serialize};

use crate::nutrition::derive_calories;

/// Macro and calorie totals for an analyzed meal
///
/// Macros are grams, calories are kcal. All fields are kept non-negative
/// by the normalization step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionTotals {
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub calories: f64,
}

impl NutritionTotals {
    /// Create totals with all zeros
    pub fn zero() -> Self {
        Self::default()
    }

    /// Build totals from macros alone, deriving calories
    pub fn from_macros(protein: f64, carbs: f64, fat: f64) -> Self {
        Self {
            protein,
            carbs,
            fat,
            calories: derive_calories(protein, carbs, fat),
        }
    }

    /// Add another set of totals to this one
    pub fn add(&self, other: &NutritionTotals) -> Self {
        Self {
            protein: self.protein + other.protein,
            carbs: self.carbs + other.carbs,
            fat: self.fat + other.fat,
            calories: self.calories + other.calories,
        }
    }
}

impl std::ops::Add for NutritionTotals {
    type Output = NutritionTotals;

    fn add(self, other: NutritionTotals) -> NutritionTotals {
        NutritionTotals::add(&self, &other)
    }
}

impl std::iter::Sum for NutritionTotals {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(NutritionTotals::zero(), |acc, n| acc + n)
    }
}
