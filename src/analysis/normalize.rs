//! Response normalization
//!
//! The webhook has returned three different JSON shapes over time. The raw
//! value is first classified into one of the known shapes, then the matched
//! payload is mapped to the canonical `{food[], total}` structure. No field
//! is accessed before classification succeeds.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::models::{AnalysisResult, FoodItem, NutritionTotals};
use crate::nutrition::derive_calories;

use super::error::AnalysisError;

/// The tolerated response shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// `[ { "output": {...} } ]` - first element's output
    WrappedArray,
    /// `{ "output": {...} }` - direct output property
    Wrapped,
    /// `{ "food": [...], "total": {...} }` - already canonical
    Canonical,
}

/// Classify a raw response into a known shape and its payload
pub fn classify(raw: &Value) -> Option<(ResponseShape, &Value)> {
    if let Some(array) = raw.as_array() {
        let output = array.first()?.get("output")?;
        return Some((ResponseShape::WrappedArray, output));
    }
    if let Some(output) = raw.get("output") {
        return Some((ResponseShape::Wrapped, output));
    }
    if raw.get("food").is_some() || raw.get("total").is_some() {
        return Some((ResponseShape::Canonical, raw));
    }
    None
}

/// Wire form of the totals object; `carbohydrates` is an accepted alias
/// and calories may be absent
#[derive(Debug, Deserialize)]
struct RawTotals {
    #[serde(default)]
    protein: f64,
    #[serde(default, alias = "carbohydrates")]
    carbs: f64,
    #[serde(default)]
    fat: f64,
    #[serde(default)]
    calories: Option<f64>,
}

/// Wire form of a matched payload
#[derive(Debug, Deserialize)]
struct RawPayload {
    #[serde(default)]
    food: Option<Vec<FoodItem>>,
    #[serde(default)]
    total: Option<RawTotals>,
}

/// Map a raw webhook response to the canonical AnalysisResult
pub fn canonicalize(raw: Value) -> Result<AnalysisResult, AnalysisError> {
    let (shape, payload) = classify(&raw).ok_or_else(|| {
        AnalysisError::Format("response format not recognized".to_string())
    })?;

    let payload: RawPayload = serde_json::from_value(payload.clone())
        .map_err(|e| AnalysisError::Format(format!("unusable payload: {}", e)))?;

    if payload.food.is_none() && payload.total.is_none() {
        return Err(AnalysisError::Format(
            "payload missing both food array and total object".to_string(),
        ));
    }

    let food: Vec<FoodItem> = payload
        .food
        .unwrap_or_default()
        .into_iter()
        .map(clamp_item)
        .collect();

    let total = match payload.total {
        Some(raw_total) => clamp_totals(raw_total),
        // No totals object: aggregate the detected items
        None => {
            let summed: NutritionTotals = food.iter().map(FoodItem::totals).sum();
            if summed.calories > 0.0 {
                summed
            } else {
                NutritionTotals::from_macros(summed.protein, summed.carbs, summed.fat)
            }
        }
    };

    debug!(?shape, items = food.len(), calories = total.calories, "normalized response");

    Ok(AnalysisResult { food, total })
}

fn clamp_totals(raw: RawTotals) -> NutritionTotals {
    let protein = raw.protein.max(0.0);
    let carbs = raw.carbs.max(0.0);
    let fat = raw.fat.max(0.0);
    let calories = match raw.calories {
        Some(calories) => calories.max(0.0),
        None => derive_calories(protein, carbs, fat),
    };
    NutritionTotals {
        protein,
        carbs,
        fat,
        calories,
    }
}

fn clamp_item(item: FoodItem) -> FoodItem {
    FoodItem {
        calories: item.calories.max(0.0),
        protein: item.protein.max(0.0),
        carbs: item.carbs.max(0.0),
        fat: item.fat.max(0.0),
        ..item
    }
}
