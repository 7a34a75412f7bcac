//! Result rendering
//!
//! Pure functions from an analysis outcome to displayed text. Rendering the
//! same outcome twice yields the same view, and the loading view stands in
//! while a request is in flight so stale values are never shown.

use std::fmt;

use serde::Serialize;

use crate::models::{Advisory, AnalysisOutcome, AnalysisResult};
use crate::nutrition::{format_calories, format_grams};

/// Placeholder shown for each scalar while a request is in flight
pub const LOADING_PLACEHOLDER: &str = "...";

/// The displayed state: four scalar values plus the itemized food list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedView {
    pub protein: String,
    pub carbs: String,
    pub fat: String,
    pub calories: String,
    /// "Analyzed Food" for one item, "Detected Food Items" for several
    pub items_title: Option<String>,
    pub items: Vec<String>,
    pub advisory: Option<String>,
}

impl RenderedView {
    /// The view shown before any result arrives
    pub fn loading() -> Self {
        Self {
            protein: LOADING_PLACEHOLDER.to_string(),
            carbs: LOADING_PLACEHOLDER.to_string(),
            fat: LOADING_PLACEHOLDER.to_string(),
            calories: LOADING_PLACEHOLDER.to_string(),
            items_title: None,
            items: Vec::new(),
            advisory: None,
        }
    }
}

impl fmt::Display for RenderedView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Nutrition Analysis")?;
        writeln!(f, "  Protein:  {}", self.protein)?;
        writeln!(f, "  Carbs:    {}", self.carbs)?;
        writeln!(f, "  Fat:      {}", self.fat)?;
        writeln!(f, "  Calories: {}", self.calories)?;
        if let Some(title) = &self.items_title {
            writeln!(f, "{}", title)?;
            for item in &self.items {
                writeln!(f, "  - {}", item)?;
            }
        }
        if let Some(advisory) = &self.advisory {
            writeln!(f, "Note: {}", advisory)?;
        }
        Ok(())
    }
}

/// Render a finished outcome, advisory included
pub fn render_outcome(outcome: &AnalysisOutcome) -> RenderedView {
    render_result(&outcome.result, outcome.advisory.as_ref())
}

/// Render a canonical result into displayed text
pub fn render_result(result: &AnalysisResult, advisory: Option<&Advisory>) -> RenderedView {
    let items: Vec<String> = result.food.iter().map(|item| {
        let quantity = if item.quantity.is_empty() {
            String::new()
        } else {
            format!(" ({})", item.quantity)
        };
        format!(
            "{}{}: {}, P: {} | C: {} | F: {}",
            item.name,
            quantity,
            format_calories(item.calories),
            format_grams(item.protein),
            format_grams(item.carbs),
            format_grams(item.fat),
        )
    })
    .collect();

    let items_title = match items.len() {
        0 => None,
        1 => Some("Analyzed Food".to_string()),
        _ => Some("Detected Food Items".to_string()),
    };

    RenderedView {
        protein: format_grams(result.total.protein),
        carbs: format_grams(result.total.carbs),
        fat: format_grams(result.total.fat),
        calories: format_calories(result.total.calories),
        items_title,
        items,
        advisory: advisory.map(|a| a.message.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::FailureClass;
    use crate::models::{FoodItem, NutritionTotals, ResultOrigin};

    fn apple_result() -> AnalysisResult {
        AnalysisResult {
            food: vec![FoodItem {
                name: "Apple".to_string(),
                quantity: "1".to_string(),
                calories: 95.0,
                protein: 0.0,
                carbs: 25.0,
                fat: 0.0,
            }],
            total: NutritionTotals {
                protein: 0.0,
                carbs: 25.0,
                fat: 0.0,
                calories: 95.0,
            },
        }
    }

    #[test]
    fn test_apple_scenario_display() {
        let view = render_result(&apple_result(), None);
        assert_eq!(view.protein, "0g");
        assert_eq!(view.carbs, "25g");
        assert_eq!(view.fat, "0g");
        assert_eq!(view.calories, "95 kcal");
        assert_eq!(view.items_title.as_deref(), Some("Analyzed Food"));
        assert_eq!(view.items.len(), 1);
        assert!(view.items[0].starts_with("Apple (1): 95 kcal"));
    }

    #[test]
    fn test_rendering_is_idempotent() {
        let outcome = AnalysisOutcome {
            result: apple_result(),
            origin: ResultOrigin::Remote,
            advisory: None,
            attempts: 1,
        };
        let first = render_outcome(&outcome);
        let second = render_outcome(&outcome);
        assert_eq!(first, second);
        assert_eq!(first.to_string(), second.to_string());
    }

    #[test]
    fn test_fractional_grams_are_rounded_for_display() {
        let result = AnalysisResult {
            food: Vec::new(),
            total: NutritionTotals {
                protein: 25.46,
                carbs: 40.04,
                fat: 9.95,
                calories: 369.6,
            },
        };
        let view = render_result(&result, None);
        assert_eq!(view.protein, "25.5g");
        assert_eq!(view.carbs, "40g");
        assert_eq!(view.fat, "10g");
        assert_eq!(view.calories, "370 kcal");
    }

    #[test]
    fn test_multiple_items_use_plural_title() {
        let mut result = apple_result();
        result.food.push(FoodItem {
            name: "Banana".to_string(),
            quantity: String::new(),
            calories: 105.0,
            protein: 1.3,
            carbs: 27.0,
            fat: 0.4,
        });
        let view = render_result(&result, None);
        assert_eq!(view.items_title.as_deref(), Some("Detected Food Items"));
        // Empty quantity renders without parentheses
        assert!(view.items[1].starts_with("Banana: 105 kcal"));
    }

    #[test]
    fn test_advisory_appears_in_report() {
        let advisory = Advisory {
            class: FailureClass::Timeout,
            message: FailureClass::Timeout.advisory_message().to_string(),
        };
        let view = render_result(&apple_result(), Some(&advisory));
        let report = view.to_string();
        assert!(report.contains("Note: Analysis is taking longer than expected"));
    }

    #[test]
    fn test_loading_view_uses_placeholders() {
        let view = RenderedView::loading();
        assert_eq!(view.protein, "...");
        assert_eq!(view.calories, "...");
        assert!(view.items.is_empty());
        assert!(view.advisory.is_none());
    }
}
