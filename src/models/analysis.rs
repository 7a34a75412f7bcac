//! Analysis result model
//!
//! The canonical `{food[], total}` structure produced by normalizing a
//! webhook response or synthesizing a sample, plus the outcome wrapper
//! consumed by rendering and session statistics.

use serde::Serialize;

use crate::analysis::error::{AnalysisError, FailureClass};
use super::{FoodItem, NutritionTotals};

/// Canonical analysis result, regardless of which response shape produced it
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub food: Vec<FoodItem>,
    pub total: NutritionTotals,
}

/// Where an analysis result came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ResultOrigin {
    /// Normalized from a real webhook response
    Remote,
    /// Synthesized locally after a failure
    Sample { meal_name: String },
}

impl ResultOrigin {
    pub fn is_sample(&self) -> bool {
        matches!(self, ResultOrigin::Sample { .. })
    }
}

/// User-visible advisory paired with a fallback result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Advisory {
    pub class: FailureClass,
    pub message: String,
}

impl Advisory {
    /// Build the advisory for a terminal analysis failure
    pub fn from_error(err: &AnalysisError) -> Self {
        let class = err.failure_class();
        Self {
            message: class.advisory_message().to_string(),
            class,
        }
    }
}

/// One finished analysis cycle: the result plus how it was obtained
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisOutcome {
    pub result: AnalysisResult,
    pub origin: ResultOrigin,
    pub advisory: Option<Advisory>,
    /// Number of webhook attempts made (1 or 2)
    pub attempts: u32,
}
