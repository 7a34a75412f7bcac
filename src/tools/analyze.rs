//! Analysis tools
//!
//! The analyze/show/reset tool layer over the workflow controller.

use serde::Serialize;

use crate::analysis::client::NutritionBackend;
use crate::analysis::workflow::MealAnalyzer;
use crate::models::{Advisory, AnalysisOutcome, FoodItem, NutritionTotals, ResultOrigin};

use super::status::StatusTracker;

/// Response for analyze_meal and show_results
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub origin: ResultOrigin,
    pub attempts: u32,
    pub advisory: Option<Advisory>,
    pub total: NutritionTotals,
    pub food: Vec<FoodItem>,
    /// The rendered text view, identical for identical outcomes
    pub report: String,
}

impl AnalyzeResponse {
    fn from_outcome(outcome: &AnalysisOutcome, report: String) -> Self {
        Self {
            origin: outcome.origin.clone(),
            attempts: outcome.attempts,
            advisory: outcome.advisory.clone(),
            total: outcome.result.total,
            food: outcome.result.food.clone(),
            report,
        }
    }
}

/// Response for reset_analyzer
#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub success: bool,
    pub message: String,
}

/// Run one analysis cycle for the currently selected image
pub async fn analyze_meal(
    analyzer: &mut MealAnalyzer,
    backend: &dyn NutritionBackend,
    tracker: &mut StatusTracker,
) -> Result<AnalyzeResponse, String> {
    tracker.record_analysis_requested();

    let outcome = analyzer
        .analyze(backend)
        .await
        .map_err(|e| e.to_string())?;
    tracker.record_result(&outcome.origin);

    Ok(AnalyzeResponse::from_outcome(
        &outcome,
        analyzer.view().to_string(),
    ))
}

/// Re-render the last outcome without a new request
pub fn show_results(analyzer: &MealAnalyzer) -> Result<AnalyzeResponse, String> {
    let outcome = analyzer
        .outcome()
        .ok_or_else(|| "No analysis results yet. Select an image and call analyze_meal.".to_string())?;
    Ok(AnalyzeResponse::from_outcome(
        outcome,
        analyzer.view().to_string(),
    ))
}

/// Clear the selected image and results
pub fn reset_analyzer(analyzer: &mut MealAnalyzer) -> ResetResponse {
    analyzer.reset();
    ResetResponse {
        success: true,
        message: "Analyzer reset. Select a new image to start another analysis.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::error::AnalysisError;
    use crate::analysis::validate::validate_image;
    use crate::analysis::workflow::RetryPolicy;
    use crate::models::{AnalysisResult, ImageSource, SelectedImage};
    use async_trait::async_trait;
    use std::io::Cursor;
    use std::path::PathBuf;
    use std::time::Duration;

    struct FixedBackend(Option<AnalysisResult>);

    #[async_trait]
    impl NutritionBackend for FixedBackend {
        async fn analyze(
            &self,
            _image: &SelectedImage,
        ) -> Result<AnalysisResult, AnalysisError> {
            match &self.0 {
                Some(result) => Ok(result.clone()),
                None => Err(AnalysisError::Timeout(45)),
            }
        }
    }

    fn fixtures() -> (MealAnalyzer, StatusTracker) {
        let mut analyzer = MealAnalyzer::new(RetryPolicy {
            retry_delay: Duration::ZERO,
        });
        let img = image::RgbImage::new(1, 1);
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
        analyzer.select(
            validate_image(buf.into_inner(), "meal.png", ImageSource::Upload).unwrap(),
        );
        (
            analyzer,
            StatusTracker::new(PathBuf::from("/tmp/mealsnap.json")),
        )
    }

    fn toast_result() -> AnalysisResult {
        AnalysisResult {
            food: vec![FoodItem {
                name: "Toast".to_string(),
                quantity: "2".to_string(),
                calories: 160.0,
                protein: 6.0,
                carbs: 30.0,
                fat: 2.0,
            }],
            total: NutritionTotals {
                protein: 6.0,
                carbs: 30.0,
                fat: 2.0,
                calories: 160.0,
            },
        }
    }

    #[tokio::test]
    async fn test_analyze_meal_updates_counters() {
        let (mut analyzer, mut tracker) = fixtures();
        let backend = FixedBackend(Some(toast_result()));

        let response = analyze_meal(&mut analyzer, &backend, &mut tracker)
            .await
            .unwrap();
        assert_eq!(response.origin, ResultOrigin::Remote);
        assert!(response.report.contains("160 kcal"));
        assert_eq!(tracker.stats().analyses_requested, 1);
        assert_eq!(tracker.stats().real_results_shown, 1);
    }

    #[tokio::test]
    async fn test_fallback_counts_as_sample() {
        let (mut analyzer, mut tracker) = fixtures();
        let backend = FixedBackend(None);

        let response = analyze_meal(&mut analyzer, &backend, &mut tracker)
            .await
            .unwrap();
        assert!(response.origin.is_sample());
        assert!(response.advisory.is_some());
        assert_eq!(tracker.stats().sample_results_shown, 1);
    }

    #[tokio::test]
    async fn test_show_results_matches_analysis_report() {
        let (mut analyzer, mut tracker) = fixtures();
        let backend = FixedBackend(Some(toast_result()));

        let first = analyze_meal(&mut analyzer, &backend, &mut tracker)
            .await
            .unwrap();
        let again = show_results(&analyzer).unwrap();
        assert_eq!(first.report, again.report);
    }

    #[test]
    fn test_show_results_without_outcome() {
        let analyzer = MealAnalyzer::new(RetryPolicy {
            retry_delay: Duration::ZERO,
        });
        let err = show_results(&analyzer).unwrap_err();
        assert!(err.contains("analyze_meal"));
    }

    #[tokio::test]
    async fn test_reset_clears_results() {
        let (mut analyzer, mut tracker) = fixtures();
        let backend = FixedBackend(Some(toast_result()));
        analyze_meal(&mut analyzer, &backend, &mut tracker)
            .await
            .unwrap();

        let response = reset_analyzer(&mut analyzer);
        assert!(response.success);
        assert!(show_results(&analyzer).is_err());
        assert!(analyzer.selected().is_none());
    }
}
