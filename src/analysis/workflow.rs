//! Workflow controller
//!
//! Owns the selected image and the last outcome, and drives one analysis
//! cycle through the retry/fallback state machine:
//! `Idle -> Requesting -> {Success, Retrying, Fallback}`.

use std::time::Duration;

use tracing::{info, warn};

use crate::models::{Advisory, AnalysisOutcome, ResultOrigin, SelectedImage};
use crate::render::{self, RenderedView};

use super::client::NutritionBackend;
use super::error::AnalysisError;
use super::samples;

/// Delay before the single automatic retry
pub const RETRY_DELAY: Duration = Duration::from_secs(3);

/// Workflow state for one analysis cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisPhase {
    Idle,
    Requesting,
    Retrying,
    Success,
    Fallback,
}

/// Retry policy for an analysis cycle; the delay is injectable for tests
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retry_delay: RETRY_DELAY,
        }
    }
}

/// The meal analysis workflow controller
///
/// Constructed once at startup; the backend is passed per dispatch so the
/// endpoint always reflects the current configuration.
pub struct MealAnalyzer {
    policy: RetryPolicy,
    selected: Option<SelectedImage>,
    outcome: Option<AnalysisOutcome>,
    view: RenderedView,
    phase: AnalysisPhase,
}

impl MealAnalyzer {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            selected: None,
            outcome: None,
            view: RenderedView::loading(),
            phase: AnalysisPhase::Idle,
        }
    }

    /// Make `image` the current selection, discarding the previous one
    pub fn select(&mut self, image: SelectedImage) -> &SelectedImage {
        self.selected.insert(image)
    }

    pub fn selected(&self) -> Option<&SelectedImage> {
        self.selected.as_ref()
    }

    pub fn outcome(&self) -> Option<&AnalysisOutcome> {
        self.outcome.as_ref()
    }

    /// The current displayed state; loading placeholders while a request
    /// is in flight or nothing has been analyzed yet
    pub fn view(&self) -> &RenderedView {
        &self.view
    }

    pub fn phase(&self) -> AnalysisPhase {
        self.phase
    }

    /// Clear selection and results back to the initial state
    pub fn reset(&mut self) {
        self.selected = None;
        self.outcome = None;
        self.view = RenderedView::loading();
        self.phase = AnalysisPhase::Idle;
    }

    /// Run one analysis cycle against `backend`
    ///
    /// Previous results are cleared to placeholders before dispatch so stale
    /// data is never shown next to an in-flight request. On a network-class
    /// failure the request is retried exactly once after the policy delay;
    /// every terminal failure falls back to a synthesized sample result.
    pub async fn analyze(
        &mut self,
        backend: &dyn NutritionBackend,
    ) -> Result<AnalysisOutcome, AnalysisError> {
        let image = self
            .selected
            .clone()
            .ok_or_else(|| AnalysisError::Validation("No image selected.".to_string()))?;

        self.outcome = None;
        self.view = RenderedView::loading();
        self.phase = AnalysisPhase::Requesting;

        let mut attempts = 0u32;
        let mut retried = false;

        let outcome = loop {
            attempts += 1;
            match backend.analyze(&image).await {
                Ok(result) => {
                    self.phase = AnalysisPhase::Success;
                    break AnalysisOutcome {
                        result,
                        origin: ResultOrigin::Remote,
                        advisory: None,
                        attempts,
                    };
                }
                Err(err) => {
                    warn!(error = %err, attempt = attempts, "analysis request failed");

                    if err.is_retryable() && !retried {
                        retried = true;
                        self.phase = AnalysisPhase::Retrying;
                        tokio::time::sleep(self.policy.retry_delay).await;
                        self.phase = AnalysisPhase::Requesting;
                        continue;
                    }

                    let advisory = Advisory::from_error(&err);
                    let (result, meal) = samples::sample_result(&mut rand::thread_rng());
                    info!(meal = meal.name, class = ?advisory.class, "serving sample analysis");

                    self.phase = AnalysisPhase::Fallback;
                    break AnalysisOutcome {
                        result,
                        origin: ResultOrigin::Sample {
                            meal_name: meal.name.to_string(),
                        },
                        advisory: Some(advisory),
                        attempts,
                    };
                }
            }
        };

        self.view = render::render_outcome(&outcome);
        self.outcome = Some(outcome.clone());
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::error::FailureClass;
    use crate::analysis::validate::validate_image;
    use crate::models::{AnalysisResult, FoodItem, ImageSource, NutritionTotals};
    use async_trait::async_trait;
    use std::io::Cursor;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// Scripted backend: pops one canned response per call
    struct MockBackend {
        responses: Mutex<Vec<Result<AnalysisResult, AnalysisError>>>,
        calls: AtomicU32,
    }

    impl MockBackend {
        fn new(responses: Vec<Result<AnalysisResult, AnalysisError>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl NutritionBackend for MockBackend {
        async fn analyze(
            &self,
            _image: &SelectedImage,
        ) -> Result<AnalysisResult, AnalysisError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses.lock().unwrap().remove(0)
        }
    }

    fn test_image() -> SelectedImage {
        let img = image::RgbImage::new(1, 1);
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
        validate_image(buf.into_inner(), "meal.png", ImageSource::Upload).unwrap()
    }

    fn instant_analyzer() -> MealAnalyzer {
        MealAnalyzer::new(RetryPolicy {
            retry_delay: Duration::ZERO,
        })
    }

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

    #[tokio::test]
    async fn test_success_renders_remote_result() {
        let backend = MockBackend::new(vec![Ok(apple_result())]);
        let mut analyzer = instant_analyzer();
        analyzer.select(test_image());

        let outcome = analyzer.analyze(&backend).await.unwrap();
        assert_eq!(outcome.origin, ResultOrigin::Remote);
        assert_eq!(outcome.attempts, 1);
        assert!(outcome.advisory.is_none());
        assert_eq!(analyzer.phase(), AnalysisPhase::Success);
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn test_network_failure_retries_exactly_once() {
        let backend = MockBackend::new(vec![
            Err(AnalysisError::Unreachable("refused".into())),
            Ok(apple_result()),
        ]);
        let mut analyzer = instant_analyzer();
        analyzer.select(test_image());

        let outcome = analyzer.analyze(&backend).await.unwrap();
        assert_eq!(outcome.origin, ResultOrigin::Remote);
        assert_eq!(outcome.attempts, 2);
        assert_eq!(backend.calls(), 2);
    }

    #[tokio::test]
    async fn test_second_network_failure_goes_to_fallback() {
        let backend = MockBackend::new(vec![
            Err(AnalysisError::Network("reset".into())),
            Err(AnalysisError::Network("reset again".into())),
        ]);
        let mut analyzer = instant_analyzer();
        analyzer.select(test_image());

        let outcome = analyzer.analyze(&backend).await.unwrap();
        assert!(outcome.origin.is_sample());
        assert_eq!(outcome.attempts, 2);
        assert_eq!(backend.calls(), 2);
        let advisory = outcome.advisory.as_ref().unwrap();
        assert_eq!(advisory.class, FailureClass::Network);
        assert_eq!(analyzer.phase(), AnalysisPhase::Fallback);
    }

    #[tokio::test]
    async fn test_timeout_skips_retry() {
        let backend = MockBackend::new(vec![Err(AnalysisError::Timeout(45))]);
        let mut analyzer = instant_analyzer();
        analyzer.select(test_image());

        let outcome = analyzer.analyze(&backend).await.unwrap();
        assert!(outcome.origin.is_sample());
        assert_eq!(outcome.attempts, 1);
        assert_eq!(backend.calls(), 1);
        assert_eq!(
            outcome.advisory.as_ref().unwrap().class,
            FailureClass::Timeout
        );
    }

    #[tokio::test]
    async fn test_http_status_failure_skips_retry() {
        let backend = MockBackend::new(vec![Err(AnalysisError::HttpStatus {
            status: 502,
            body: "bad gateway".into(),
        })]);
        let mut analyzer = instant_analyzer();
        analyzer.select(test_image());

        let outcome = analyzer.analyze(&backend).await.unwrap();
        assert!(outcome.origin.is_sample());
        assert_eq!(backend.calls(), 1);
        assert_eq!(
            outcome.advisory.as_ref().unwrap().class,
            FailureClass::Server
        );
    }

    #[tokio::test]
    async fn test_retry_counter_resets_between_cycles() {
        // Each analyze call gets its own single retry
        let backend = MockBackend::new(vec![
            Err(AnalysisError::Unreachable("refused".into())),
            Ok(apple_result()),
            Err(AnalysisError::Unreachable("refused".into())),
            Ok(apple_result()),
        ]);
        let mut analyzer = instant_analyzer();
        analyzer.select(test_image());

        let first = analyzer.analyze(&backend).await.unwrap().attempts;
        let second = analyzer.analyze(&backend).await.unwrap().attempts;
        assert_eq!(first, 2);
        assert_eq!(second, 2);
        assert_eq!(backend.calls(), 4);
    }

    #[tokio::test]
    async fn test_analyze_without_selection_is_a_validation_error() {
        let backend = MockBackend::new(vec![]);
        let mut analyzer = instant_analyzer();
        let err = analyzer.analyze(&backend).await.unwrap_err();
        assert!(matches!(err, AnalysisError::Validation(_)));
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_reset_clears_selection_and_view() {
        let backend = MockBackend::new(vec![Ok(apple_result())]);
        let mut analyzer = instant_analyzer();
        analyzer.select(test_image());
        analyzer.analyze(&backend).await.unwrap();
        assert!(analyzer.outcome().is_some());

        analyzer.reset();
        assert!(analyzer.selected().is_none());
        assert!(analyzer.outcome().is_none());
        assert_eq!(analyzer.view(), &RenderedView::loading());
        assert_eq!(analyzer.phase(), AnalysisPhase::Idle);
    }
}
