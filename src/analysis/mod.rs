//! Meal analysis workflow
//!
//! The pipeline from a selected image to a rendered result:
//! validation, webhook dispatch, response normalization, and the
//! retry/fallback state machine.

pub mod client;
pub mod endpoint;
pub mod error;
pub mod normalize;
pub mod samples;
pub mod validate;
pub mod workflow;

pub use client::{NutritionBackend, WebhookClient};
pub use error::{AnalysisError, FailureClass};
pub use workflow::{AnalysisPhase, MealAnalyzer, RetryPolicy};
