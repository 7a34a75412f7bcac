//! Data models
//!
//! Rust structs carried through the analysis workflow.

mod analysis;
mod food_item;
mod image;
mod nutrition;

pub use analysis::{Advisory, AnalysisOutcome, AnalysisResult, ResultOrigin};
pub use food_item::FoodItem;
pub use image::{ImageSource, SelectedImage};
pub use nutrition::NutritionTotals;
