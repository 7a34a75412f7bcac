//! Nutrition calculation module
//!
//! Macro-to-calorie derivation and display formatting rules.

mod macros;

pub use macros::{derive_calories, format_calories, format_grams};
