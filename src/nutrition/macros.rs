//! Macro math
//!
//! Calories are derived from macros with the standard Atwater factors:
//! 4 kcal/g for protein and carbs, 9 kcal/g for fat.

/// Derive calories from macro grams
pub fn derive_calories(protein: f64, carbs: f64, fat: f64) -> f64 {
    protein * 4.0 + carbs * 4.0 + fat * 9.0
}

/// Format a gram value for display: rounded to one decimal place,
/// trailing `.0` dropped ("25g", "25.5g")
pub fn format_grams(value: f64) -> String {
    let tenths = (value * 10.0).round();
    if tenths as i64 % 10 == 0 {
        format!("{}g", (tenths / 10.0) as i64)
    } else {
        format!("{:.1}g", tenths / 10.0)
    }
}

/// Format a calorie value for display: rounded to the nearest integer
pub fn format_calories(value: f64) -> String {
    format!("{} kcal", value.round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_calories() {
        // 20g protein + 50g carbs + 10g fat = 80 + 200 + 90 = 370 kcal
        assert_eq!(derive_calories(20.0, 50.0, 10.0), 370.0);
        assert_eq!(derive_calories(0.0, 0.0, 0.0), 0.0);
        assert_eq!(derive_calories(0.0, 25.0, 0.0), 100.0);
    }

    #[test]
    fn test_format_grams_whole_values() {
        assert_eq!(format_grams(0.0), "0g");
        assert_eq!(format_grams(25.0), "25g");
        assert_eq!(format_grams(25.04), "25g");
    }

    #[test]
    fn test_format_grams_fractional_values() {
        assert_eq!(format_grams(25.46), "25.5g");
        assert_eq!(format_grams(0.25), "0.3g");
        assert_eq!(format_grams(12.34), "12.3g");
    }

    #[test]
    fn test_format_calories_rounds_to_integer() {
        assert_eq!(format_calories(95.0), "95 kcal");
        assert_eq!(format_calories(369.6), "370 kcal");
        assert_eq!(format_calories(0.4), "0 kcal");
    }
}
