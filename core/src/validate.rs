use std::num::{IntErrorKind, ParseIntError};

use crate::error::ValidationError;
use crate::models::MealType;

/// Largest calorie count a single entry may carry.
pub const MAX_CALORIES: u64 = 1_000_000;

/// Check raw entry fields against the acceptance rules.
///
/// Rules run in order and the first failure wins: food name present,
/// calories an integer, calories not negative, calories at most
/// [`MAX_CALORIES`], meal type one of breakfast/lunch/dinner/snack
/// (case-insensitive). Acceptance carries no value; use
/// [`crate::models::NewEntry::parse`] for the normalized fields.
pub fn validate_entry(
    food_name: &str,
    calories: &str,
    meal_type: &str,
) -> Result<(), ValidationError> {
    if food_name.trim().is_empty() {
        return Err(ValidationError::MissingFoodName);
    }

    // Integers too wide for i64 are still integers; overflow decides which
    // range rule they break.
    let calories: i64 = calories.trim().parse().map_err(|e: ParseIntError| {
        match e.kind() {
            IntErrorKind::PosOverflow => ValidationError::TooManyCalories,
            IntErrorKind::NegOverflow => ValidationError::NegativeCalories,
            _ => ValidationError::InvalidCalories,
        }
    })?;
    if calories < 0 {
        return Err(ValidationError::NegativeCalories);
    }
    if calories.unsigned_abs() > MAX_CALORIES {
        return Err(ValidationError::TooManyCalories);
    }

    meal_type.parse::<MealType>()?;
    Ok(())
}
