use thiserror::Error;

use crate::models::MEAL_TYPES;
use crate::validate::MAX_CALORIES;

/// Why a candidate entry was rejected. Messages are shown to users verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("food name required")]
    MissingFoodName,

    #[error("Calories must be a valid number")]
    InvalidCalories,

    #[error("Calories must be a positive number")]
    NegativeCalories,

    #[error("Calories must be at most {max}", max = MAX_CALORIES)]
    TooManyCalories,

    #[error("Invalid meal type '{0}'. Must be one of: {types}", types = MEAL_TYPES.join(", "))]
    InvalidMealType(String),
}

#[derive(Debug, Error)]
pub enum DiaryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The backing file could not be written. The I/O detail stays in
    /// `source` so it can be logged without reaching the user.
    #[error("Failed to save data")]
    Persistence {
        #[source]
        source: std::io::Error,
    },
}
