use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::validate::validate_entry;

pub const MEAL_TYPES: &[&str] = &["breakfast", "lunch", "dinner", "snack"];

/// Format of `Entry::timestamp`, second precision.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
            Self::Snack => "snack",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "breakfast" => Ok(Self::Breakfast),
            "lunch" => Ok(Self::Lunch),
            "dinner" => Ok(Self::Dinner),
            "snack" => Ok(Self::Snack),
            _ => Err(ValidationError::InvalidMealType(s.to_string())),
        }
    }
}

/// One recorded food event, exactly as persisted in the backing file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: u64,
    pub food_name: String,
    pub calories: u64,
    pub meal_type: MealType,
    #[serde(default)]
    pub notes: String,
    pub date: NaiveDate,
    pub timestamp: String,
}

/// Normalized caller input for a new entry. Id, date and timestamp are
/// assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntry {
    pub food_name: String,
    pub calories: u64,
    pub meal_type: MealType,
    pub notes: String,
}

impl NewEntry {
    /// Validate raw field values and derive the normalized entry: trimmed
    /// name and notes, integer calories, lowercase meal type.
    pub fn parse(
        food_name: &str,
        calories: &str,
        meal_type: &str,
        notes: &str,
    ) -> Result<Self, ValidationError> {
        validate_entry(food_name, calories, meal_type)?;

        let calories = calories
            .trim()
            .parse::<u64>()
            .map_err(|_| ValidationError::InvalidCalories)?;

        Ok(Self {
            food_name: food_name.trim().to_string(),
            calories,
            meal_type: meal_type.parse()?,
            notes: notes.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiaryStats {
    pub total_entries: usize,
    pub total_calories: u64,
    pub days_tracked: usize,
    pub average_calories_per_day: f64,
}

/// Entries recorded on one date plus their count and calorie sum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateSummary {
    pub date: NaiveDate,
    pub entries: Vec<Entry>,
    pub total_entries: usize,
    pub total_calories: u64,
}
