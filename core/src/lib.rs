//! Core of the food diary: the entry model, validation rules, the JSON-backed
//! record store and the statistics computed over it.

pub mod clock;
pub mod error;
pub mod models;
pub mod query;
pub mod store;
pub mod validate;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{DiaryError, ValidationError};
pub use models::{DateSummary, DiaryStats, Entry, MEAL_TYPES, MealType, NewEntry};
pub use store::RecordStore;
pub use validate::{MAX_CALORIES, validate_entry};
