//! Read-only views over a slice of entries.

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::models::{DateSummary, DiaryStats, Entry};

#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn stats(entries: &[Entry]) -> DiaryStats {
    if entries.is_empty() {
        return DiaryStats {
            total_entries: 0,
            total_calories: 0,
            days_tracked: 0,
            average_calories_per_day: 0.0,
        };
    }

    let total_calories = total_calories(entries);
    let days_tracked = entries
        .iter()
        .map(|e| e.date)
        .collect::<HashSet<_>>()
        .len();
    let average = total_calories as f64 / days_tracked as f64;

    DiaryStats {
        total_entries: entries.len(),
        total_calories,
        days_tracked,
        average_calories_per_day: round2(average),
    }
}

#[must_use]
pub fn entries_on(entries: &[Entry], date: NaiveDate) -> Vec<&Entry> {
    entries.iter().filter(|e| e.date == date).collect()
}

#[must_use]
pub fn date_summary(entries: &[Entry], date: NaiveDate) -> DateSummary {
    let matching: Vec<Entry> = entries_on(entries, date).into_iter().cloned().collect();
    let total_calories = total_calories(&matching);
    DateSummary {
        date,
        total_entries: matching.len(),
        total_calories,
        entries: matching,
    }
}

/// Calorie sum that pins at `u64::MAX`. Hand-edited files are not bounded
/// by the validator.
fn total_calories<'a>(entries: impl IntoIterator<Item = &'a Entry>) -> u64 {
    entries
        .into_iter()
        .fold(0, |acc, e| acc.saturating_add(e.calories))
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
