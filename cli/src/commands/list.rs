use anyhow::Result;
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use food_diary_core::RecordStore;

use super::helpers::{parse_date, truncate};

pub(crate) fn cmd_list(store: &RecordStore, date: Option<&str>, json: bool) -> Result<()> {
    #[derive(Tabled)]
    struct EntryRow {
        #[tabled(rename = "ID")]
        id: u64,
        #[tabled(rename = "Time")]
        time: String,
        #[tabled(rename = "Food")]
        food: String,
        #[tabled(rename = "Meal")]
        meal: String,
        #[tabled(rename = "Calories")]
        calories: u64,
        #[tabled(rename = "Notes")]
        notes: String,
    }

    let date = date
        .map(|d| parse_date(d, store.today()))
        .transpose()?;
    let summary = store.date_summary(date);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let date = summary.date;
    if summary.entries.is_empty() {
        eprintln!("No entries found for {date}");
        process::exit(2);
    }

    let rows: Vec<EntryRow> = summary
        .entries
        .iter()
        .map(|e| EntryRow {
            id: e.id,
            time: e.timestamp.get(11..).unwrap_or(&e.timestamp).to_string(),
            food: truncate(&e.food_name, 35),
            meal: e.meal_type.to_string(),
            calories: e.calories,
            notes: truncate(&e.notes, 40),
        })
        .collect();

    println!("=== {date} ===\n");
    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::single(4)).with(Alignment::right()))
        .to_string();
    println!("{table}");

    let total = summary.total_calories;
    let count = summary.total_entries;
    println!("\n  TOTAL: {total} kcal across {count} entries");

    Ok(())
}
