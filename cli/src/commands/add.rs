use anyhow::{Result, bail};
use std::process;

use food_diary_core::RecordStore;

use super::helpers::json_error;

pub(crate) fn cmd_add(
    store: &mut RecordStore,
    food_name: &str,
    calories: &str,
    meal_type: &str,
    notes: &[String],
    json: bool,
) -> Result<()> {
    let notes = notes.join(" ");

    let entry = match store.add(food_name, calories, meal_type, &notes) {
        Ok(entry) => entry,
        Err(e) if json => {
            println!("{}", json_error(&e.to_string()));
            process::exit(1);
        }
        // Only the top-level message: persistence failures carry file paths
        // in their source chain.
        Err(e) => bail!("{e}"),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        let name = &entry.food_name;
        let cal = entry.calories;
        let meal = entry.meal_type;
        println!("Added: {name} ({cal} cal) for {meal}");
    }

    Ok(())
}
