use anyhow::Result;

use food_diary_core::RecordStore;

pub(crate) fn cmd_stats(store: &RecordStore, json: bool) -> Result<()> {
    let stats = store.stats();

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("=== Food Diary Statistics ===\n");
    println!("  Total entries:            {}", stats.total_entries);
    println!("  Total calories:           {}", stats.total_calories);
    println!("  Days tracked:             {}", stats.days_tracked);
    println!(
        "  Average calories per day: {:.2}",
        stats.average_calories_per_day
    );

    Ok(())
}
