use std::fmt::Write;

use food_diary_core::{DateSummary, DiaryStats, MAX_CALORIES, MealType};

const STYLE: &str = "
    body { font-family: Arial, sans-serif; margin: 40px; }
    .container { max-width: 800px; margin: 0 auto; }
    .form-group { margin-bottom: 15px; }
    label { display: block; margin-bottom: 5px; font-weight: bold; }
    input, textarea, select { width: 100%; padding: 8px; margin-bottom: 10px; box-sizing: border-box; }
    button { background-color: #4CAF50; color: white; padding: 10px 20px; border: none; cursor: pointer; }
    .entry { border: 1px solid #ddd; padding: 15px; margin: 10px 0; border-radius: 5px; }
    .entry-time { font-weight: bold; color: #2c3e50; }
    .entry-food { color: #27ae60; margin: 5px 0; }
    .entry-calories { color: #e74c3c; }
    .stats { background-color: #f8f9fa; padding: 15px; border-radius: 5px; margin: 20px 0; }
";

/// Render the summary page: add form, today's entries and overall stats.
pub(crate) fn render_index(today: &DateSummary, stats: &DiaryStats) -> String {
    let mut html = String::with_capacity(4096);

    let _ = write!(
        html,
        "<!DOCTYPE html>
<html>
<head>
<meta charset=\"utf-8\">
<title>Food Diary</title>
<style>{STYLE}</style>
</head>
<body>
<div class=\"container\">
<h1>Food Diary</h1>
<h2>Add Food Entry</h2>
<form method=\"POST\" action=\"/entries\">
<div class=\"form-group\">
<label for=\"food_name\">Food Name:</label>
<input type=\"text\" id=\"food_name\" name=\"food_name\" required>
</div>
<div class=\"form-group\">
<label for=\"calories\">Calories:</label>
<input type=\"number\" id=\"calories\" name=\"calories\" min=\"0\" max=\"{MAX_CALORIES}\" required>
</div>
<div class=\"form-group\">
<label for=\"meal_type\">Meal Type:</label>
<select id=\"meal_type\" name=\"meal_type\" required>
<option value=\"\">Select meal type</option>
{options}</select>
</div>
<div class=\"form-group\">
<label for=\"notes\">Notes (optional):</label>
<textarea id=\"notes\" name=\"notes\" rows=\"3\"></textarea>
</div>
<button type=\"submit\">Add Entry</button>
</form>
",
        options = meal_options()
    );

    let date = today.date;
    let _ = writeln!(html, "<h2>Today's Entries ({date})</h2>");

    if today.entries.is_empty() {
        html.push_str("<p>No entries for today yet. Add your first meal above!</p>\n");
    } else {
        let total = today.total_calories;
        let _ = writeln!(
            html,
            "<div class=\"stats\"><strong>Total Calories Today: {total}</strong></div>"
        );
        for e in &today.entries {
            let _ = write!(
                html,
                "<div class=\"entry\">
<div class=\"entry-time\">{time}</div>
<div class=\"entry-food\">{food} ({meal})</div>
<div class=\"entry-calories\">{calories} calories</div>
",
                time = escape_html(&e.timestamp),
                food = escape_html(&e.food_name),
                meal = e.meal_type,
                calories = e.calories,
            );
            if !e.notes.is_empty() {
                let _ = writeln!(html, "<div>{}</div>", escape_html(&e.notes));
            }
            html.push_str("</div>\n");
        }
    }

    let _ = write!(
        html,
        "<h2>Statistics</h2>
<div class=\"stats\">
<div>Total entries: {}</div>
<div>Total calories: {}</div>
<div>Days tracked: {}</div>
<div>Average calories per day: {:.2}</div>
</div>
<h2>API Endpoints</h2>
<ul>
<li><strong>GET /entries</strong> - all entries as JSON</li>
<li><strong>GET /entries?date=YYYY-MM-DD</strong> - entries for one date</li>
<li><strong>GET /stats</strong> - statistics as JSON</li>
<li><strong>POST /entries</strong> - add an entry (form-encoded)</li>
</ul>
</div>
</body>
</html>
",
        stats.total_entries,
        stats.total_calories,
        stats.days_tracked,
        stats.average_calories_per_day
    );

    html
}

fn meal_options() -> String {
    [
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Dinner,
        MealType::Snack,
    ]
    .iter()
    .fold(String::new(), |mut acc, meal| {
        let value = meal.as_str();
        let mut label = value.to_string();
        label[..1].make_ascii_uppercase();
        let _ = writeln!(acc, "<option value=\"{value}\">{label}</option>");
        acc
    })
}

pub(crate) fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
