use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::{MealError, Result};
use crate::models::AggregatedResultSet;

/// One CSV row: a single item of one combination.
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    option: usize,
    restaurant_id: i64,
    restaurant: &'a str,
    item_id: i64,
    item: &'a str,
    calories: u32,
    option_total_calories: u32,
}

/// Write a result set to `path`; the extension picks the format (`.json` or `.csv`).
pub fn export_results<P: AsRef<Path>>(path: P, results: &AggregatedResultSet) -> Result<()> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("json") => export_json(path, results),
        Some("csv") => export_csv(path, results),
        _ => Err(MealError::InvalidInput(format!(
            "cannot export to {}: use a .json or .csv file",
            path.display()
        ))),
    }
}

fn export_json(path: &Path, results: &AggregatedResultSet) -> Result<()> {
    let json = serde_json::to_string_pretty(results.as_slice())?;
    fs::write(path, json)?;
    Ok(())
}

fn export_csv(path: &Path, results: &AggregatedResultSet) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for (index, combo) in results.iter().enumerate() {
        let total = combo.total_calories();
        for item in &combo.items {
            writer.serialize(ExportRow {
                option: index + 1,
                restaurant_id: combo.restaurant_id,
                restaurant: &combo.restaurant_name,
                item_id: item.id,
                item: &item.name,
                calories: item.calories,
                option_total_calories: total,
            })?;
        }
    }
    writer.flush()?;
    Ok(())
}
