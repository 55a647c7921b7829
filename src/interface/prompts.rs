use dialoguer::{Confirm, Input, Select};
use strsim::jaro_winkler;

use crate::engine::constants::SUGGESTION_THRESHOLD;
use crate::error::{MealError, Result};
use crate::models::{normalize_search, AggregatedResultSet, Restaurant};

/// Prompt for the per-meal calorie limit.
pub fn prompt_calorie_limit() -> Result<u32> {
    let input: String = Input::new()
        .with_prompt("Calorie limit for this meal?")
        .default("800".to_string())
        .interact_text()?;

    parse_calorie_limit(&input)
}

pub fn parse_calorie_limit(input: &str) -> Result<u32> {
    let limit: u32 = input
        .trim()
        .parse()
        .map_err(|_| MealError::InvalidInput(format!("'{}' is not a whole number", input.trim())))?;

    if limit == 0 {
        return Err(MealError::InvalidInput(
            "Calorie limit must be greater than 0".to_string(),
        ));
    }

    Ok(limit)
}

/// Ask which displayed option to save. `None` means the user is done.
pub fn prompt_save_choice(results: &AggregatedResultSet) -> Result<Option<usize>> {
    let mut options: Vec<String> = results
        .iter()
        .enumerate()
        .map(|(i, combo)| {
            format!(
                "{:>3}. {} ({} cal)",
                i + 1,
                combo.restaurant_name,
                combo.total_calories()
            )
        })
        .collect();
    options.push("Done".to_string());

    let selection = Select::new()
        .with_prompt("Save a meal option?")
        .items(&options)
        .default(options.len() - 1)
        .interact()?;

    Ok((selection < results.len()).then_some(selection))
}

/// Prompt for yes/no confirmation.
pub fn prompt_yes_no(prompt: &str, default: bool) -> Result<bool> {
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()?)
}

/// Restaurants whose names look like `query`, best match first.
pub fn suggest_restaurants<'a>(query: &str, restaurants: &'a [Restaurant]) -> Vec<&'a Restaurant> {
    let needle = normalize_search(query);
    if needle.is_empty() {
        return Vec::new();
    }

    let mut candidates: Vec<(&Restaurant, f64)> = restaurants
        .iter()
        .map(|r| (r, jaro_winkler(&r.search_key(), &needle)))
        .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
        .collect();

    candidates.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    candidates.into_iter().take(5).map(|(r, _)| r).collect()
}

/// When a search matched nothing, offer close names instead.
pub fn prompt_did_you_mean<'a>(
    query: &str,
    restaurants: &'a [Restaurant],
) -> Result<Option<&'a Restaurant>> {
    let suggestions = suggest_restaurants(query, restaurants);

    match suggestions.as_slice() {
        [] => {
            println!("No restaurant matches '{}'", query);
            Ok(None)
        }
        [only] => {
            let confirm = Confirm::new()
                .with_prompt(format!("Did you mean '{}'?", only.name))
                .default(true)
                .interact()?;
            Ok(confirm.then_some(*only))
        }
        many => {
            let mut options: Vec<String> = many.iter().map(|r| r.name.clone()).collect();
            options.push("None of these".to_string());

            let selection = Select::new()
                .with_prompt("Which did you mean?")
                .items(&options)
                .default(0)
                .interact()?;

            Ok(many.get(selection).copied())
        }
    }
}
