use crate::engine::group_by_restaurant;
use crate::models::{AggregatedResultSet, MealCombination, MenuItem, Restaurant, SavedMeal};
use crate::state::SelectionStatus;

/// Display recommendations grouped by restaurant.
///
/// Option numbers are 1-based positions in the full result set.
pub fn display_recommendations(
    results: &AggregatedResultSet,
    status_of: impl Fn(usize) -> SelectionStatus,
) {
    if results.is_empty() {
        println!("No meal combinations found for this calorie limit.");
        return;
    }

    println!();
    println!("=== Meal Recommendations ===");

    for group in group_by_restaurant(results) {
        println!();
        println!("--- {} ---", group.restaurant_name);

        for (index, combo) in group.entries {
            display_combination(index + 1, combo, status_of(index));
        }
    }

    println!();
    println!("{} options in total", results.len());
    println!();
}

fn display_combination(option: usize, combo: &MealCombination, status: SelectionStatus) {
    let tag = match status {
        SelectionStatus::Idle => "",
        SelectionStatus::Pending => "  [Saving...]",
        SelectionStatus::Committed => "  [Saved]",
        SelectionStatus::Failed => "  [Save failed]",
    };

    println!("{:>3}. Meal option{}", option, tag);
    let width = combo
        .items
        .iter()
        .map(|item| item.name.len())
        .max()
        .unwrap_or(10);
    for item in &combo.items {
        println!("       {:<width$}  {:>5} cal", item.name, item.calories);
    }
    println!("       Total: {} cal", combo.total_calories());
}

/// Display restaurants with a heart on favorites.
pub fn display_restaurants(restaurants: &[Restaurant], is_favorite: impl Fn(i64) -> bool) {
    if restaurants.is_empty() {
        println!("No restaurants found.");
        return;
    }

    println!();
    println!("=== Restaurants ({}) ===", restaurants.len());
    println!();

    for r in restaurants {
        let heart = if is_favorite(r.id) { "♥" } else { " " };
        match &r.address {
            Some(address) => println!("  {} [{:>5}] {} - {}", heart, r.id, r.name, address),
            None => println!("  {} [{:>5}] {}", heart, r.id, r.name),
        }
    }

    println!();
}

pub fn display_menu(restaurant_id: i64, items: &[MenuItem]) {
    if items.is_empty() {
        println!("Restaurant {} has no menu items.", restaurant_id);
        return;
    }

    println!();
    println!(
        "=== Menu for restaurant {} ({} items) ===",
        restaurant_id,
        items.len()
    );
    println!();

    let width = items.iter().map(|i| i.name.len()).max().unwrap_or(10);
    for item in items {
        println!(
            "  [{:>6}] {:<width$}  {:>5} cal",
            item.id, item.name, item.calories
        );
    }

    println!();
}

pub fn display_saved_meals(meals: &[SavedMeal]) {
    if meals.is_empty() {
        println!("You have no saved meals yet.");
        return;
    }

    println!();
    println!("=== My Saved Meals ===");

    for meal in meals {
        println!();
        println!(
            "[{}] {} ({})",
            meal.id, meal.restaurant.name, meal.created_at
        );
        for item in &meal.menu_items {
            println!("      {} - {} cal", item.name, item.calories);
        }
        println!("      Total: {} cal", meal.total_calories());
    }

    println!();
}
