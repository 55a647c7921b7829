mod location;
mod meal;
mod restaurant;

pub use location::{Coordinate, User};
pub use meal::{AggregatedResultSet, MealCombination, SavedMeal};
pub use restaurant::{normalize_search, MenuItem, MenuItemId, Restaurant, RestaurantId};
