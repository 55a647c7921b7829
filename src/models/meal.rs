use serde::{Deserialize, Serialize};

use crate::models::restaurant::{MenuItem, MenuItemId, Restaurant, RestaurantId};

/// A set of menu items from one restaurant that fits a calorie limit.
///
/// Combinations carry no durable id. Within a result set they are identified by
/// their position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealCombination {
    pub items: Vec<MenuItem>,
    pub restaurant_id: RestaurantId,
    pub restaurant_name: String,
}

impl MealCombination {
    /// Attach raw provider items to the restaurant that produced them.
    pub fn from_items(restaurant: &Restaurant, items: Vec<MenuItem>) -> Self {
        let items = items
            .into_iter()
            .map(|mut item| {
                item.restaurant_id = restaurant.id;
                item
            })
            .collect();

        Self {
            items,
            restaurant_id: restaurant.id,
            restaurant_name: restaurant.name.clone(),
        }
    }

    pub fn total_calories(&self) -> u32 {
        self.items.iter().map(|i| i.calories).sum()
    }

    pub fn menu_item_ids(&self) -> Vec<MenuItemId> {
        self.items.iter().map(|i| i.id).collect()
    }
}

/// Ordered result of one recommendation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregatedResultSet {
    combinations: Vec<MealCombination>,
}

impl AggregatedResultSet {
    pub fn new(combinations: Vec<MealCombination>) -> Self {
        Self { combinations }
    }

    pub fn len(&self) -> usize {
        self.combinations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.combinations.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&MealCombination> {
        self.combinations.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MealCombination> {
        self.combinations.iter()
    }

    pub fn as_slice(&self) -> &[MealCombination] {
        &self.combinations
    }
}

impl<'a> IntoIterator for &'a AggregatedResultSet {
    type Item = &'a MealCombination;
    type IntoIter = std::slice::Iter<'a, MealCombination>;

    fn into_iter(self) -> Self::IntoIter {
        self.combinations.iter()
    }
}

/// A meal the signed-in user has stored on the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedMeal {
    pub id: i64,
    pub restaurant: Restaurant,
    pub menu_items: Vec<MenuItem>,
    #[serde(default)]
    pub created_at: String,
}

impl SavedMeal {
    pub fn total_calories(&self) -> u32 {
        self.menu_items.iter().map(|i| i.calories).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i64, calories: u32) -> MenuItem {
        MenuItem {
            id,
            name: format!("Item {id}"),
            calories,
            restaurant_id: 0,
        }
    }

    #[test]
    fn test_from_items_tags_restaurant() {
        let restaurant = Restaurant::new(4, "Wendy's");
        let combo = MealCombination::from_items(&restaurant, vec![item(1, 300), item(2, 150)]);

        assert_eq!(combo.restaurant_id, 4);
        assert_eq!(combo.restaurant_name, "Wendy's");
        assert!(combo.items.iter().all(|i| i.restaurant_id == 4));
    }

    #[test]
    fn test_totals() {
        let restaurant = Restaurant::new(1, "A");
        let combo = MealCombination::from_items(&restaurant, vec![item(1, 300), item(2, 150)]);
        assert_eq!(combo.total_calories(), 450);
        assert_eq!(combo.menu_item_ids(), vec![1, 2]);
    }

    #[test]
    fn test_saved_meal_parses_server_shape() {
        let json = r#"{
            "id": 9,
            "restaurant": {"id": 2, "name": "B"},
            "menu_items": [{"id": 5, "name": "Wrap", "calories": 410, "restaurant": 2}],
            "created_at": "2025-05-01T12:00:00Z"
        }"#;
        let meal: SavedMeal = serde_json::from_str(json).unwrap();
        assert_eq!(meal.restaurant.name, "B");
        assert_eq!(meal.menu_items[0].restaurant_id, 2);
        assert_eq!(meal.total_calories(), 410);
    }
}
