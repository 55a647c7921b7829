//! Service seams between the engine and the meal-recommendation backend.
//!
//! Each trait covers one concern so flows only depend on what they call and tests
//! can substitute small in-memory fakes. [`HttpMealApi`] implements all of them
//! against the REST backend.

mod http;

pub use http::HttpMealApi;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Coordinate, MenuItem, MenuItemId, Restaurant, RestaurantId, SavedMeal, User};

/// Restaurant listings.
#[async_trait]
pub trait RestaurantDirectory: Send + Sync {
    /// Restaurants near a coordinate.
    async fn nearby(&self, at: Coordinate) -> Result<Vec<Restaurant>>;

    /// Every restaurant the backend has menu data for.
    async fn supported(&self) -> Result<Vec<Restaurant>>;

    /// Full menu for one restaurant.
    async fn menu(&self, restaurant_id: RestaurantId) -> Result<Vec<MenuItem>>;
}

/// Per-restaurant meal recommendations.
#[async_trait]
pub trait RecommendationSource: Send + Sync {
    /// Combinations for one restaurant, in provider rank order.
    ///
    /// Each inner vector is one combination's items.
    async fn recommend(
        &self,
        restaurant_id: RestaurantId,
        calorie_limit: u32,
    ) -> Result<Vec<Vec<MenuItem>>>;
}

/// Saved meal persistence for the signed-in user.
#[async_trait]
pub trait MealStore: Send + Sync {
    async fn save_meal(
        &self,
        restaurant_id: RestaurantId,
        menu_item_ids: &[MenuItemId],
    ) -> Result<()>;

    async fn list_meals(&self) -> Result<Vec<SavedMeal>>;

    async fn delete_meal(&self, meal_id: i64) -> Result<()>;
}

/// Favorite restaurants for the signed-in user.
#[async_trait]
pub trait FavoriteStore: Send + Sync {
    async fn favorite_ids(&self) -> Result<Vec<RestaurantId>>;

    async fn add_favorite(&self, restaurant_id: RestaurantId) -> Result<()>;

    async fn remove_favorite(&self, restaurant_id: RestaurantId) -> Result<()>;
}

/// Who is signed in.
#[async_trait]
pub trait AccountSource: Send + Sync {
    /// `Ok(None)` when the backend reports no authenticated session.
    async fn current_user(&self) -> Result<Option<User>>;
}
