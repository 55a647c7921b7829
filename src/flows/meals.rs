use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::info;

use crate::api::{MealStore, RestaurantDirectory};
use crate::error::{MealError, Result};
use crate::models::{MenuItem, MenuItemId, RestaurantId, SavedMeal};
use crate::state::{SelectionStateTracker, SessionContext, Submission};

/// The signed-in user's saved meals, plus building a meal by hand.
///
/// Unlike favorites, local state only changes after the server acknowledges.
pub struct SavedMeals {
    store: Arc<dyn MealStore>,
    directory: Arc<dyn RestaurantDirectory>,
    session: Arc<SessionContext>,
    meals: RwLock<Vec<SavedMeal>>,
    deletions: SelectionStateTracker<i64>,
}

impl SavedMeals {
    pub fn new(
        store: Arc<dyn MealStore>,
        directory: Arc<dyn RestaurantDirectory>,
        session: Arc<SessionContext>,
    ) -> Self {
        Self {
            store,
            directory,
            session,
            meals: RwLock::new(Vec::new()),
            deletions: SelectionStateTracker::new(),
        }
    }

    pub async fn load(&self) -> Result<Vec<SavedMeal>> {
        self.session.require_user()?;
        let meals = self.store.list_meals().await?;
        info!(count = meals.len(), "loaded saved meals");
        *self.meals.write().unwrap_or_else(PoisonError::into_inner) = meals.clone();
        Ok(meals)
    }

    pub fn meals(&self) -> Vec<SavedMeal> {
        self.meals
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Delete a saved meal; it disappears locally once the server confirms.
    pub async fn delete(&self, meal_id: i64) -> Result<Submission> {
        self.session.require_user()?;

        let store = Arc::clone(&self.store);
        let outcome = self
            .deletions
            .submit(meal_id, move || async move {
                store.delete_meal(meal_id).await
            })
            .await?;

        if outcome == Submission::Committed {
            self.meals
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .retain(|m| m.id != meal_id);
            info!(meal_id, "deleted saved meal");
        }
        Ok(outcome)
    }

    pub async fn menu(&self, restaurant_id: RestaurantId) -> Result<Vec<MenuItem>> {
        self.directory.menu(restaurant_id).await
    }

    /// Save a hand-picked set of items from one restaurant's menu.
    ///
    /// Duplicate ids collapse to one; every id must be on that restaurant's menu.
    pub async fn build(&self, restaurant_id: RestaurantId, item_ids: &[MenuItemId]) -> Result<()> {
        self.session.require_user()?;

        let mut seen = HashSet::new();
        let picked: Vec<MenuItemId> = item_ids
            .iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect();
        if picked.is_empty() {
            return Err(MealError::InvalidInput(
                "pick at least one menu item".to_string(),
            ));
        }

        let menu = self.directory.menu(restaurant_id).await?;
        let on_menu: HashSet<MenuItemId> = menu.iter().map(|i| i.id).collect();
        if let Some(missing) = picked.iter().find(|id| !on_menu.contains(id)) {
            return Err(MealError::InvalidInput(format!(
                "item {missing} is not on restaurant {restaurant_id}'s menu"
            )));
        }

        self.store.save_meal(restaurant_id, &picked).await?;
        info!(restaurant_id, items = picked.len(), "saved custom meal");
        Ok(())
    }
}
