use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{info, warn};

use crate::api::FavoriteStore;
use crate::error::Result;
use crate::models::RestaurantId;

/// The user's favorite restaurants as currently shown.
///
/// Seeded once from the server, then flipped optimistically by
/// [`FavoriteToggleController`]. Reads can happen while a toggle is in flight.
#[derive(Debug, Default)]
pub struct FavoriteSet {
    ids: RwLock<HashSet<RestaurantId>>,
}

impl FavoriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole set with the server's authoritative list.
    pub fn reconcile(&self, ids: impl IntoIterator<Item = RestaurantId>) {
        let mut set = self.ids.write().unwrap_or_else(PoisonError::into_inner);
        *set = ids.into_iter().collect();
    }

    pub fn clear(&self) {
        self.ids
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn contains(&self, restaurant_id: RestaurantId) -> bool {
        self.ids
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&restaurant_id)
    }

    /// Force one entry to a given favorite status.
    pub fn set(&self, restaurant_id: RestaurantId, favorite: bool) {
        let mut set = self.ids.write().unwrap_or_else(PoisonError::into_inner);
        if favorite {
            set.insert(restaurant_id);
        } else {
            set.remove(&restaurant_id);
        }
    }

    pub fn len(&self) -> usize {
        self.ids
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sorted snapshot of the current ids.
    pub fn snapshot(&self) -> Vec<RestaurantId> {
        let mut ids: Vec<_> = self
            .ids
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .copied()
            .collect();
        ids.sort_unstable();
        ids
    }
}

/// Optimistic add/remove of favorite restaurants.
///
/// The set is flipped before the server answers. If the call fails the error is
/// returned and the set is left flipped: reverting it is the caller's job.
pub struct FavoriteToggleController {
    store: Arc<dyn FavoriteStore>,
}

impl FavoriteToggleController {
    pub fn new(store: Arc<dyn FavoriteStore>) -> Self {
        Self { store }
    }

    /// Flip `restaurant_id` and persist the change. Returns the new status.
    pub async fn toggle(
        &self,
        favorites: &FavoriteSet,
        restaurant_id: RestaurantId,
        currently_favorite: bool,
    ) -> Result<bool> {
        let target = !currently_favorite;
        favorites.set(restaurant_id, target);

        let outcome = if target {
            self.store.add_favorite(restaurant_id).await
        } else {
            self.store.remove_favorite(restaurant_id).await
        };

        match outcome {
            Ok(()) => {
                info!(restaurant_id, favorite = target, "favorite updated");
                Ok(target)
            }
            Err(e) => {
                warn!(restaurant_id, favorite = target, error = %e, "favorite update failed");
                Err(e)
            }
        }
    }
}
