use std::sync::{Arc, PoisonError, RwLock};

use tracing::{info, warn};

use crate::api::FavoriteStore;
use crate::discovery::RestaurantDiscoveryClient;
use crate::error::{MealError, Result};
use crate::flows::DiscoveryScope;
use crate::location::GeoLocationResolver;
use crate::models::{normalize_search, Restaurant, RestaurantId};
use crate::state::{
    FavoriteSet, FavoriteToggleController, SelectionStateTracker, SessionContext, Submission,
};

/// What [`RestaurantBrowser::toggle_favorite`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The server accepted the change; this is the new favorite status.
    Updated(bool),
    /// A toggle for this restaurant is still in flight; nothing was sent.
    InFlight,
}

/// Restaurant listing with favorites pinned to the top.
pub struct RestaurantBrowser {
    resolver: GeoLocationResolver,
    discovery: RestaurantDiscoveryClient,
    store: Arc<dyn FavoriteStore>,
    controller: FavoriteToggleController,
    session: Arc<SessionContext>,
    favorites: FavoriteSet,
    restaurants: RwLock<Vec<Restaurant>>,
    in_flight: SelectionStateTracker<RestaurantId>,
}

impl RestaurantBrowser {
    pub fn new(
        resolver: GeoLocationResolver,
        discovery: RestaurantDiscoveryClient,
        store: Arc<dyn FavoriteStore>,
        session: Arc<SessionContext>,
    ) -> Self {
        Self {
            resolver,
            discovery,
            controller: FavoriteToggleController::new(Arc::clone(&store)),
            store,
            session,
            favorites: FavoriteSet::new(),
            restaurants: RwLock::new(Vec::new()),
            in_flight: SelectionStateTracker::new(),
        }
    }

    /// Seed favorites from the server. A rejected session counts as signed out.
    pub async fn load_favorites(&self) -> Result<()> {
        if !self.session.is_signed_in() {
            self.favorites.clear();
            return Ok(());
        }

        match self.store.favorite_ids().await {
            Ok(ids) => {
                info!(count = ids.len(), "loaded favorites");
                self.favorites.reconcile(ids);
                Ok(())
            }
            Err(MealError::AuthRequired) => {
                warn!("session was rejected; continuing signed out");
                self.session.clear();
                self.favorites.clear();
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Load favorites and restaurants; favorites come first, otherwise discovery order.
    pub async fn load(&self, scope: DiscoveryScope) -> Result<Vec<Restaurant>> {
        self.load_favorites().await?;

        let mode = scope.into_mode(&self.resolver).await?;
        let mut restaurants = self.discovery.discover(mode).await?;
        restaurants.sort_by_key(|r| !self.favorites.contains(r.id));

        let mut cached = self
            .restaurants
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *cached = restaurants.clone();
        Ok(restaurants)
    }

    pub fn find(&self, restaurant_id: RestaurantId) -> Option<Restaurant> {
        self.restaurants
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|r| r.id == restaurant_id)
            .cloned()
    }

    /// Loaded restaurants whose normalized name contains the normalized query.
    pub fn filter(&self, query: &str) -> Vec<Restaurant> {
        let needle = normalize_search(query);
        self.restaurants
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|r| r.search_key().contains(&needle))
            .cloned()
            .collect()
    }

    pub fn is_favorite(&self, restaurant_id: RestaurantId) -> bool {
        self.favorites.contains(restaurant_id)
    }

    pub fn favorites(&self) -> &FavoriteSet {
        &self.favorites
    }

    /// Make sure a restaurant is (or is not) a favorite; no call if it already is.
    pub async fn set_favorite(
        &self,
        restaurant_id: RestaurantId,
        favorite: bool,
    ) -> Result<ToggleOutcome> {
        self.session.require_user()?;
        if self.favorites.contains(restaurant_id) == favorite {
            return Ok(ToggleOutcome::Updated(favorite));
        }
        self.toggle_favorite(restaurant_id).await
    }

    /// Flip a restaurant's favorite status.
    ///
    /// The displayed set changes immediately. If the server rejects the change, or the
    /// call is abandoned before it resolves, the entry is put back to what it was.
    pub async fn toggle_favorite(&self, restaurant_id: RestaurantId) -> Result<ToggleOutcome> {
        self.session.require_user()?;

        let currently_favorite = self.favorites.contains(restaurant_id);
        let controller = &self.controller;
        let favorites = &self.favorites;
        let rollback = Rollback {
            favorites,
            restaurant_id,
            previous: currently_favorite,
            armed: true,
        };

        let result = self
            .in_flight
            .submit(restaurant_id, move || async move {
                controller
                    .toggle(favorites, restaurant_id, currently_favorite)
                    .await
                    .map(|_| ())
            })
            .await;

        match result {
            Ok(Submission::AlreadyPending) => {
                rollback.disarm();
                Ok(ToggleOutcome::InFlight)
            }
            Ok(Submission::Committed | Submission::AlreadyCommitted) => {
                rollback.disarm();
                self.in_flight.release(&restaurant_id);
                let favorite = self.favorites.contains(restaurant_id);
                Ok(ToggleOutcome::Updated(favorite))
            }
            Err(e) => {
                drop(rollback);
                self.in_flight.release(&restaurant_id);
                Err(e)
            }
        }
    }
}

/// Puts one favorite entry back unless disarmed.
struct Rollback<'a> {
    favorites: &'a FavoriteSet,
    restaurant_id: RestaurantId,
    previous: bool,
    armed: bool,
}

impl Rollback<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for Rollback<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.favorites.set(self.restaurant_id, self.previous);
        }
    }
}
