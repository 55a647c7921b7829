#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use meal_finder_rs::api::{
    AccountSource, FavoriteStore, MealStore, RecommendationSource, RestaurantDirectory,
};
use meal_finder_rs::discovery::RestaurantDiscoveryClient;
use meal_finder_rs::engine::{RecommendationAggregator, SampleSelector};
use meal_finder_rs::error::{MealError, Result};
use meal_finder_rs::flows::{RecommendationSession, RestaurantBrowser, SavedMeals};
use meal_finder_rs::location::{FixedLocation, GeoLocationResolver};
use meal_finder_rs::models::{
    Coordinate, MenuItem, MenuItemId, Restaurant, RestaurantId, SavedMeal, User,
};
use meal_finder_rs::state::SessionContext;

/// How the fake answers a recommendation request for one restaurant.
#[derive(Debug, Clone)]
pub enum Reply {
    Combos {
        delay: Duration,
        combos: Vec<Vec<MenuItem>>,
    },
    Fail,
}

/// In-memory backend implementing every service seam.
#[derive(Default)]
pub struct FakeBackend {
    pub restaurants: Vec<Restaurant>,
    /// Per-call discovery answers, consumed front to back before `restaurants` is used.
    pub scripted_discovery: Mutex<VecDeque<(Duration, Vec<Restaurant>)>>,
    pub discovery_fails: bool,
    pub discovery_calls: AtomicUsize,

    pub replies: HashMap<RestaurantId, Reply>,
    pub recommend_calls: AtomicUsize,

    pub menus: HashMap<RestaurantId, Vec<MenuItem>>,
    pub user: Option<User>,

    pub saves: Mutex<Vec<(RestaurantId, Vec<MenuItemId>)>>,
    pub saves_fail: AtomicBool,
    pub save_gate: Option<Arc<Notify>>,

    pub meals: Mutex<Vec<SavedMeal>>,
    pub deletes_fail: AtomicBool,
    pub delete_calls: AtomicUsize,

    pub favorites: Mutex<HashSet<RestaurantId>>,
    pub favorites_fail: AtomicBool,
    pub reject_session: bool,
    pub favorite_calls: AtomicUsize,
    pub favorite_gate: Option<Arc<Notify>>,
}

impl FakeBackend {
    pub fn saved(&self) -> Vec<(RestaurantId, Vec<MenuItemId>)> {
        self.saves.lock().unwrap().clone()
    }

    pub fn server_favorites(&self) -> Vec<RestaurantId> {
        let mut ids: Vec<_> = self.favorites.lock().unwrap().iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    async fn listing(&self) -> Result<Vec<Restaurant>> {
        self.discovery_calls.fetch_add(1, Ordering::SeqCst);
        if self.discovery_fails {
            return Err(MealError::DiscoveryUnavailable(
                "connection refused".to_string(),
            ));
        }

        let scripted = self.scripted_discovery.lock().unwrap().pop_front();
        match scripted {
            Some((delay, restaurants)) => {
                tokio::time::sleep(delay).await;
                Ok(restaurants)
            }
            None => Ok(self.restaurants.clone()),
        }
    }

    async fn update_favorite(&self, restaurant_id: RestaurantId, add: bool) -> Result<()> {
        self.favorite_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.favorite_gate {
            gate.notified().await;
        }
        if self.favorites_fail.load(Ordering::SeqCst) {
            return Err(MealError::PersistenceFailed("HTTP 500".to_string()));
        }

        let mut favorites = self.favorites.lock().unwrap();
        if add {
            favorites.insert(restaurant_id);
        } else {
            favorites.remove(&restaurant_id);
        }
        Ok(())
    }
}

#[async_trait]
impl RestaurantDirectory for FakeBackend {
    async fn nearby(&self, _at: Coordinate) -> Result<Vec<Restaurant>> {
        self.listing().await
    }

    async fn supported(&self) -> Result<Vec<Restaurant>> {
        self.listing().await
    }

    async fn menu(&self, restaurant_id: RestaurantId) -> Result<Vec<MenuItem>> {
        self.menus.get(&restaurant_id).cloned().ok_or_else(|| {
            MealError::DiscoveryUnavailable(format!("restaurant {restaurant_id} not found"))
        })
    }
}

#[async_trait]
impl RecommendationSource for FakeBackend {
    async fn recommend(
        &self,
        restaurant_id: RestaurantId,
        _calorie_limit: u32,
    ) -> Result<Vec<Vec<MenuItem>>> {
        self.recommend_calls.fetch_add(1, Ordering::SeqCst);

        match self.replies.get(&restaurant_id) {
            Some(Reply::Combos { delay, combos }) => {
                if !delay.is_zero() {
                    tokio::time::sleep(*delay).await;
                }
                Ok(combos.clone())
            }
            Some(Reply::Fail) | None => Err(MealError::RecommendationUnavailable {
                restaurant_id,
                reason: "HTTP 502".to_string(),
            }),
        }
    }
}

#[async_trait]
impl MealStore for FakeBackend {
    async fn save_meal(
        &self,
        restaurant_id: RestaurantId,
        menu_item_ids: &[MenuItemId],
    ) -> Result<()> {
        self.saves
            .lock()
            .unwrap()
            .push((restaurant_id, menu_item_ids.to_vec()));
        if let Some(gate) = &self.save_gate {
            gate.notified().await;
        }
        if self.saves_fail.load(Ordering::SeqCst) {
            return Err(MealError::PersistenceFailed("HTTP 500".to_string()));
        }
        Ok(())
    }

    async fn list_meals(&self) -> Result<Vec<SavedMeal>> {
        Ok(self.meals.lock().unwrap().clone())
    }

    async fn delete_meal(&self, meal_id: i64) -> Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.deletes_fail.load(Ordering::SeqCst) {
            return Err(MealError::PersistenceFailed("HTTP 500".to_string()));
        }
        self.meals.lock().unwrap().retain(|m| m.id != meal_id);
        Ok(())
    }
}

#[async_trait]
impl FavoriteStore for FakeBackend {
    async fn favorite_ids(&self) -> Result<Vec<RestaurantId>> {
        if self.reject_session {
            return Err(MealError::AuthRequired);
        }
        Ok(self.server_favorites())
    }

    async fn add_favorite(&self, restaurant_id: RestaurantId) -> Result<()> {
        self.update_favorite(restaurant_id, true).await
    }

    async fn remove_favorite(&self, restaurant_id: RestaurantId) -> Result<()> {
        self.update_favorite(restaurant_id, false).await
    }
}

#[async_trait]
impl AccountSource for FakeBackend {
    async fn current_user(&self) -> Result<Option<User>> {
        Ok(self.user.clone())
    }
}

pub fn restaurant(id: RestaurantId, name: &str) -> Restaurant {
    Restaurant::new(id, name)
}

pub fn item(id: MenuItemId, name: &str, calories: u32) -> MenuItem {
    MenuItem {
        id,
        name: name.to_string(),
        calories,
        restaurant_id: 0,
    }
}

/// `count` single-item combinations with distinct item ids starting at `first_id`.
pub fn combos(first_id: MenuItemId, count: usize) -> Vec<Vec<MenuItem>> {
    (0..count as i64)
        .map(|i| vec![item(first_id + i, &format!("Item {}", first_id + i), 300)])
        .collect()
}

pub fn reply(combos: Vec<Vec<MenuItem>>) -> Reply {
    Reply::Combos {
        delay: Duration::ZERO,
        combos,
    }
}

pub fn delayed(millis: u64, combos: Vec<Vec<MenuItem>>) -> Reply {
    Reply::Combos {
        delay: Duration::from_millis(millis),
        combos,
    }
}

pub fn user() -> User {
    User {
        id: 1,
        username: "alice".to_string(),
    }
}

pub fn saved_meal(id: i64, restaurant: Restaurant, items: Vec<MenuItem>) -> SavedMeal {
    SavedMeal {
        id,
        restaurant,
        menu_items: items,
        created_at: "2026-10-01T12:00:00Z".to_string(),
    }
}

pub fn fixed_resolver() -> GeoLocationResolver {
    let here = Coordinate::new(40.4237, -86.9212).unwrap();
    GeoLocationResolver::new(Some(Arc::new(FixedLocation(here))), Duration::from_secs(5))
}

pub fn no_location() -> GeoLocationResolver {
    GeoLocationResolver::new(None, Duration::from_secs(5))
}

/// Session context after start-up has loaded whoever the backend reports.
pub async fn session_for(backend: &Arc<FakeBackend>) -> Arc<SessionContext> {
    let session = Arc::new(SessionContext::new(backend.clone()));
    session.init().await.unwrap();
    session
}

pub fn aggregator(backend: &Arc<FakeBackend>, cap: usize) -> RecommendationAggregator {
    RecommendationAggregator::new(backend.clone(), SampleSelector::seeded(cap, 7).unwrap())
}

pub async fn recommendation_session(
    backend: &Arc<FakeBackend>,
    resolver: GeoLocationResolver,
) -> RecommendationSession {
    RecommendationSession::new(
        resolver,
        RestaurantDiscoveryClient::new(backend.clone()),
        aggregator(backend, 5),
        backend.clone(),
        session_for(backend).await,
    )
}

pub async fn browser(backend: &Arc<FakeBackend>) -> RestaurantBrowser {
    RestaurantBrowser::new(
        no_location(),
        RestaurantDiscoveryClient::new(backend.clone()),
        backend.clone(),
        session_for(backend).await,
    )
}

pub async fn saved_meals(backend: &Arc<FakeBackend>) -> SavedMeals {
    SavedMeals::new(backend.clone(), backend.clone(), session_for(backend).await)
}
