use std::sync::Arc;

use async_trait::async_trait;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::REFERER;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::api::{
    AccountSource, FavoriteStore, MealStore, RecommendationSource, RestaurantDirectory,
};
use crate::config::ClientConfig;
use crate::engine::constants::{CSRF_COOKIE, CSRF_HEADER, SESSION_COOKIE};
use crate::error::{MealError, Result};
use crate::models::{Coordinate, MenuItem, MenuItemId, Restaurant, RestaurantId, SavedMeal, User};

#[derive(Debug, Deserialize)]
struct RecommendResponse {
    #[serde(default)]
    recommended_meals: Vec<RecommendedMeal>,
}

#[derive(Debug, Deserialize)]
struct RecommendedMeal {
    items: Vec<MenuItem>,
}

#[derive(Debug, Deserialize)]
struct FavoritesResponse {
    #[serde(default)]
    favorite_restaurants: Vec<Restaurant>,
}

/// REST client for the meal-recommendation backend.
///
/// Cookies (session and anti-forgery token) live in a shared jar, so every request
/// made through one instance belongs to the same browser-like session.
pub struct HttpMealApi {
    client: Client,
    base_url: Url,
    jar: Arc<Jar>,
}

impl HttpMealApi {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let base_url = Url::parse(&format!("{}/", config.api_url))
            .map_err(|e| MealError::Config(format!("invalid API URL {}: {e}", config.api_url)))?;

        let jar = Arc::new(Jar::default());
        if let Some(session) = &config.session_id {
            jar.add_cookie_str(&format!("{SESSION_COOKIE}={session}; Path=/"), &base_url);
        }

        let client = Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| MealError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            jar,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| MealError::Config(format!("invalid endpoint {path}: {e}")))
    }

    /// Read a cookie value for the API origin out of the jar.
    fn cookie(&self, name: &str) -> Option<String> {
        let header = self.jar.cookies(&self.base_url)?;
        let header = header.to_str().ok()?;
        header.split(';').find_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            (key == name).then(|| value.to_string())
        })
    }

    /// Fetch the anti-forgery token every mutating call must carry.
    async fn csrf_token(&self) -> Result<String> {
        let url = self.endpoint("users/csrf/")?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| MealError::PersistenceFailed(format!("csrf request failed: {e}")))?;
        ensure_success(response, MealError::PersistenceFailed).await?;

        self.cookie(CSRF_COOKIE).ok_or_else(|| {
            MealError::PersistenceFailed("backend did not issue an anti-forgery token".to_string())
        })
    }

    /// Send a mutating request with the anti-forgery header attached.
    async fn send_mutating(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<()> {
        let token = self.csrf_token().await?;
        let response = self
            .mutating_request(method, path, &token, body.as_ref())?
            .send()
            .await
            .map_err(|e| MealError::PersistenceFailed(format!("request failed: {e}")))?;

        ensure_success(response, MealError::PersistenceFailed).await?;
        Ok(())
    }

    /// Build a mutating request carrying the anti-forgery token.
    ///
    /// The backend rejects unsafe HTTPS requests without a same-origin `Referer`.
    fn mutating_request(
        &self,
        method: Method,
        path: &str,
        token: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<RequestBuilder> {
        let url = self.endpoint(path)?;
        debug!(%method, %url, "sending mutating request");

        let request = self
            .client
            .request(method, url)
            .header(CSRF_HEADER, token)
            .header(REFERER, self.base_url.as_str());
        Ok(match body {
            Some(body) => request.json(body),
            None => request,
        })
    }

    async fn get_json<T>(
        &self,
        request: RequestBuilder,
        on_error: fn(String) -> MealError,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = request
            .send()
            .await
            .map_err(|e| on_error(format!("request failed: {e}")))?;
        let response = ensure_success(response, on_error).await?;
        response
            .json()
            .await
            .map_err(|e| on_error(format!("failed to parse response: {e}")))
    }
}

/// Map a non-success status to an error. 401/403 always become [`MealError::AuthRequired`].
async fn ensure_success(response: Response, on_error: fn(String) -> MealError) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(MealError::AuthRequired);
    }

    let text = response.text().await.unwrap_or_default();
    warn!(%status, body_length = text.len(), "backend request failed");
    Err(on_error(format!("server responded with {status}")))
}

/// Non-success statuses on discovery are never auth prompts: listings are public.
async fn discovery_response(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    warn!(%status, "restaurant listing failed");
    Err(MealError::DiscoveryUnavailable(format!(
        "server responded with {status}"
    )))
}

fn discovery_error(e: reqwest::Error) -> MealError {
    MealError::DiscoveryUnavailable(e.to_string())
}

#[async_trait]
impl RestaurantDirectory for HttpMealApi {
    async fn nearby(&self, at: Coordinate) -> Result<Vec<Restaurant>> {
        let url = self.endpoint("restaurants/nearby/")?;
        let response = self
            .client
            .get(url)
            .query(&[("lat", at.latitude), ("lng", at.longitude)])
            .send()
            .await
            .map_err(discovery_error)?;
        discovery_response(response)
            .await?
            .json()
            .await
            .map_err(discovery_error)
    }

    async fn supported(&self) -> Result<Vec<Restaurant>> {
        let url = self.endpoint("restaurants/supported/")?;
        let response = self.client.get(url).send().await.map_err(discovery_error)?;
        discovery_response(response)
            .await?
            .json()
            .await
            .map_err(discovery_error)
    }

    async fn menu(&self, restaurant_id: RestaurantId) -> Result<Vec<MenuItem>> {
        let url = self.endpoint(&format!("menu-items/restaurant/{restaurant_id}/"))?;
        let mut items: Vec<MenuItem> = self
            .get_json(self.client.get(url), MealError::DiscoveryUnavailable)
            .await?;
        for item in &mut items {
            item.restaurant_id = restaurant_id;
        }
        Ok(items)
    }
}

#[async_trait]
impl RecommendationSource for HttpMealApi {
    async fn recommend(
        &self,
        restaurant_id: RestaurantId,
        calorie_limit: u32,
    ) -> Result<Vec<Vec<MenuItem>>> {
        let unavailable = |reason: String| MealError::RecommendationUnavailable {
            restaurant_id,
            reason,
        };

        let url = self.endpoint(&format!(
            "menu-items/recommend/{restaurant_id}/{calorie_limit}/"
        ))?;
        debug!(restaurant_id, calorie_limit, "requesting recommendations");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(unavailable(format!("server responded with {status}")));
        }

        let body: RecommendResponse = response
            .json()
            .await
            .map_err(|e| unavailable(format!("failed to parse response: {e}")))?;

        Ok(body
            .recommended_meals
            .into_iter()
            .map(|meal| meal.items)
            .collect())
    }
}

#[async_trait]
impl MealStore for HttpMealApi {
    async fn save_meal(
        &self,
        restaurant_id: RestaurantId,
        menu_item_ids: &[MenuItemId],
    ) -> Result<()> {
        let body = json!({ "restaurant_id": restaurant_id, "menu_item_ids": menu_item_ids });
        self.send_mutating(Method::POST, "users/me/meals/", Some(body))
            .await
    }

    async fn list_meals(&self) -> Result<Vec<SavedMeal>> {
        let url = self.endpoint("users/me/meals/")?;
        self.get_json(self.client.get(url), MealError::PersistenceFailed)
            .await
    }

    async fn delete_meal(&self, meal_id: i64) -> Result<()> {
        self.send_mutating(Method::DELETE, &format!("users/me/meals/{meal_id}/"), None)
            .await
    }
}

#[async_trait]
impl FavoriteStore for HttpMealApi {
    async fn favorite_ids(&self) -> Result<Vec<RestaurantId>> {
        let url = self.endpoint("users/me/favorites/")?;
        let body: FavoritesResponse = self
            .get_json(self.client.get(url), MealError::PersistenceFailed)
            .await?;
        Ok(body.favorite_restaurants.into_iter().map(|r| r.id).collect())
    }

    async fn add_favorite(&self, restaurant_id: RestaurantId) -> Result<()> {
        self.send_mutating(
            Method::POST,
            "users/me/favorites/",
            Some(json!({ "restaurant_id": restaurant_id })),
        )
        .await
    }

    async fn remove_favorite(&self, restaurant_id: RestaurantId) -> Result<()> {
        self.send_mutating(
            Method::DELETE,
            "users/me/favorites/",
            Some(json!({ "restaurant_id": restaurant_id })),
        )
        .await
    }
}

#[async_trait]
impl AccountSource for HttpMealApi {
    async fn current_user(&self) -> Result<Option<User>> {
        let url = self.endpoint("users/me/")?;
        match self
            .get_json(self.client.get(url), MealError::PersistenceFailed)
            .await
        {
            Ok(user) => Ok(Some(user)),
            Err(MealError::AuthRequired) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
