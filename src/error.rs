use thiserror::Error;

use crate::models::RestaurantId;

/// Failures reported by the device location capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("Location is not supported on this device")]
    Unavailable,

    #[error("Location permission was denied")]
    Denied,

    #[error("Timed out waiting for a location fix")]
    Timeout,
}

#[derive(Debug, Error)]
pub enum MealError {
    #[error("{0}")]
    Location(#[from] LocationError),

    #[error("Could not fetch restaurants: {0}")]
    DiscoveryUnavailable(String),

    #[error("No recommendations for restaurant {restaurant_id}: {reason}")]
    RecommendationUnavailable {
        restaurant_id: RestaurantId,
        reason: String,
    },

    #[error("Could not save changes: {0}")]
    PersistenceFailed(String),

    #[error("You need to be signed in to do that")]
    AuthRequired,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl MealError {
    /// True when the caller should route to a sign-in prompt instead of a generic error.
    pub fn is_auth_required(&self) -> bool {
        matches!(self, MealError::AuthRequired)
    }
}

pub type Result<T> = std::result::Result<T, MealError>;
