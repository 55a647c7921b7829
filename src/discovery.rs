use std::sync::Arc;

use tracing::{error, info};

use crate::api::RestaurantDirectory;
use crate::error::{MealError, Result};
use crate::models::{Coordinate, Restaurant};

/// Which restaurants a discovery should return.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DiscoveryMode {
    Nearby(Coordinate),
    AllSupported,
}

/// Produces the candidate restaurant set for one recommendation run.
pub struct RestaurantDiscoveryClient {
    directory: Arc<dyn RestaurantDirectory>,
}

impl RestaurantDiscoveryClient {
    pub fn new(directory: Arc<dyn RestaurantDirectory>) -> Self {
        Self { directory }
    }

    /// Fetch restaurants for `mode`. An empty list is a valid answer.
    ///
    /// Every failure is reported as [`MealError::DiscoveryUnavailable`].
    pub async fn discover(&self, mode: DiscoveryMode) -> Result<Vec<Restaurant>> {
        let result = match mode {
            DiscoveryMode::Nearby(at) => self.directory.nearby(at).await,
            DiscoveryMode::AllSupported => self.directory.supported().await,
        };

        match result {
            Ok(restaurants) => {
                info!(?mode, count = restaurants.len(), "discovered restaurants");
                Ok(restaurants)
            }
            Err(MealError::DiscoveryUnavailable(reason)) => {
                error!(?mode, %reason, "restaurant discovery failed");
                Err(MealError::DiscoveryUnavailable(reason))
            }
            Err(other) => {
                error!(?mode, error = %other, "restaurant discovery failed");
                Err(MealError::DiscoveryUnavailable(other.to_string()))
            }
        }
    }
}
