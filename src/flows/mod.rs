//! User-facing workflows that tie discovery, aggregation, and selection state together.

pub mod meals;
pub mod recommend;
pub mod restaurants;

pub use meals::SavedMeals;
pub use recommend::{RecommendationSession, RefreshOutcome};
pub use restaurants::{RestaurantBrowser, ToggleOutcome};

use crate::discovery::DiscoveryMode;
use crate::error::Result;
use crate::location::GeoLocationResolver;

/// Which restaurants a flow should start from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryScope {
    /// Restaurants near the user's current position.
    Nearby,
    /// Every supported restaurant; no location needed.
    AllSupported,
}

impl DiscoveryScope {
    /// Resolve the user's position when the scope needs one.
    pub async fn into_mode(self, resolver: &GeoLocationResolver) -> Result<DiscoveryMode> {
        match self {
            DiscoveryScope::Nearby => Ok(DiscoveryMode::Nearby(resolver.resolve().await?)),
            DiscoveryScope::AllSupported => Ok(DiscoveryMode::AllSupported),
        }
    }
}
