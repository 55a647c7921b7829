use std::sync::Arc;

use futures_util::future::join_all;
use tracing::{debug, info, warn};

use crate::api::RecommendationSource;
use crate::engine::sampling::SampleSelector;
use crate::error::Result;
use crate::models::{AggregatedResultSet, MealCombination, Restaurant};

/// Fans one recommendation request out per restaurant and merges what comes back.
pub struct RecommendationAggregator {
    source: Arc<dyn RecommendationSource>,
    selector: SampleSelector,
}

impl RecommendationAggregator {
    pub fn new(source: Arc<dyn RecommendationSource>, selector: SampleSelector) -> Self {
        Self { source, selector }
    }

    /// Request combinations from every restaurant concurrently and merge them.
    ///
    /// All requests are awaited regardless of individual outcome. A restaurant whose
    /// request fails contributes nothing. Output follows the order of `restaurants`,
    /// never completion order, and each restaurant's list is sampled before merging.
    pub async fn aggregate(
        &self,
        restaurants: &[Restaurant],
        calorie_limit: u32,
    ) -> AggregatedResultSet {
        if restaurants.is_empty() {
            return AggregatedResultSet::default();
        }

        let requests = restaurants
            .iter()
            .map(|restaurant| self.settle(restaurant, calorie_limit));
        let per_restaurant = join_all(requests).await;

        let responded = per_restaurant.iter().filter(|c| !c.is_empty()).count();
        let combinations: Vec<MealCombination> = per_restaurant
            .iter()
            .flat_map(|combos| self.selector.sample(combos))
            .collect();

        info!(
            restaurants = restaurants.len(),
            responded,
            combinations = combinations.len(),
            calorie_limit,
            "aggregated recommendations"
        );

        AggregatedResultSet::new(combinations)
    }

    /// Unsampled recommendations for a single restaurant, in provider order.
    ///
    /// Unlike [`aggregate`](Self::aggregate), failures are returned to the caller.
    pub async fn recommend_for(
        &self,
        restaurant: &Restaurant,
        calorie_limit: u32,
    ) -> Result<Vec<MealCombination>> {
        let lists = self.source.recommend(restaurant.id, calorie_limit).await?;
        Ok(lists
            .into_iter()
            .map(|items| MealCombination::from_items(restaurant, items))
            .collect())
    }

    /// One restaurant's request with its failure folded into an empty contribution.
    async fn settle(&self, restaurant: &Restaurant, calorie_limit: u32) -> Vec<MealCombination> {
        match self.recommend_for(restaurant, calorie_limit).await {
            Ok(combos) => {
                debug!(
                    restaurant_id = restaurant.id,
                    count = combos.len(),
                    "restaurant responded"
                );
                combos
            }
            Err(e) => {
                warn!(
                    restaurant_id = restaurant.id,
                    restaurant = %restaurant.name,
                    error = %e,
                    "no recommendations from restaurant"
                );
                Vec::new()
            }
        }
    }
}
