use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, info};

use crate::api::MealStore;
use crate::discovery::RestaurantDiscoveryClient;
use crate::engine::RecommendationAggregator;
use crate::error::{MealError, Result};
use crate::flows::DiscoveryScope;
use crate::location::GeoLocationResolver;
use crate::models::{AggregatedResultSet, Restaurant};
use crate::state::{
    Generation, RequestGeneration, SelectionStateTracker, SelectionStatus, SessionContext,
    Submission,
};

/// Result of one [`RecommendationSession::refresh`].
#[derive(Debug, Clone)]
pub enum RefreshOutcome {
    /// This invocation was the latest and its results are now displayed.
    Applied(Arc<AggregatedResultSet>),
    /// A newer invocation started first; these results were dropped.
    Superseded(Generation),
}

/// Results currently on display together with their save states.
#[derive(Clone)]
struct Published {
    generation: Generation,
    results: Arc<AggregatedResultSet>,
    selections: Arc<SelectionStateTracker<usize>>,
}

/// Locate → discover → aggregate → display, plus saving displayed combinations.
pub struct RecommendationSession {
    resolver: GeoLocationResolver,
    discovery: RestaurantDiscoveryClient,
    aggregator: RecommendationAggregator,
    meals: Arc<dyn MealStore>,
    session: Arc<SessionContext>,
    generations: RequestGeneration,
    displayed: RwLock<Option<Published>>,
}

impl RecommendationSession {
    pub fn new(
        resolver: GeoLocationResolver,
        discovery: RestaurantDiscoveryClient,
        aggregator: RecommendationAggregator,
        meals: Arc<dyn MealStore>,
        session: Arc<SessionContext>,
    ) -> Self {
        Self {
            resolver,
            discovery,
            aggregator,
            meals,
            session,
            generations: RequestGeneration::new(),
            displayed: RwLock::new(None),
        }
    }

    /// Run a full discovery and publish the results if no newer run started meanwhile.
    ///
    /// Location and discovery failures are returned to the caller, unless a newer
    /// run has already superseded this one.
    pub async fn refresh(
        &self,
        scope: DiscoveryScope,
        calorie_limit: u32,
    ) -> Result<RefreshOutcome> {
        validate_calorie_limit(calorie_limit)?;

        let generation = self.generations.begin();
        debug!(
            generation = generation.value(),
            ?scope,
            calorie_limit,
            "refresh started"
        );

        match self.run(scope, calorie_limit).await {
            Ok(results) => Ok(self.publish(generation, results)),
            Err(e) if !self.generations.is_current(generation) => {
                debug!(generation = generation.value(), error = %e, "stale refresh failed");
                Ok(RefreshOutcome::Superseded(generation))
            }
            Err(e) => Err(e),
        }
    }

    async fn run(&self, scope: DiscoveryScope, calorie_limit: u32) -> Result<AggregatedResultSet> {
        let mode = scope.into_mode(&self.resolver).await?;
        let restaurants = self.discovery.discover(mode).await?;
        Ok(self.aggregator.aggregate(&restaurants, calorie_limit).await)
    }

    fn publish(&self, generation: Generation, results: AggregatedResultSet) -> RefreshOutcome {
        let mut displayed = self
            .displayed
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        if !self.generations.is_current(generation) {
            info!(
                generation = generation.value(),
                "dropping results from a superseded refresh"
            );
            return RefreshOutcome::Superseded(generation);
        }

        let results = Arc::new(results);
        *displayed = Some(Published {
            generation,
            results: Arc::clone(&results),
            selections: Arc::new(SelectionStateTracker::new()),
        });
        RefreshOutcome::Applied(results)
    }

    fn published(&self) -> Option<Published> {
        self.displayed
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The result set currently on display.
    pub fn results(&self) -> Option<Arc<AggregatedResultSet>> {
        self.published().map(|p| p.results)
    }

    /// Generation of the result set currently on display.
    pub fn displayed_generation(&self) -> Option<Generation> {
        self.published().map(|p| p.generation)
    }

    /// Save state of the combination at `index` in the displayed results.
    pub fn status_of(&self, index: usize) -> SelectionStatus {
        self.published()
            .map(|p| p.selections.status_of(&index))
            .unwrap_or_default()
    }

    /// Persist the displayed combination at `index` for the signed-in user.
    ///
    /// Repeated calls while a save is in flight, or after it committed, send nothing.
    pub async fn save_combination(&self, index: usize) -> Result<Submission> {
        self.session.require_user()?;

        let published = self.published().ok_or_else(|| {
            MealError::InvalidInput("no recommendations are displayed".to_string())
        })?;
        let combo = published.results.get(index).cloned().ok_or_else(|| {
            MealError::InvalidInput(format!("there is no meal option {}", index + 1))
        })?;

        let meals = Arc::clone(&self.meals);
        let outcome = published
            .selections
            .submit(index, move || async move {
                let item_ids = combo.menu_item_ids();
                meals.save_meal(combo.restaurant_id, &item_ids).await
            })
            .await?;

        if outcome == Submission::Committed {
            info!(index, "meal saved");
        }
        Ok(outcome)
    }

    /// Show every combination one restaurant offers, unsampled, as the displayed set.
    ///
    /// The list gets its own save states, like any other refresh.
    pub async fn refresh_restaurant(
        &self,
        restaurant: &Restaurant,
        calorie_limit: u32,
    ) -> Result<RefreshOutcome> {
        validate_calorie_limit(calorie_limit)?;

        let generation = self.generations.begin();
        debug!(
            generation = generation.value(),
            restaurant_id = restaurant.id,
            calorie_limit,
            "single restaurant refresh started"
        );

        let combos = self.aggregator.recommend_for(restaurant, calorie_limit);
        match combos.await.map(AggregatedResultSet::new) {
            Ok(results) => Ok(self.publish(generation, results)),
            Err(e) if !self.generations.is_current(generation) => {
                debug!(generation = generation.value(), error = %e, "stale refresh failed");
                Ok(RefreshOutcome::Superseded(generation))
            }
            Err(e) => Err(e),
        }
    }
}

fn validate_calorie_limit(calorie_limit: u32) -> Result<()> {
    if calorie_limit == 0 {
        return Err(MealError::InvalidInput(
            "calorie limit must be greater than 0".to_string(),
        ));
    }
    Ok(())
}
