use clap::Parser;
use std::path::PathBuf;
use std::slice;
use std::sync::Arc;

use reqwest::Client;
use tracing::warn;

use meal_finder_rs::api::HttpMealApi;
use meal_finder_rs::cli::{Cli, Command, LocationArgs};
use meal_finder_rs::config::ClientConfig;
use meal_finder_rs::discovery::RestaurantDiscoveryClient;
use meal_finder_rs::engine::{RecommendationAggregator, SampleSelector};
use meal_finder_rs::error::{LocationError, MealError, Result};
use meal_finder_rs::flows::{
    DiscoveryScope, RecommendationSession, RefreshOutcome, RestaurantBrowser, SavedMeals,
    ToggleOutcome,
};
use meal_finder_rs::interface::{
    display_menu, display_recommendations, display_restaurants, display_saved_meals,
    prompt_calorie_limit, prompt_did_you_mean, prompt_save_choice, prompt_yes_no,
};
use meal_finder_rs::location::GeoLocationResolver;
use meal_finder_rs::logging;
use meal_finder_rs::state::{export_results, SessionContext, Submission};
use meal_finder_rs::Restaurant;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        match e {
            MealError::AuthRequired => {
                eprintln!("Sign in, then pass --session or set MEAL_FINDER_SESSION.");
            }
            MealError::Location(LocationError::Unavailable) => {
                eprintln!("Pass --lat/--lng or --locate-ip, or use --all to skip location.");
            }
            _ => {}
        }
        std::process::exit(1);
    }
}

#[tokio::main(flavor = "current_thread")]
async fn run(cli: Cli) -> Result<()> {
    let config = ClientConfig::from_cli(&cli)?;

    match cli.command.unwrap_or_default() {
        Command::Recommend {
            all,
            calories,
            per_restaurant,
            seed,
            restaurant,
            export,
            location,
        } => {
            let config = config
                .with_location(&location)?
                .with_sample_cap(per_restaurant)?;
            let options = RecommendOptions {
                all,
                calories,
                seed,
                restaurant,
                export,
            };
            cmd_recommend(&config, options).await
        }
        Command::Restaurants {
            all,
            search,
            location,
        } => cmd_restaurants(&config, all, search.as_deref(), &location).await,
        Command::Favorite { restaurant_id } => cmd_set_favorite(&config, restaurant_id, true).await,
        Command::Unfavorite { restaurant_id } => {
            cmd_set_favorite(&config, restaurant_id, false).await
        }
        Command::Meals => cmd_meals(&config).await,
        Command::DeleteMeal { meal_id } => cmd_delete_meal(&config, meal_id).await,
        Command::Menu { restaurant_id } => cmd_menu(&config, restaurant_id).await,
        Command::Build {
            restaurant_id,
            item_ids,
        } => cmd_build(&config, restaurant_id, &item_ids).await,
    }
}

struct RecommendOptions {
    all: bool,
    calories: Option<u32>,
    seed: Option<u64>,
    restaurant: Option<i64>,
    export: Option<PathBuf>,
}

/// The API client and the signed-in context every command shares.
struct Backend {
    api: Arc<HttpMealApi>,
    session: Arc<SessionContext>,
}

impl Backend {
    async fn connect(config: &ClientConfig) -> Result<Self> {
        let api = Arc::new(HttpMealApi::new(config)?);
        let session = Arc::new(SessionContext::new(api.clone()));

        // Being signed out is fine for browsing; only writes need a user.
        if let Err(e) = session.init().await {
            warn!(error = %e, "could not load the signed-in user");
        }

        Ok(Self { api, session })
    }

    fn resolver(&self, config: &ClientConfig) -> Result<GeoLocationResolver> {
        let client = Client::builder()
            .timeout(config.location_timeout)
            .build()
            .map_err(|e| MealError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(GeoLocationResolver::from_config(config, client))
    }

    fn discovery(&self) -> RestaurantDiscoveryClient {
        RestaurantDiscoveryClient::new(self.api.clone())
    }

    fn browser(&self, resolver: GeoLocationResolver) -> RestaurantBrowser {
        RestaurantBrowser::new(
            resolver,
            self.discovery(),
            self.api.clone(),
            self.session.clone(),
        )
    }

    fn saved_meals(&self) -> SavedMeals {
        SavedMeals::new(self.api.clone(), self.api.clone(), self.session.clone())
    }
}

fn scope(all: bool) -> DiscoveryScope {
    if all {
        DiscoveryScope::AllSupported
    } else {
        DiscoveryScope::Nearby
    }
}

/// Find meal combinations and optionally save some of them.
async fn cmd_recommend(config: &ClientConfig, options: RecommendOptions) -> Result<()> {
    let calorie_limit = match options.calories {
        Some(limit) => limit,
        None => prompt_calorie_limit()?,
    };

    let selector = match options.seed {
        Some(seed) => SampleSelector::seeded(config.sample_cap, seed)?,
        None => SampleSelector::new(config.sample_cap)?,
    };

    let backend = Backend::connect(config).await?;
    let session = RecommendationSession::new(
        backend.resolver(config)?,
        backend.discovery(),
        RecommendationAggregator::new(backend.api.clone(), selector),
        backend.api.clone(),
        backend.session.clone(),
    );

    let outcome = match options.restaurant {
        Some(restaurant_id) => {
            let restaurant = find_supported(&backend, config, restaurant_id).await?;
            println!(
                "Finding meals under {} calories at {}...",
                calorie_limit, restaurant.name
            );
            session
                .refresh_restaurant(&restaurant, calorie_limit)
                .await?
        }
        None => {
            println!("Finding meals under {} calories...", calorie_limit);
            session.refresh(scope(options.all), calorie_limit).await?
        }
    };

    let results = match outcome {
        RefreshOutcome::Applied(results) => results,
        RefreshOutcome::Superseded(_) => return Ok(()),
    };

    display_recommendations(&results, |index| session.status_of(index));

    if let Some(path) = &options.export {
        export_results(path, &results)?;
        println!("Exported {} options to {}", results.len(), path.display());
    }

    if results.is_empty() {
        return Ok(());
    }
    if !backend.session.is_signed_in() {
        println!("Sign in to save meals.");
        return Ok(());
    }

    while let Some(index) = prompt_save_choice(&results)? {
        let option = index + 1;
        match session.save_combination(index).await {
            Ok(Submission::Committed) => println!("Saved option {}.", option),
            Ok(Submission::AlreadyCommitted) => println!("Option {} is already saved.", option),
            Ok(Submission::AlreadyPending) => println!("Option {} is still being saved.", option),
            Err(e) if e.is_auth_required() => return Err(e),
            Err(e) => eprintln!("Could not save option {}: {}", option, e),
        }
    }

    Ok(())
}

/// Look up one supported restaurant by id.
async fn find_supported(
    backend: &Backend,
    config: &ClientConfig,
    restaurant_id: i64,
) -> Result<Restaurant> {
    let browser = backend.browser(GeoLocationResolver::new(None, config.location_timeout));
    browser.load(DiscoveryScope::AllSupported).await?;
    let Some(restaurant) = browser.find(restaurant_id) else {
        let message = format!("restaurant {restaurant_id} is not supported");
        return Err(MealError::InvalidInput(message));
    };
    Ok(restaurant)
}

/// List restaurants, favorites first.
async fn cmd_restaurants(
    config: &ClientConfig,
    all: bool,
    search: Option<&str>,
    location: &LocationArgs,
) -> Result<()> {
    let config = config.clone().with_location(location)?;
    let backend = Backend::connect(&config).await?;
    let browser = backend.browser(backend.resolver(&config)?);

    let restaurants = browser.load(scope(all)).await?;
    let is_favorite = |id| browser.is_favorite(id);

    let Some(query) = search else {
        display_restaurants(&restaurants, is_favorite);
        return Ok(());
    };

    let matches = browser.filter(query);
    if !matches.is_empty() {
        display_restaurants(&matches, is_favorite);
        return Ok(());
    }

    if let Some(restaurant) = prompt_did_you_mean(query, &restaurants)? {
        display_restaurants(slice::from_ref(restaurant), is_favorite);
    }

    Ok(())
}

/// Add or remove a favorite restaurant.
async fn cmd_set_favorite(config: &ClientConfig, restaurant_id: i64, favorite: bool) -> Result<()> {
    let backend = Backend::connect(config).await?;
    let browser = backend.browser(GeoLocationResolver::new(None, config.location_timeout));

    backend.session.require_user()?;
    browser.load_favorites().await?;

    match browser.set_favorite(restaurant_id, favorite).await? {
        ToggleOutcome::Updated(true) => println!("Restaurant {} is a favorite.", restaurant_id),
        ToggleOutcome::Updated(false) => {
            println!("Restaurant {} is not a favorite.", restaurant_id)
        }
        ToggleOutcome::InFlight => println!("Restaurant {} is still updating.", restaurant_id),
    }

    Ok(())
}

async fn cmd_meals(config: &ClientConfig) -> Result<()> {
    let backend = Backend::connect(config).await?;
    let meals = backend.saved_meals().load().await?;
    display_saved_meals(&meals);
    Ok(())
}

/// Delete one saved meal after confirming.
async fn cmd_delete_meal(config: &ClientConfig, meal_id: i64) -> Result<()> {
    let backend = Backend::connect(config).await?;
    let saved = backend.saved_meals();

    let meals = saved.load().await?;
    let Some(meal) = meals.iter().find(|m| m.id == meal_id) else {
        return Err(MealError::InvalidInput(format!(
            "you have no saved meal {meal_id}"
        )));
    };

    let prompt = format!(
        "Delete meal {} from {} ({} cal)?",
        meal.id,
        meal.restaurant.name,
        meal.total_calories()
    );
    if !prompt_yes_no(&prompt, false)? {
        return Ok(());
    }

    match saved.delete(meal_id).await? {
        Submission::Committed => println!("Deleted meal {}.", meal_id),
        Submission::AlreadyCommitted | Submission::AlreadyPending => {
            println!("Meal {} is already being deleted.", meal_id)
        }
    }

    Ok(())
}

async fn cmd_menu(config: &ClientConfig, restaurant_id: i64) -> Result<()> {
    let backend = Backend::connect(config).await?;
    let items = backend.saved_meals().menu(restaurant_id).await?;
    display_menu(restaurant_id, &items);
    Ok(())
}

/// Save a meal from hand-picked menu items.
async fn cmd_build(config: &ClientConfig, restaurant_id: i64, item_ids: &[i64]) -> Result<()> {
    let backend = Backend::connect(config).await?;
    backend.saved_meals().build(restaurant_id, item_ids).await?;
    println!("Saved a meal from restaurant {}.", restaurant_id);
    Ok(())
}
