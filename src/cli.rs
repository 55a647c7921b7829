use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::engine::constants::{DEFAULT_API_URL, DEFAULT_REQUEST_TIMEOUT_SECS};

/// MealFinder: calorie-bounded meal combinations from the restaurants around you.
#[derive(Parser, Debug)]
#[command(name = "meal-finder")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Base URL of the meal recommendation API.
    #[arg(
        long,
        env = "MEAL_FINDER_API_URL",
        default_value = DEFAULT_API_URL,
        global = true
    )]
    pub api_url: String,

    /// Session id of an already signed-in account (the `sessionid` cookie).
    #[arg(
        long,
        env = "MEAL_FINDER_SESSION",
        global = true,
        hide_env_values = true
    )]
    pub session: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS, global = true)]
    pub timeout_secs: u64,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// Where the user's position comes from.
#[derive(Args, Debug, Clone, Default)]
pub struct LocationArgs {
    /// Latitude in decimal degrees.
    #[arg(long, requires = "lng", allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Longitude in decimal degrees.
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lng: Option<f64>,

    /// Look up an approximate position from the public IP address.
    #[arg(long, conflicts_with_all = ["lat", "lng"])]
    pub locate_ip: bool,

    /// Seconds to wait for a position before giving up.
    #[arg(long)]
    pub location_timeout_secs: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Recommend meal combinations across restaurants.
    Recommend {
        /// Use every supported restaurant instead of nearby ones.
        #[arg(long)]
        all: bool,

        /// Calorie limit per meal (prompted for when omitted).
        #[arg(long)]
        calories: Option<u32>,

        /// Maximum combinations kept per restaurant.
        #[arg(long)]
        per_restaurant: Option<usize>,

        /// Seed for the per-restaurant sample (random when omitted).
        #[arg(long)]
        seed: Option<u64>,

        /// Show every option from one restaurant instead of sampling across many.
        #[arg(long, conflicts_with = "all")]
        restaurant: Option<i64>,

        /// Write the results to a .json or .csv file.
        #[arg(long)]
        export: Option<PathBuf>,

        #[command(flatten)]
        location: LocationArgs,
    },

    /// List restaurants, favorites first.
    Restaurants {
        /// List every supported restaurant instead of nearby ones.
        #[arg(long)]
        all: bool,

        /// Only show restaurants whose name contains this text.
        #[arg(long)]
        search: Option<String>,

        #[command(flatten)]
        location: LocationArgs,
    },

    /// Add a restaurant to your favorites.
    Favorite { restaurant_id: i64 },

    /// Remove a restaurant from your favorites.
    Unfavorite { restaurant_id: i64 },

    /// Show your saved meals.
    Meals,

    /// Delete one of your saved meals.
    DeleteMeal { meal_id: i64 },

    /// Show a restaurant's menu.
    Menu { restaurant_id: i64 },

    /// Save a meal built from hand-picked menu items.
    Build {
        restaurant_id: i64,

        /// Menu item ids to include.
        #[arg(required = true)]
        item_ids: Vec<i64>,
    },
}

impl Default for Command {
    fn default() -> Self {
        Command::Recommend {
            all: false,
            calories: None,
            per_restaurant: None,
            seed: None,
            restaurant: None,
            export: None,
            location: LocationArgs::default(),
        }
    }
}
