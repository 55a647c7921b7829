pub mod api;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod flows;
pub mod interface;
pub mod location;
pub mod logging;
pub mod models;
pub mod state;

pub use error::{LocationError, MealError, Result};
pub use models::{AggregatedResultSet, Coordinate, MealCombination, MenuItem, Restaurant};
