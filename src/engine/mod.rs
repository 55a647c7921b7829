pub mod constants;
pub mod fanout;
pub mod grouping;
pub mod sampling;

pub use constants::*;
pub use fanout::RecommendationAggregator;
pub use grouping::{group_by_restaurant, RestaurantGroup};
pub use sampling::{sample_with, SampleSelector};
