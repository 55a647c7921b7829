pub mod prompts;
pub mod render;

pub use prompts::{
    parse_calorie_limit, prompt_calorie_limit, prompt_did_you_mean, prompt_save_choice,
    prompt_yes_no, suggest_restaurants,
};
pub use render::{display_menu, display_recommendations, display_restaurants, display_saved_meals};
