pub mod calculator;
pub mod dto;
pub mod food_log;
pub mod repo_types;

pub use calculator::{
    calculate_bmr, calculate_daily_nutrition, calculate_goal_percentage, calculate_tdee,
    get_recommended_goals, recommended_goals,
};
pub use dto::{ActivityLevel, NutritionFacts, NutritionGoals, NutritionProfile, WeightGoal};
pub use food_log::FoodLogStore;
pub use repo_types::{FoodLogEntry, NewFoodLog};
