pub mod repo;
pub mod repo_types;
pub mod stats;

pub use repo::ActivityStore;
pub use repo_types::{ActivityEntry, DailyActivityBucket, Meal, MealInput};
pub use stats::{DailyCalories, MonthlyStats, StatsAggregator};
