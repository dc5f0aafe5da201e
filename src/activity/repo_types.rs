use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::clock::time_of_day;

/// One user's activity for one calendar day. Exactly one bucket exists per
/// `(user_id, date)`; `total_calories_consumed` always equals the sum of
/// `meals[].calories` and is maintained on append.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyActivityBucket {
    pub id: String,
    pub user_id: String,
    pub date: String, // YYYY-MM-DD
    #[serde(default)]
    pub meals: Vec<Meal>,
    #[serde(default)]
    pub total_calories_consumed: f64,
    // accumulators stay absent until the first meal touches them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_carbs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_protein: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_fat: Option<f64>,
    #[serde(default)]
    pub water_intake: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl DailyActivityBucket {
    pub fn empty(id: String, user_id: &str, date: String, now: OffsetDateTime) -> Self {
        Self {
            id,
            user_id: user_id.to_string(),
            date,
            meals: Vec::new(),
            total_calories_consumed: 0.0,
            total_carbs: None,
            total_protein: None,
            total_fat: None,
            water_intake: 0.0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Appends the meal and adds its values to the running totals.
    pub fn record_meal(&mut self, meal: Meal) {
        self.total_calories_consumed += meal.calories;
        *self.total_carbs.get_or_insert(0.0) += meal.carbs;
        *self.total_protein.get_or_insert(0.0) += meal.protein;
        *self.total_fat.get_or_insert(0.0) += meal.fat;
        self.meals.push(meal);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub foods: Vec<String>,
    #[serde(default)]
    pub time: String, // HH:MM
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub fat: f64,
}

impl Meal {
    /// Fills in defaults: time and timestamp from `now`, missing macros as 0.
    pub fn from_input(id: String, input: MealInput, now: OffsetDateTime) -> Self {
        let timestamp = input.timestamp.unwrap_or(now);
        Self {
            id,
            name: input.name,
            calories: input.calories,
            foods: input.foods,
            time: input.time.unwrap_or_else(|| time_of_day(timestamp)),
            timestamp,
            carbs: input.carbs.unwrap_or(0.0),
            protein: input.protein.unwrap_or(0.0),
            fat: input.fat.unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MealInput {
    pub name: String,
    pub calories: f64,
    pub foods: Vec<String>,
    pub time: Option<String>,
    pub timestamp: Option<OffsetDateTime>,
    pub carbs: Option<f64>,
    pub protein: Option<f64>,
    pub fat: Option<f64>,
}

/// Something the user did today.
///
/// Only meals change the bucket's totals. Other kinds (e.g. `"exercise"`)
/// are accepted and touch the bucket's `updated_at`, nothing else.
#[derive(Debug, Clone, PartialEq)]
pub enum ActivityEntry {
    Meal(MealInput),
    Other { kind: String },
}

impl ActivityEntry {
    pub fn kind(&self) -> &str {
        match self {
            ActivityEntry::Meal(_) => "meal",
            ActivityEntry::Other { kind } => kind.as_str(),
        }
    }
}
