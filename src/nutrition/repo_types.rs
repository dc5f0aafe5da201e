use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::dto::NutritionFacts;

/// One logged food item in the flat `food_logs` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodLogEntry {
    pub id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub nutrition: Option<NutritionFacts>,
    pub date: String, // YYYY-MM-DD
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewFoodLog {
    pub name: Option<String>,
    pub nutrition: NutritionFacts,
    /// Defaults to today.
    pub date: Option<String>,
}
