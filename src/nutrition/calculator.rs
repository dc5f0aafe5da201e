//! Pure nutrition math. Nothing here touches storage, and every function is
//! deterministic so the numbers shown to users are reproducible.

use super::dto::{ActivityLevel, NutritionFacts, NutritionGoals, NutritionProfile, WeightGoal};
use super::repo_types::FoodLogEntry;

/// BMR returned when the profile is incomplete.
pub const FALLBACK_BMR: f64 = 2000.0;

const KCAL_PER_G_PROTEIN: f64 = 4.0;
const KCAL_PER_G_CARBS: f64 = 4.0;
const KCAL_PER_G_FAT: f64 = 9.0;

const PROTEIN_SHARE: f64 = 0.15;
const CARBS_SHARE: f64 = 0.50;
const FAT_SHARE: f64 = 0.35;

const FIBER_GOAL_G: f64 = 25.0;
const SODIUM_GOAL_MG: f64 = 2300.0;

/// Rounds halves toward positive infinity (`2.5 -> 3`, `-2.5 -> -2`).
pub(crate) fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

fn present(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite() && *x > 0.0)
}

/// Mifflin-St Jeor. Zero or missing weight, height, age or gender gives
/// [`FALLBACK_BMR`].
pub fn calculate_bmr(profile: &NutritionProfile) -> f64 {
    let (Some(weight), Some(height), Some(age), Some(gender)) = (
        present(profile.weight),
        present(profile.height),
        present(profile.age),
        profile.gender.as_deref().filter(|g| !g.is_empty()),
    ) else {
        return FALLBACK_BMR;
    };

    let base = 10.0 * weight + 6.25 * height - 5.0 * age;
    if gender == "male" {
        base + 5.0
    } else {
        base - 161.0
    }
}

pub fn calculate_tdee(bmr: f64, activity_level: ActivityLevel) -> f64 {
    round_half_up(bmr * activity_level.multiplier())
}

pub fn get_recommended_goals(tdee: f64, goal: WeightGoal) -> NutritionGoals {
    let calories = tdee + goal.calorie_adjustment();
    NutritionGoals {
        calories,
        protein: round_half_up(calories * PROTEIN_SHARE / KCAL_PER_G_PROTEIN),
        carbs: round_half_up(calories * CARBS_SHARE / KCAL_PER_G_CARBS),
        fat: round_half_up(calories * FAT_SHARE / KCAL_PER_G_FAT),
        fiber: FIBER_GOAL_G,
        sodium: SODIUM_GOAL_MG,
    }
}

/// BMR -> TDEE -> goals for a stored profile.
pub fn recommended_goals(profile: &NutritionProfile) -> NutritionGoals {
    let bmr = calculate_bmr(profile);
    let tdee = calculate_tdee(bmr, profile.activity_level);
    get_recommended_goals(tdee, profile.goal)
}

/// Field-wise sum of every entry's nutrition. Entries without nutrition
/// count as zero.
pub fn calculate_daily_nutrition<'a, I>(logs: I) -> NutritionFacts
where
    I: IntoIterator<Item = &'a FoodLogEntry>,
{
    logs.into_iter()
        .map(|entry| entry.nutrition.unwrap_or_default())
        .sum()
}

/// `consumed / goal` as a whole percentage in `0..=100`. A zero, missing or
/// non-finite goal gives 0.
pub fn calculate_goal_percentage(consumed: f64, goal: Option<f64>) -> u8 {
    let Some(goal) = goal.filter(|g| g.is_finite() && *g != 0.0) else {
        return 0;
    };
    let pct = round_half_up(consumed / goal * 100.0);
    if pct.is_nan() {
        return 0;
    }
    pct.clamp(0.0, 100.0) as u8
}
