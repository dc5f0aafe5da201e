use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

use crate::users::UserAccount;

/// Activity multiplier bucket used for TDEE. Unknown strings fall back to
/// `Sedentary`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum ActivityLevel {
    #[default]
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    pub fn parse_lenient(s: &str) -> Self {
        match s {
            "light" => Self::Light,
            "moderate" => Self::Moderate,
            "active" => Self::Active,
            "very_active" => Self::VeryActive,
            _ => Self::Sedentary,
        }
    }

    pub fn multiplier(self) -> f64 {
        match self {
            Self::Sedentary => 1.2,
            Self::Light => 1.375,
            Self::Moderate => 1.55,
            Self::Active => 1.725,
            Self::VeryActive => 1.9,
        }
    }
}

impl From<String> for ActivityLevel {
    fn from(s: String) -> Self {
        Self::parse_lenient(&s)
    }
}

/// Weight goal. Unknown strings fall back to `Maintain`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum WeightGoal {
    Lose,
    #[default]
    Maintain,
    Gain,
}

impl WeightGoal {
    pub fn parse_lenient(s: &str) -> Self {
        match s {
            "lose" => Self::Lose,
            "gain" => Self::Gain,
            _ => Self::Maintain,
        }
    }

    /// Daily kcal added to TDEE.
    pub fn calorie_adjustment(self) -> f64 {
        match self {
            Self::Lose => -500.0,
            Self::Maintain => 0.0,
            Self::Gain => 500.0,
        }
    }
}

impl From<String> for WeightGoal {
    fn from(s: String) -> Self {
        Self::parse_lenient(&s)
    }
}

/// Inputs for the BMR equation. Any missing field makes BMR fall back to a
/// fixed value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionProfile {
    pub weight: Option<f64>, // kg
    pub height: Option<f64>, // cm
    pub age: Option<f64>,    // years
    pub gender: Option<String>,
    #[serde(default)]
    pub activity_level: ActivityLevel,
    #[serde(default)]
    pub goal: WeightGoal,
}

impl From<&UserAccount> for NutritionProfile {
    fn from(user: &UserAccount) -> Self {
        Self {
            weight: user.weight,
            height: user.height,
            age: user.age.map(f64::from),
            gender: Some(user.gender.clone()).filter(|g| !g.is_empty()),
            activity_level: user.activity_level.unwrap_or_default(),
            goal: user.goal.unwrap_or_default(),
        }
    }
}

/// Derived daily targets. Not stored; recomputed from the profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NutritionGoals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: f64,
    pub sodium: f64,
}

/// Seven-field nutrient record; missing fields deserialize as 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NutritionFacts {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: f64,
    pub sugar: f64,
    pub sodium: f64,
}

impl Add for NutritionFacts {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

impl AddAssign for NutritionFacts {
    fn add_assign(&mut self, rhs: Self) {
        self.calories += rhs.calories;
        self.protein += rhs.protein;
        self.carbs += rhs.carbs;
        self.fat += rhs.fat;
        self.fiber += rhs.fiber;
        self.sugar += rhs.sugar;
        self.sodium += rhs.sodium;
    }
}

impl Sum for NutritionFacts {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}
