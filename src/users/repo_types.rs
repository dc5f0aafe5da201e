use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::nutrition::{ActivityLevel, WeightGoal};

pub const DEFAULT_CALORIE_GOAL: u32 = 2000;

fn default_calorie_goal() -> u32 {
    DEFAULT_CALORIE_GOAL
}

/// Account record, stored inside the `users` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    // Plaintext, compared verbatim at login. Must become a hash check before
    // this leaves the device.
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default = "default_calorie_goal")]
    pub daily_calorie_goal: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_level: Option<ActivityLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<WeightGoal>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl UserAccount {
    /// Minimal record for an identity that exists elsewhere before any local
    /// data was written for it.
    pub fn placeholder(id: &str, now: OffsetDateTime) -> Self {
        Self {
            id: id.to_string(),
            username: String::new(),
            email: String::new(),
            password: String::new(),
            name: String::new(),
            age: None,
            gender: String::new(),
            phone: String::new(),
            daily_calorie_goal: DEFAULT_CALORIE_GOAL,
            weight: None,
            height: None,
            activity_level: None,
            goal: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub(crate) fn from_new(id: String, new: NewUser, now: OffsetDateTime) -> Self {
        Self {
            id,
            username: new.username,
            email: new.email,
            password: new.password,
            name: new.name,
            age: new.age,
            gender: new.gender,
            phone: new.phone,
            daily_calorie_goal: new.daily_calorie_goal.unwrap_or(DEFAULT_CALORIE_GOAL),
            weight: new.weight,
            height: new.height,
            activity_level: new.activity_level,
            goal: new.goal,
            created_at: now,
            updated_at: now,
        }
    }

    /// True when `identifier` names this account by username or email.
    pub fn is_identified_by(&self, identifier: &str) -> bool {
        self.username == identifier || self.email == identifier
    }
}

/// Signup payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub name: String,
    pub age: Option<u32>,
    pub gender: String,
    pub phone: String,
    pub daily_calorie_goal: Option<u32>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub activity_level: Option<ActivityLevel>,
    pub goal: Option<WeightGoal>,
}

/// Partial update; `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub daily_calorie_goal: Option<u32>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub activity_level: Option<ActivityLevel>,
    pub goal: Option<WeightGoal>,
}

impl UserPatch {
    pub fn apply(self, user: &mut UserAccount) {
        if let Some(v) = self.username {
            user.username = v;
        }
        if let Some(v) = self.email {
            user.email = v;
        }
        if let Some(v) = self.password {
            user.password = v;
        }
        if let Some(v) = self.name {
            user.name = v;
        }
        if let Some(v) = self.gender {
            user.gender = v;
        }
        if let Some(v) = self.phone {
            user.phone = v;
        }
        if let Some(v) = self.daily_calorie_goal {
            user.daily_calorie_goal = v;
        }
        user.age = self.age.or(user.age);
        user.weight = self.weight.or(user.weight);
        user.height = self.height.or(user.height);
        user.activity_level = self.activity_level.or(user.activity_level);
        user.goal = self.goal.or(user.goal);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn stored_shape_uses_camel_case_and_defaults_goal() {
        let json = r#"{
            "id": "1",
            "username": "ana",
            "email": "ana@example.com",
            "password": "pw",
            "createdAt": "2026-10-17T10:00:00Z",
            "updatedAt": "2026-10-17T10:00:00Z"
        }"#;
        let user: UserAccount = serde_json::from_str(json).unwrap();
        assert_eq!(user.daily_calorie_goal, 2000);
        assert_eq!(user.name, "");
        assert!(user.weight.is_none());

        let back = serde_json::to_value(&user).unwrap();
        assert_eq!(back["dailyCalorieGoal"], 2000);
        assert!(back.get("weight").is_none());
    }

    #[test]
    fn patch_only_overwrites_present_fields() {
        let mut user = UserAccount::placeholder("42", datetime!(2026-10-17 10:00 UTC));
        user.name = "Ana".into();

        UserPatch {
            phone: Some("555".into()),
            weight: Some(61.5),
            ..Default::default()
        }
        .apply(&mut user);

        assert_eq!(user.name, "Ana");
        assert_eq!(user.phone, "555");
        assert_eq!(user.weight, Some(61.5));
        assert_eq!(user.daily_calorie_goal, DEFAULT_CALORIE_GOAL);
    }
}
