//! Weekly and monthly calorie rollups over the activity buckets.

use serde::Serialize;
use time::Duration;
use tracing::instrument;

use super::repo::ActivityStore;
use crate::clock::{day_key, weekday_short};
use crate::nutrition::calculator::round_half_up;

const WEEK_DAYS: i64 = 7;
const MONTH_BUCKETS: usize = 30;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyCalories {
    pub date: String,
    pub weekday_short_name: &'static str, // Mon, Tue, ...
    pub calories_consumed: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyStats {
    pub total_calories: f64,
    pub average_daily: f64,
    pub active_days: usize,
}

#[derive(Clone)]
pub struct StatsAggregator {
    activities: ActivityStore,
}

impl StatsAggregator {
    pub fn new(activities: ActivityStore) -> Self {
        Self { activities }
    }

    /// Seven entries, oldest first, ending today. Days without a bucket
    /// report 0.
    #[instrument(skip(self))]
    pub async fn get_weekly_stats(&self, user_id: &str) -> Vec<DailyCalories> {
        let today = self.activities.clock().today();
        let history = self
            .activities
            .get_user_activities(user_id, Some(usize::MAX))
            .await;

        (0..WEEK_DAYS)
            .rev()
            .map(|days_ago| {
                let date = today - Duration::days(days_ago);
                let key = day_key(date);
                let calories_consumed = history
                    .iter()
                    .find(|b| b.date == key)
                    .map(|b| b.total_calories_consumed)
                    .unwrap_or(0.0);
                DailyCalories {
                    date: key,
                    weekday_short_name: weekday_short(date),
                    calories_consumed,
                }
            })
            .collect()
    }

    /// Totals over the most recent 30 buckets. Only buckets with calories
    /// count as active days.
    #[instrument(skip(self))]
    pub async fn get_monthly_stats(&self, user_id: &str) -> MonthlyStats {
        let recent = self
            .activities
            .get_user_activities(user_id, Some(MONTH_BUCKETS))
            .await;

        let total_calories: f64 = recent.iter().map(|b| b.total_calories_consumed).sum();
        let active_days = recent
            .iter()
            .filter(|b| b.total_calories_consumed != 0.0)
            .count();
        let average_daily = if active_days == 0 {
            0.0
        } else {
            round_half_up(total_calories / active_days as f64)
        };

        MonthlyStats {
            total_calories,
            average_daily,
            active_days,
        }
    }
}
