use std::sync::Arc;

use tracing::{debug, instrument, warn};

use super::repo_types::{ActivityEntry, DailyActivityBucket, Meal};
use crate::clock::{day_key, Clock};
use crate::error::StoreResult;
use crate::ids::generate_id;
use crate::storage::documents::{keys, DocumentRepository};

pub const DEFAULT_HISTORY_LIMIT: usize = 30;

/// Per-day activity buckets for all users, stored as one array under the
/// `daily_activities` key.
#[derive(Clone)]
pub struct ActivityStore {
    docs: DocumentRepository,
    clock: Arc<dyn Clock>,
    history_limit: usize,
}

impl ActivityStore {
    pub fn new(docs: DocumentRepository, clock: Arc<dyn Clock>) -> Self {
        Self {
            docs,
            clock,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    pub(crate) fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Finds today's bucket for the user (creating it if needed), applies
    /// `mutate` and writes the whole collection back.
    async fn upsert_today<F>(&self, user_id: &str, mutate: F) -> StoreResult<DailyActivityBucket>
    where
        F: FnOnce(&mut DailyActivityBucket, time::OffsetDateTime),
    {
        let now = self.clock.now();
        let today = day_key(now.date());
        self.docs
            .update(keys::DAILY_ACTIVITIES, |buckets: &mut Vec<DailyActivityBucket>| {
                let idx = match buckets
                    .iter()
                    .position(|b| b.user_id == user_id && b.date == today)
                {
                    Some(idx) => idx,
                    None => {
                        debug!(user_id, date = %today, "opening new daily bucket");
                        buckets.push(DailyActivityBucket::empty(
                            generate_id(now),
                            user_id,
                            today.clone(),
                            now,
                        ));
                        buckets.len() - 1
                    }
                };
                mutate(&mut buckets[idx], now);
                let bucket = &mut buckets[idx];
                bucket.updated_at = now;
                Ok(bucket.clone())
            })
            .await
    }

    #[instrument(skip(self, entry), fields(kind = entry.kind()))]
    pub async fn add_daily_activity(
        &self,
        user_id: &str,
        entry: ActivityEntry,
    ) -> StoreResult<DailyActivityBucket> {
        let bucket = self
            .upsert_today(user_id, |bucket, now| match entry {
                ActivityEntry::Meal(input) => {
                    bucket.record_meal(Meal::from_input(generate_id(now), input, now));
                }
                ActivityEntry::Other { kind } => {
                    // TODO: exercise entries need an aggregate once the product defines one
                    warn!(kind = %kind, "non-meal activity is not aggregated");
                }
            })
            .await?;
        debug!(
            bucket_id = %bucket.id,
            meals = bucket.meals.len(),
            total_calories = bucket.total_calories_consumed,
            "daily activity recorded"
        );
        Ok(bucket)
    }

    /// Adds to today's water intake. Calorie and macro totals are untouched.
    #[instrument(skip(self))]
    pub async fn add_water_intake(&self, user_id: &str, amount: f64) -> StoreResult<DailyActivityBucket> {
        self.upsert_today(user_id, |bucket, _| bucket.water_intake += amount)
            .await
    }

    /// Today's stored bucket, or a fresh empty one that has NOT been written
    /// to storage.
    pub async fn get_today_activity(&self, user_id: &str) -> DailyActivityBucket {
        let now = self.clock.now();
        let today = day_key(now.date());
        match self.get_activity_for_date(user_id, &today).await {
            Some(bucket) => bucket,
            None => DailyActivityBucket::empty(generate_id(now), user_id, today, now),
        }
    }

    pub async fn get_activity_for_date(&self, user_id: &str, date: &str) -> Option<DailyActivityBucket> {
        let buckets: Vec<DailyActivityBucket> = self.docs.get(keys::DAILY_ACTIVITIES).await;
        buckets
            .into_iter()
            .find(|b| b.user_id == user_id && b.date == date)
    }

    /// The user's buckets, newest date first, at most `limit` of them
    /// (default 30).
    pub async fn get_user_activities(
        &self,
        user_id: &str,
        limit: Option<usize>,
    ) -> Vec<DailyActivityBucket> {
        let buckets: Vec<DailyActivityBucket> = self.docs.get(keys::DAILY_ACTIVITIES).await;
        let mut mine: Vec<DailyActivityBucket> =
            buckets.into_iter().filter(|b| b.user_id == user_id).collect();
        mine.sort_by(|a, b| b.date.cmp(&a.date));
        mine.truncate(limit.unwrap_or(self.history_limit));
        mine
    }
}
