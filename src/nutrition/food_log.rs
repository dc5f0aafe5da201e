use std::sync::Arc;

use tracing::{debug, instrument};

use super::calculator::calculate_daily_nutrition;
use super::dto::NutritionFacts;
use super::repo_types::{FoodLogEntry, NewFoodLog};
use crate::clock::{day_key, parse_day_key, Clock};
use crate::error::{StoreError, StoreResult};
use crate::ids::generate_id;
use crate::storage::documents::{keys, DocumentRepository};

/// Flat collection of food log entries feeding the daily nutrition summary.
#[derive(Clone)]
pub struct FoodLogStore {
    docs: DocumentRepository,
    clock: Arc<dyn Clock>,
}

impl FoodLogStore {
    pub fn new(docs: DocumentRepository, clock: Arc<dyn Clock>) -> Self {
        Self { docs, clock }
    }

    /// Appends an entry. An explicit `date` must be a `YYYY-MM-DD` day.
    #[instrument(skip(self, entry))]
    pub async fn add_food_log(&self, user_id: &str, entry: NewFoodLog) -> StoreResult<FoodLogEntry> {
        let now = self.clock.now();
        let day = match entry.date {
            Some(raw) => parse_day_key(&raw).ok_or(StoreError::InvalidDate(raw))?,
            None => now.date(),
        };
        let log = FoodLogEntry {
            id: generate_id(now),
            user_id: user_id.to_string(),
            name: entry.name,
            nutrition: Some(entry.nutrition),
            date: day_key(day),
            timestamp: now,
        };

        let stored = log.clone();
        self.docs
            .update(keys::FOOD_LOGS, |logs: &mut Vec<FoodLogEntry>| {
                logs.push(stored);
                Ok(())
            })
            .await?;
        debug!(log_id = %log.id, date = %log.date, "food log added");
        Ok(log)
    }

    /// Entries for one user on one day, in insertion order.
    pub async fn get_food_logs(&self, user_id: &str, date: &str) -> Vec<FoodLogEntry> {
        let logs: Vec<FoodLogEntry> = self.docs.get(keys::FOOD_LOGS).await;
        logs.into_iter()
            .filter(|l| l.user_id == user_id && l.date == date)
            .collect()
    }

    pub async fn get_daily_nutrition(&self, user_id: &str, date: &str) -> NutritionFacts {
        calculate_daily_nutrition(&self.get_food_logs(user_id, date).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::storage::{MemoryKvStore, RetryPolicy, StorageGateway};
    use time::macros::datetime;

    fn store() -> FoodLogStore {
        let gateway = StorageGateway::new(Arc::new(MemoryKvStore::new()), RetryPolicy::default());
        FoodLogStore::new(
            DocumentRepository::new(gateway, "@test:"),
            Arc::new(FixedClock::new(datetime!(2026-10-17 09:00 UTC))),
        )
    }

    fn facts(calories: f64, protein: f64) -> NutritionFacts {
        NutritionFacts {
            calories,
            protein,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn logs_default_to_today_and_sum_per_day() {
        let store = store();
        let first = store
            .add_food_log("u1", NewFoodLog {
                name: Some("oats".into()),
                nutrition: facts(300.0, 10.0),
                date: None,
            })
            .await
            .unwrap();
        assert_eq!(first.date, "2026-10-17");

        store
            .add_food_log("u1", NewFoodLog {
                nutrition: facts(200.0, 15.0),
                ..Default::default()
            })
            .await
            .unwrap();
        store
            .add_food_log("u1", NewFoodLog {
                nutrition: facts(999.0, 0.0),
                date: Some("2026-10-16".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        store
            .add_food_log("u2", NewFoodLog {
                nutrition: facts(50.0, 1.0),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(store.get_food_logs("u1", "2026-10-17").await.len(), 2);
        let total = store.get_daily_nutrition("u1", "2026-10-17").await;
        assert_eq!(total.calories, 500.0);
        assert_eq!(total.protein, 25.0);
        assert_eq!(total.fat, 0.0);
    }

    #[tokio::test]
    async fn malformed_date_is_rejected_and_nothing_is_written() {
        let store = store();
        let err = store
            .add_food_log("u1", NewFoodLog {
                nutrition: facts(100.0, 1.0),
                date: Some("Fri Oct 16 2026".into()),
                ..Default::default()
            })
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::InvalidDate(ref d) if d == "Fri Oct 16 2026"));
        assert!(store.get_food_logs("u1", "2026-10-16").await.is_empty());
        assert!(store.get_food_logs("u1", "2026-10-17").await.is_empty());
    }

    #[tokio::test]
    async fn empty_day_is_all_zero() {
        let store = store();
        assert_eq!(
            store.get_daily_nutrition("nobody", "2026-10-17").await,
            NutritionFacts::default()
        );
    }
}
