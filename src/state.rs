use std::sync::Arc;

use tracing::{info, warn};

use crate::activity::{ActivityStore, StatsAggregator};
use crate::auth::session::SessionStore;
use crate::clock::{Clock, SystemClock};
use crate::config::AppConfig;
use crate::error::StoreResult;
use crate::nutrition::FoodLogStore;
use crate::storage::{DocumentRepository, KeyValueStore, MemoryKvStore, PgKvStore, StorageGateway};
use crate::users::UserStore;

/// The service instance: every store wired to one key-value backend.
/// Built once at startup and passed to whoever needs it.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub clock: Arc<dyn Clock>,
    pub docs: DocumentRepository,
    pub users: UserStore,
    pub session: SessionStore,
    pub activities: ActivityStore,
    pub stats: StatsAggregator,
    pub food_logs: FoodLogStore,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);

        let store: Arc<dyn KeyValueStore> = match &config.storage.database_url {
            Some(url) => {
                let pg = PgKvStore::connect(url).await?;
                pg.migrate().await?;
                info!("using postgres key-value store");
                Arc::new(pg)
            }
            None => {
                warn!("DATABASE_URL not set, data will not outlive this process");
                Arc::new(MemoryKvStore::new())
            }
        };

        Ok(Self::from_store(config, store, Arc::new(SystemClock)))
    }

    pub fn from_store(
        config: Arc<AppConfig>,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let gateway = StorageGateway::new(store, config.storage.retry.policy());
        let docs = DocumentRepository::new(gateway, config.storage.key_prefix.clone());

        let activities = ActivityStore::new(docs.clone(), clock.clone())
            .with_history_limit(config.history_limit);

        Self {
            users: UserStore::new(docs.clone(), clock.clone()),
            session: SessionStore::new(docs.clone()),
            stats: StatsAggregator::new(activities.clone()),
            activities,
            food_logs: FoodLogStore::new(docs.clone(), clock.clone()),
            docs,
            clock,
            config,
        }
    }

    pub fn in_memory() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self::from_store(
            Arc::new(AppConfig::default()),
            Arc::new(MemoryKvStore::new()),
            clock,
        )
    }

    /// Removes every document this app owns from the backend.
    pub async fn clear_all_data(&self) -> StoreResult<usize> {
        self.docs.clear_all().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::{ActivityEntry, MealInput};
    use crate::users::NewUser;

    #[tokio::test]
    async fn stores_share_one_backend_and_clear_together() {
        let state = AppState::in_memory();
        let user = state
            .users
            .create_user(NewUser {
                username: "ana".into(),
                email: "ana@example.com".into(),
                password: "pw".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        state.session.set_current_user(&user).await.unwrap();
        state
            .activities
            .add_daily_activity(
                &user.id,
                ActivityEntry::Meal(MealInput {
                    name: "toast".into(),
                    calories: 180.0,
                    ..Default::default()
                }),
            )
            .await
            .unwrap();

        assert_eq!(state.clear_all_data().await.unwrap(), 3);
        assert!(state.users.get_all_users().await.is_empty());
        assert!(state.session.get_current_user().await.is_none());
        assert_eq!(state.stats.get_monthly_stats(&user.id).await.active_days, 0);
    }

    #[tokio::test]
    async fn init_without_database_url_uses_memory() {
        let state = AppState::init(AppConfig::default()).await.unwrap();
        assert!(state.users.get_all_users().await.is_empty());
    }
}
