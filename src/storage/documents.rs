//! Whole-document persistence.
//!
//! A collection lives serialized as one JSON string under one key. Every
//! mutation reads the full document, changes it in memory and writes the full
//! document back. There is no locking: two interleaved updates of the same key
//! both start from the same snapshot and the later write wins.

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use super::StorageGateway;
use crate::error::StoreResult;

/// Logical document names. The repository prepends its namespace prefix.
pub mod keys {
    pub const USERS: &str = "users";
    pub const CURRENT_USER: &str = "current_user";
    pub const DAILY_ACTIVITIES: &str = "daily_activities";
    pub const FOOD_LOGS: &str = "food_logs";
}

#[derive(Clone)]
pub struct DocumentRepository {
    gateway: StorageGateway,
    prefix: String,
}

impl DocumentRepository {
    pub fn new(gateway: StorageGateway, prefix: impl Into<String>) -> Self {
        Self {
            gateway,
            prefix: prefix.into(),
        }
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    /// Lenient read used by read paths: absent, unparsable and failed reads
    /// all yield `T::default()`.
    pub async fn get<T>(&self, key: &str) -> T
    where
        T: DeserializeOwned + Default,
    {
        match self.load(key).await {
            Ok(doc) => doc,
            Err(e) => {
                warn!(key, error = %e, "document read failed, using empty value");
                T::default()
            }
        }
    }

    /// Read used by writers. Absent or unparsable documents still yield
    /// `T::default()`, but storage failures are returned so a writer never
    /// overwrites a collection it could not read.
    pub async fn load<T>(&self, key: &str) -> StoreResult<T>
    where
        T: DeserializeOwned + Default,
    {
        let Some(raw) = self.gateway.get(&self.full_key(key)).await? else {
            return Ok(T::default());
        };
        Ok(serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(key, error = %e, "unparsable document, using empty value");
            T::default()
        }))
    }

    /// Serializes and overwrites the whole document.
    pub async fn set<T>(&self, key: &str, value: &T) -> StoreResult<()>
    where
        T: Serialize + ?Sized,
    {
        let raw = serde_json::to_string(value)?;
        self.gateway.set(&self.full_key(key), raw).await?;
        debug!(key, "document written");
        Ok(())
    }

    /// Read-modify-write of one document. Nothing is written if `mutate`
    /// returns an error.
    pub async fn update<T, R, F>(&self, key: &str, mutate: F) -> StoreResult<R>
    where
        T: DeserializeOwned + Serialize + Default,
        F: FnOnce(&mut T) -> StoreResult<R>,
    {
        let mut doc: T = self.load(key).await?;
        let out = mutate(&mut doc)?;
        self.set(key, &doc).await?;
        Ok(out)
    }

    pub async fn remove(&self, key: &str) -> StoreResult<()> {
        self.gateway.remove(&self.full_key(key)).await?;
        debug!(key, "document removed");
        Ok(())
    }

    /// Removes every key under this repository's prefix and returns how many
    /// were removed. Keys outside the prefix are left alone.
    pub async fn clear_all(&self) -> StoreResult<usize> {
        let keys: Vec<String> = self
            .gateway
            .get_all_keys()
            .await?
            .into_iter()
            .filter(|k| k.starts_with(&self.prefix))
            .collect();
        self.gateway.multi_remove(&keys).await?;
        info!(removed = keys.len(), prefix = %self.prefix, "cleared stored documents");
        Ok(keys.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::storage::memory::testing::BrokenStore;
    use crate::storage::{KeyValueStore, MemoryKvStore, RetryPolicy};
    use std::sync::Arc;

    fn repo_over(store: Arc<dyn KeyValueStore>) -> DocumentRepository {
        DocumentRepository::new(StorageGateway::new(store, RetryPolicy::default()), "@test:")
    }

    #[tokio::test]
    async fn missing_document_reads_as_empty_collection() {
        let repo = repo_over(Arc::new(MemoryKvStore::new()));
        let users: Vec<String> = repo.get(keys::USERS).await;
        assert!(users.is_empty());
    }

    #[tokio::test]
    async fn unparsable_document_reads_as_empty_collection() {
        let store = MemoryKvStore::new();
        store.set("@test:users", "{not json".into()).await.unwrap();
        let repo = repo_over(Arc::new(store));

        let users: Vec<String> = repo.get(keys::USERS).await;
        assert!(users.is_empty());
        let strict: Vec<String> = repo.load(keys::USERS).await.unwrap();
        assert!(strict.is_empty());
    }

    #[tokio::test]
    async fn set_then_get_uses_prefixed_key() {
        let store = MemoryKvStore::new();
        let repo = repo_over(Arc::new(store.clone()));

        repo.set(keys::FOOD_LOGS, &vec![1, 2, 3]).await.unwrap();

        assert_eq!(
            store.get("@test:food_logs").await.unwrap().as_deref(),
            Some("[1,2,3]")
        );
        let back: Vec<i32> = repo.get(keys::FOOD_LOGS).await;
        assert_eq!(back, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn update_appends_to_whole_document() {
        let repo = repo_over(Arc::new(MemoryKvStore::new()));

        for n in 1..=3 {
            repo.update(keys::USERS, |names: &mut Vec<String>| {
                names.push(format!("user{n}"));
                Ok(())
            })
            .await
            .unwrap();
        }

        let names: Vec<String> = repo.get(keys::USERS).await;
        assert_eq!(names, vec!["user1", "user2", "user3"]);
    }

    #[tokio::test]
    async fn failed_mutation_writes_nothing() {
        let repo = repo_over(Arc::new(MemoryKvStore::new()));
        repo.set(keys::USERS, &vec!["alice".to_string()]).await.unwrap();

        let result = repo
            .update(keys::USERS, |names: &mut Vec<String>| {
                names.clear();
                Err::<(), _>(StoreError::DuplicateUser)
            })
            .await;

        assert!(matches!(result, Err(StoreError::DuplicateUser)));
        let names: Vec<String> = repo.get(keys::USERS).await;
        assert_eq!(names, vec!["alice"]);
    }

    #[tokio::test]
    async fn interleaved_writers_lose_the_earlier_update() {
        let repo = repo_over(Arc::new(MemoryKvStore::new()));

        let mut first: Vec<String> = repo.load(keys::USERS).await.unwrap();
        let mut second: Vec<String> = repo.load(keys::USERS).await.unwrap();
        first.push("alice".into());
        second.push("bob".into());
        repo.set(keys::USERS, &first).await.unwrap();
        repo.set(keys::USERS, &second).await.unwrap();

        let names: Vec<String> = repo.get(keys::USERS).await;
        assert_eq!(names, vec!["bob"]);
    }

    #[tokio::test]
    async fn read_failures_are_swallowed_but_write_failures_surface() {
        let repo = repo_over(Arc::new(BrokenStore));

        let users: Vec<String> = repo.get(keys::USERS).await;
        assert!(users.is_empty());

        let err = repo
            .update(keys::USERS, |names: &mut Vec<String>| {
                names.push("alice".into());
                Ok(())
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::StorageFailure(_)));
    }

    #[tokio::test]
    async fn clear_all_only_touches_prefixed_keys() {
        let store = MemoryKvStore::new();
        store.set("other:settings", "{}".into()).await.unwrap();
        let repo = repo_over(Arc::new(store.clone()));
        repo.set(keys::USERS, &Vec::<String>::new()).await.unwrap();
        repo.set(keys::CURRENT_USER, &Option::<String>::None).await.unwrap();

        assert_eq!(repo.clear_all().await.unwrap(), 2);
        assert_eq!(store.get_all_keys().await.unwrap(), vec!["other:settings"]);
    }
}
