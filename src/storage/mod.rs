//! Persistence plumbing: the key-value contract, retry policy and the
//! whole-document repository built on top of it.

pub mod documents;
pub mod memory;
pub mod postgres;
pub mod retry;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::instrument;

pub use documents::DocumentRepository;
pub use memory::MemoryKvStore;
pub use postgres::PgKvStore;
pub use retry::RetryPolicy;

/// Failure reported by a key-value backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KvError {
    /// Backing store exists but has not finished initialising yet.
    #[error("storage backend not initialized: {0}")]
    NotInitialized(String),
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl KvError {
    /// Only the not-initialised class is worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(self, KvError::NotInitialized(_))
    }
}

/// Opaque async string store provided by the host platform.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError>;
    async fn set(&self, key: &str, value: String) -> Result<(), KvError>;
    async fn remove(&self, key: &str) -> Result<(), KvError>;
    async fn multi_remove(&self, keys: &[String]) -> Result<(), KvError>;
    async fn get_all_keys(&self) -> Result<Vec<String>, KvError>;
}

/// Wraps a [`KeyValueStore`] so that every single call goes through the
/// retry policy. Calls are retried one at a time; nothing here replays a
/// sequence of calls.
#[derive(Clone)]
pub struct StorageGateway {
    store: Arc<dyn KeyValueStore>,
    retry: RetryPolicy,
}

impl StorageGateway {
    pub fn new(store: Arc<dyn KeyValueStore>, retry: RetryPolicy) -> Self {
        Self { store, retry }
    }

    #[instrument(skip(self))]
    pub async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        self.retry.run("get", || self.store.get(key)).await
    }

    #[instrument(skip(self, value))]
    pub async fn set(&self, key: &str, value: String) -> Result<(), KvError> {
        self.retry
            .run("set", || self.store.set(key, value.clone()))
            .await
    }

    #[instrument(skip(self))]
    pub async fn remove(&self, key: &str) -> Result<(), KvError> {
        self.retry.run("remove", || self.store.remove(key)).await
    }

    #[instrument(skip(self))]
    pub async fn multi_remove(&self, keys: &[String]) -> Result<(), KvError> {
        self.retry
            .run("multi_remove", || self.store.multi_remove(keys))
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_all_keys(&self) -> Result<Vec<String>, KvError> {
        self.retry
            .run("get_all_keys", || self.store.get_all_keys())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::testing::FlakyStore;
    use std::time::Duration;

    #[test]
    fn only_not_initialized_is_transient() {
        assert!(KvError::NotInitialized("boot".into()).is_transient());
        assert!(!KvError::Backend("disk full".into()).is_transient());
    }

    #[tokio::test(start_paused = true)]
    async fn gateway_retries_each_call_independently() {
        let flaky = Arc::new(FlakyStore::new(1));
        let gateway = StorageGateway::new(flaky.clone(), RetryPolicy::default());

        gateway.set("k", "v".into()).await.expect("set after one retry");
        assert_eq!(flaky.calls(), 2);

        // budget of failures is spent; the read goes straight through
        let value = gateway.get("k").await.expect("get");
        assert_eq!(value.as_deref(), Some("v"));
        assert_eq!(flaky.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn gateway_gives_up_after_three_attempts() {
        let flaky = Arc::new(FlakyStore::new(10));
        let gateway = StorageGateway::new(
            flaky.clone(),
            RetryPolicy::new(3, Duration::from_millis(100)),
        );

        let err = gateway.get_all_keys().await.unwrap_err();
        assert!(err.is_transient());
        assert_eq!(flaky.calls(), 3);
    }
}
