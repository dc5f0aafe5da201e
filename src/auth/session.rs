use tracing::{debug, instrument};

use crate::error::StoreResult;
use crate::storage::documents::{keys, DocumentRepository};
use crate::users::UserAccount;

/// Snapshot of the most recently authenticated account, kept under its own
/// key. Overwritten on login/signup and removed on logout.
#[derive(Clone)]
pub struct SessionStore {
    docs: DocumentRepository,
}

impl SessionStore {
    pub fn new(docs: DocumentRepository) -> Self {
        Self { docs }
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn set_current_user(&self, user: &UserAccount) -> StoreResult<()> {
        self.docs.set(keys::CURRENT_USER, user).await?;
        debug!("session pointer updated");
        Ok(())
    }

    pub async fn get_current_user(&self) -> Option<UserAccount> {
        self.docs.get(keys::CURRENT_USER).await
    }

    #[instrument(skip(self))]
    pub async fn clear_current_user(&self) -> StoreResult<()> {
        self.docs.remove(keys::CURRENT_USER).await?;
        debug!("session pointer cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{KeyValueStore, MemoryKvStore, RetryPolicy, StorageGateway};
    use std::sync::Arc;
    use time::macros::datetime;

    fn session(kv: MemoryKvStore) -> SessionStore {
        let gateway = StorageGateway::new(Arc::new(kv), RetryPolicy::default());
        SessionStore::new(DocumentRepository::new(gateway, "@test:"))
    }

    #[tokio::test]
    async fn set_get_clear() {
        let kv = MemoryKvStore::new();
        let session = session(kv.clone());
        assert!(session.get_current_user().await.is_none());

        let user = UserAccount::placeholder("u1", datetime!(2026-10-17 08:00 UTC));
        session.set_current_user(&user).await.unwrap();
        assert_eq!(session.get_current_user().await, Some(user));

        session.clear_current_user().await.unwrap();
        assert!(session.get_current_user().await.is_none());
        assert!(kv.get_all_keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn second_login_overwrites_snapshot() {
        let session = session(MemoryKvStore::new());
        let now = datetime!(2026-10-17 08:00 UTC);
        session
            .set_current_user(&UserAccount::placeholder("u1", now))
            .await
            .unwrap();
        session
            .set_current_user(&UserAccount::placeholder("u2", now))
            .await
            .unwrap();
        assert_eq!(session.get_current_user().await.unwrap().id, "u2");
    }
}
