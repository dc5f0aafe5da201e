use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use super::repo_types::{NewUser, UserAccount, UserPatch};
use crate::clock::Clock;
use crate::error::{StoreError, StoreResult};
use crate::ids::generate_id;
use crate::storage::documents::{keys, DocumentRepository};

/// Account records kept as one array under the `users` key. Uniqueness of
/// username and email is checked by scanning that array before appending,
/// so it only holds for a single writer.
#[derive(Clone)]
pub struct UserStore {
    docs: DocumentRepository,
    clock: Arc<dyn Clock>,
}

impl UserStore {
    pub fn new(docs: DocumentRepository, clock: Arc<dyn Clock>) -> Self {
        Self { docs, clock }
    }

    #[instrument(skip(self, new), fields(username = %new.username))]
    pub async fn create_user(&self, new: NewUser) -> StoreResult<UserAccount> {
        let now = self.clock.now();
        let user = self
            .docs
            .update(keys::USERS, |users: &mut Vec<UserAccount>| {
                if users
                    .iter()
                    .any(|u| u.username == new.username || u.email == new.email)
                {
                    return Err(StoreError::DuplicateUser);
                }
                let user = UserAccount::from_new(generate_id(now), new, now);
                users.push(user.clone());
                Ok(user)
            })
            .await
            .map_err(|e| {
                warn!(error = %e, "create user failed");
                e
            })?;

        info!(user_id = %user.id, "user created");
        Ok(user)
    }

    /// First account whose username or email equals `identifier` and whose
    /// password matches exactly. An empty identifier never matches, so
    /// placeholder records cannot be logged into.
    #[instrument(skip(self, password))]
    pub async fn get_user_by_credentials(
        &self,
        identifier: &str,
        password: &str,
    ) -> Option<UserAccount> {
        if identifier.is_empty() {
            debug!("empty identifier");
            return None;
        }
        let users: Vec<UserAccount> = self.docs.get(keys::USERS).await;
        let found = users
            .into_iter()
            .find(|u| u.is_identified_by(identifier) && u.password == password);
        if found.is_none() {
            debug!("no user matches credentials");
        }
        found
    }

    /// Merges `patch` over the record with `id`. When no such record exists a
    /// placeholder is created first, so the merge always lands.
    #[instrument(skip(self, patch))]
    pub async fn update_user(&self, id: &str, patch: UserPatch) -> StoreResult<UserAccount> {
        let now = self.clock.now();
        let user = self
            .docs
            .update(keys::USERS, |users: &mut Vec<UserAccount>| {
                let idx = match users.iter().position(|u| u.id == id) {
                    Some(idx) => idx,
                    None => {
                        debug!(user_id = %id, "no local record, creating placeholder");
                        users.push(UserAccount::placeholder(id, now));
                        users.len() - 1
                    }
                };
                let user = &mut users[idx];
                patch.apply(user);
                user.updated_at = now;
                Ok(user.clone())
            })
            .await?;

        debug!(user_id = %user.id, "user updated");
        Ok(user)
    }

    pub async fn get_user_by_id(&self, id: &str) -> Option<UserAccount> {
        let users: Vec<UserAccount> = self.docs.get(keys::USERS).await;
        users.into_iter().find(|u| u.id == id)
    }

    pub async fn get_all_users(&self) -> Vec<UserAccount> {
        self.docs.get(keys::USERS).await
    }

    /// Returns whether a record was removed.
    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: &str) -> StoreResult<bool> {
        let removed = self
            .docs
            .update(keys::USERS, |users: &mut Vec<UserAccount>| {
                let before = users.len();
                users.retain(|u| u.id != id);
                Ok(users.len() != before)
            })
            .await?;
        if removed {
            info!(user_id = %id, "user deleted");
        }
        Ok(removed)
    }
}
