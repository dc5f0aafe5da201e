use thiserror::Error;

use crate::storage::KvError;

/// Errors surfaced by write-path operations. Read paths swallow failures and
/// fall back to empty values, so they never return this type.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("a user with this username or email already exists")]
    DuplicateUser,

    #[error("invalid day {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),

    /// Backend failure, passed through after retries were exhausted.
    #[error(transparent)]
    StorageFailure(#[from] KvError),

    #[error("failed to serialize document: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;
