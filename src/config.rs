use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;

use crate::activity::repo::DEFAULT_HISTORY_LIMIT;
use crate::storage::RetryPolicy;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_millis(self.base_delay_ms))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Postgres-backed store when set, in-memory store otherwise.
    pub database_url: Option<String>,
    pub key_prefix: String,
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub history_limit: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                database_url: None,
                key_prefix: "@mealmind:".into(),
                retry: RetryConfig {
                    max_attempts: 3,
                    base_delay_ms: 100,
                },
            },
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any variable source. Unset variables take
    /// defaults; set but malformed ones are an error.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            storage: StorageConfig {
                database_url: lookup("DATABASE_URL").filter(|v| !v.is_empty()),
                key_prefix: lookup("STORAGE_KEY_PREFIX").unwrap_or(defaults.storage.key_prefix),
                retry: RetryConfig {
                    max_attempts: parse_or(
                        &lookup,
                        "STORAGE_RETRY_ATTEMPTS",
                        defaults.storage.retry.max_attempts,
                    )?,
                    base_delay_ms: parse_or(
                        &lookup,
                        "STORAGE_RETRY_BASE_DELAY_MS",
                        defaults.storage.retry.base_delay_ms,
                    )?,
                },
            },
            history_limit: parse_or(&lookup, "ACTIVITY_HISTORY_LIMIT", defaults.history_limit)?,
        })
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("invalid {key} value {raw:?}")),
        None => Ok(default),
    }
}
