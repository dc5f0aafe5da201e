use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};

use super::{KeyValueStore, KvError};

/// SQLSTATE for `undefined_table`: the store is reachable but the
/// `kv_store` table has not been migrated yet.
const UNDEFINED_TABLE: &str = "42P01";

/// Durable key-value store backed by a single Postgres table.
#[derive(Clone)]
pub struct PgKvStore {
    db: PgPool,
}

impl PgKvStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .context("connect to database")?;
        Ok(Self { db })
    }

    pub fn from_pool(db: PgPool) -> Self {
        Self { db }
    }

    /// Creates the `kv_store` table if it is missing.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.db)
            .await
            .context("run migrations")
    }
}

fn classify(e: sqlx::Error) -> KvError {
    match &e {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(UNDEFINED_TABLE) => {
            KvError::NotInitialized(e.to_string())
        }
        _ => KvError::Backend(e.to_string()),
    }
}

#[async_trait]
impl KeyValueStore for PgKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT value
              FROM kv_store
             WHERE key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.db)
        .await
        .map_err(classify)
    }

    async fn set(&self, key: &str, value: String) -> Result<(), KvError> {
        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value)
            VALUES ($1, $2)
            ON CONFLICT (key) DO UPDATE
               SET value = EXCLUDED.value,
                   updated_at = now()
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.db)
        .await
        .map_err(classify)?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), KvError> {
        sqlx::query("DELETE FROM kv_store WHERE key = $1")
            .bind(key)
            .execute(&self.db)
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn multi_remove(&self, keys: &[String]) -> Result<(), KvError> {
        if keys.is_empty() {
            return Ok(());
        }
        sqlx::query("DELETE FROM kv_store WHERE key = ANY($1)")
            .bind(keys.to_vec())
            .execute(&self.db)
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn get_all_keys(&self) -> Result<Vec<String>, KvError> {
        sqlx::query_scalar::<_, String>("SELECT key FROM kv_store ORDER BY key")
            .fetch_all(&self.db)
            .await
            .map_err(classify)
    }
}
