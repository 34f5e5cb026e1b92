use deadpool_redis::{redis::AsyncCommands, Runtime};
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::api::error;

pub async fn connect_database(database_url: &str) -> Result<PgPool, error::SystemError> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .min_connections(1)
        .acquire_slow_threshold(std::time::Duration::from_secs(3))
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    log::info!("Database connected and migrations applied");

    Ok(pool)
}

/// Byte-level key/value cache with per-key expiry.
#[async_trait::async_trait]
pub trait CacheStore: Send + Sync {
    async fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, error::SystemError>;

    async fn set_bytes(
        &self,
        key: &str,
        value: Vec<u8>,
        expiration: u64,
    ) -> Result<(), error::SystemError>;

    /// Returns whether the key existed.
    async fn delete(&self, key: &str) -> Result<bool, error::SystemError>;
}

impl dyn CacheStore {
    pub async fn get<T>(&self, key: &str) -> Result<Option<T>, error::SystemError>
    where
        T: serde::de::DeserializeOwned,
    {
        match self.get_bytes(key).await? {
            Some(v) => Ok(Some(serde_json::from_slice(&v)?)),
            None => Ok(None),
        }
    }

    pub async fn set<T>(&self, key: &str, value: &T, expiration: u64) -> Result<(), error::SystemError>
    where
        T: serde::Serialize,
    {
        let serialized = serde_json::to_vec(value)?;
        self.set_bytes(key, serialized, expiration).await
    }
}

pub struct RedisCache {
    pool: deadpool_redis::Pool,
}

impl RedisCache {
    pub async fn new(redis_url: &str) -> Result<Self, error::SystemError> {
        let mut cfg = deadpool_redis::Config::from_url(redis_url);
        cfg.pool = Some(deadpool_redis::PoolConfig { max_size: 16, ..Default::default() });
        let pool = cfg.create_pool(Some(Runtime::Tokio1))?;
        Ok(Self { pool })
    }
}

#[async_trait::async_trait]
impl CacheStore for RedisCache {
    async fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, error::SystemError> {
        let mut conn = self.pool.get().await?;
        let value: Option<Vec<u8>> = conn.get(key).await?;
        Ok(value)
    }

    async fn set_bytes(
        &self,
        key: &str,
        value: Vec<u8>,
        expiration: u64,
    ) -> Result<(), error::SystemError> {
        let mut conn = self.pool.get().await?;
        conn.set_ex::<_, _, ()>(key, value, expiration).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, error::SystemError> {
        let mut conn = self.pool.get().await?;
        let removed: i64 = conn.del(key).await?;
        Ok(removed > 0)
    }
}
