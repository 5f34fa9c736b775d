// ============================================================================
// REDIS SERVICE
// ============================================================================
// Purpose: Redis connection and operations for the campaign ledger,
//          coupons and access tokens
// ============================================================================

use deadpool_redis::{Connection, Pool};
use redis::{AsyncCommands, RedisError};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

#[derive(Clone)]
pub struct RedisService {
    pool: Pool,
}

impl RedisService {
    pub fn new(pool: deadpool_redis::Pool) -> Self {
        Self { pool }
    }

    /// Get a Redis connection from the pool
    async fn get_connection(&self) -> Result<Connection, RedisError> {
        self.pool.get().await.map_err(|e| {
            error!("Failed to get Redis connection: {}", e);
            RedisError::from((redis::ErrorKind::IoError, "Connection pool error"))
        })
    }

    /// Set a key-value pair with TTL
    pub async fn set_with_ttl<T>(&self, key: &str, value: &T, ttl_seconds: u64) -> Result<(), RedisError>
    where
        T: Serialize,
    {
        let mut conn = self.get_connection().await?;
        let serialized = serde_json::to_string(value).map_err(|e| {
            error!("Failed to serialize value for key {}: {}", key, e);
            RedisError::from((redis::ErrorKind::TypeError, "Serialization error"))
        })?;

        conn.set_ex::<_, _, ()>(key, serialized, ttl_seconds).await?;

        info!(key = %key, ttl = ttl_seconds, "🔑 Redis key set with TTL");

        Ok(())
    }

    /// Set a key-value pair without expiry (usage records persist indefinitely)
    pub async fn set<T>(&self, key: &str, value: &T) -> Result<(), RedisError>
    where
        T: Serialize,
    {
        let mut conn = self.get_connection().await?;
        let serialized = serde_json::to_string(value).map_err(|e| {
            error!("Failed to serialize value for key {}: {}", key, e);
            RedisError::from((redis::ErrorKind::TypeError, "Serialization error"))
        })?;

        conn.set::<_, _, ()>(key, serialized).await?;
        Ok(())
    }

    /// Get a value by key and deserialize it
    pub async fn get<T>(&self, key: &str) -> Result<Option<T>, RedisError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let mut conn = self.get_connection().await?;
        let value: Option<String> = conn.get(key).await?;

        match value {
            Some(serialized) => {
                let deserialized = serde_json::from_str(&serialized).map_err(|e| {
                    error!("Failed to deserialize value for key {}: {}", key, e);
                    RedisError::from((redis::ErrorKind::TypeError, "Deserialization error"))
                })?;
                Ok(Some(deserialized))
            }
            None => Ok(None),
        }
    }

    /// Delete a key
    pub async fn delete(&self, key: &str) -> Result<bool, RedisError> {
        let mut conn = self.get_connection().await?;
        let deleted: i32 = conn.del(key).await?;
        Ok(deleted > 0)
    }

    /// Check if a key exists
    pub async fn exists(&self, key: &str) -> Result<bool, RedisError> {
        let mut conn = self.get_connection().await?;
        let exists: bool = conn.exists(key).await?;
        Ok(exists)
    }

    /// Read an integer counter, absent key counts as zero
    pub async fn get_counter(&self, key: &str) -> Result<i64, RedisError> {
        let mut conn = self.get_connection().await?;
        let value: Option<i64> = conn.get(key).await?;
        Ok(value.unwrap_or(0))
    }

    /// Atomic claim of a one-shot slot: SET NX with a serialized marker.
    /// Returns true when this caller won the slot, false when it was
    /// already taken. The gate itself is the atomic operation; there is no
    /// separate exists-then-set round trip.
    pub async fn claim_slot<T>(&self, key: &str, marker: &T) -> Result<bool, RedisError>
    where
        T: Serialize,
    {
        let mut conn = self.get_connection().await?;
        let serialized = serde_json::to_string(marker).map_err(|e| {
            error!("Failed to serialize marker for key {}: {}", key, e);
            RedisError::from((redis::ErrorKind::TypeError, "Serialization error"))
        })?;

        let won: bool = conn.set_nx(key, serialized).await?;

        info!(key = %key, won = won, "🎟️ Slot claim attempt");

        Ok(won)
    }

    /// Atomic increment bounded by a ceiling. Returns the new counter
    /// value, or -1 when the counter already reached the ceiling (the
    /// counter is left untouched in that case). Runs as a single Lua
    /// script so concurrent callers can never push the counter past the
    /// ceiling.
    pub async fn incr_with_ceiling(&self, key: &str, ceiling: i64) -> Result<i64, RedisError> {
        const SCRIPT: &str = r#"
            local current = tonumber(redis.call('GET', KEYS[1]) or '0')
            if current >= tonumber(ARGV[1]) then
                return -1
            end
            return redis.call('INCR', KEYS[1])
        "#;

        let mut conn = self.get_connection().await?;
        let value: i64 = redis::Script::new(SCRIPT)
            .key(key)
            .arg(ceiling)
            .invoke_async(&mut conn)
            .await?;

        info!(key = %key, value = value, ceiling = ceiling, "📊 Bounded counter increment");

        Ok(value)
    }

    /// Atomic decrement, used to hand a slot back after a downstream
    /// rejection. Floors at zero.
    pub async fn decr_floor_zero(&self, key: &str) -> Result<i64, RedisError> {
        const SCRIPT: &str = r#"
            local current = tonumber(redis.call('GET', KEYS[1]) or '0')
            if current <= 0 then
                return 0
            end
            return redis.call('DECR', KEYS[1])
        "#;

        let mut conn = self.get_connection().await?;
        let value: i64 = redis::Script::new(SCRIPT)
            .key(key)
            .invoke_async(&mut conn)
            .await?;
        Ok(value)
    }

    /// Atomic one-shot burn of a JSON record carrying a `used` flag.
    /// Returns 1 when this call flipped unused -> used, 0 when the record
    /// was already used, -1 when the key is gone. Preserves the remaining
    /// TTL of the record.
    pub async fn burn_once(&self, key: &str, used_at: &str) -> Result<i64, RedisError> {
        const SCRIPT: &str = r#"
            local raw = redis.call('GET', KEYS[1])
            if not raw then
                return -1
            end
            local record = cjson.decode(raw)
            if record.used then
                return 0
            end
            record.used = true
            record.used_at = ARGV[1]
            local ttl = redis.call('TTL', KEYS[1])
            if ttl > 0 then
                redis.call('SET', KEYS[1], cjson.encode(record), 'EX', ttl)
            else
                redis.call('SET', KEYS[1], cjson.encode(record))
            end
            return 1
        "#;

        let mut conn = self.get_connection().await?;
        let outcome: i64 = redis::Script::new(SCRIPT)
            .key(key)
            .arg(used_at)
            .invoke_async(&mut conn)
            .await?;
        Ok(outcome)
    }

    /// Health check for Redis connection
    pub async fn health_check(&self) -> Result<String, RedisError> {
        let mut conn = self.get_connection().await?;
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(pong)
    }
}

// ============================================================================
// REDIS KEY PATTERNS
// ============================================================================

pub struct RedisKeys;

impl RedisKeys {
    /// Global campaign slot counter
    pub fn campaign_count() -> String {
        "campaign:count".to_string()
    }

    /// Per-fingerprint usage record, free-claim path
    pub fn campaign_used(fingerprint: &str) -> String {
        format!("campaign:used:{}", fingerprint)
    }

    /// Per-fingerprint usage record, paid-refund path
    pub fn refund_used(fingerprint: &str) -> String {
        format!("refund:used:{}", fingerprint)
    }

    /// Append-only feedback record
    pub fn feedback(timestamp: i64, fingerprint: &str) -> String {
        format!("feedback:{}:{}", timestamp, fingerprint)
    }

    /// Append-only share record
    pub fn share(timestamp: i64, fingerprint: &str) -> String {
        format!("share:{}:{}", timestamp, fingerprint)
    }

    /// Coupon record
    pub fn coupon(code: &str) -> String {
        format!("coupon:{}", code)
    }

    /// Premium access token minted by the payment webhook
    pub fn access_token(token: &str) -> String {
        format!("access_token:{}", token)
    }
}
