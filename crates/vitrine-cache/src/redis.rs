//! Redis-backed filter store.
//!
//! Layout: one hash `<prefix>:product_filters_v1`, one field per encoded
//! [`ContextKey`], each value a JSON [`FilterSummary`]. Leader locks are
//! plain string keys set with `NX PX`.

use async_trait::async_trait;
use redis::{
    AsyncCommands, Client, Script,
    aio::{ConnectionManager, ConnectionManagerConfig},
};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use uuid::Uuid;
use vitrine_models::{ContextKey, FilterSnapshot, FilterSummary};

use crate::config::CacheConfig;
use crate::keys::FilterKeys;
use crate::store::{CacheError, FilterStore, LockToken};

/// Deletes the lock only when it still holds the caller's token.
const RELEASE_LOCK_SCRIPT: &str = r#"
if redis.call("GET", KEYS[1]) == ARGV[1] then
    return redis.call("DEL", KEYS[1])
else
    return 0
end
"#;

/// Redis filter store with a multiplexed, auto-reconnecting connection.
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
    keys: FilterKeys,
    ttl: Duration,
}

impl std::fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCache")
            .field("keys", &self.keys)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl RedisCache {
    /// Connects to Redis.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Connection` if the URL is invalid or the
    /// connection cannot be made within the configured retries.
    pub async fn new(config: &CacheConfig) -> Result<Self, CacheError> {
        let client = Client::open(config.redis_url.as_str())?;
        let manager_config = ConnectionManagerConfig::new()
            .set_number_of_retries(config.max_retries)
            .set_connection_timeout(Duration::from_secs(5));
        let conn = ConnectionManager::new_with_config(client, manager_config).await?;

        Ok(Self {
            conn,
            keys: FilterKeys::new(config.key_prefix.as_str()),
            ttl: config.ttl,
        })
    }

    fn ttl_secs(&self) -> i64 {
        i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX)
    }

    fn parse_summary(field: &str, raw: &str) -> Option<FilterSummary> {
        match serde_json::from_str(raw) {
            Ok(summary) => Some(summary),
            Err(e) => {
                warn!(cache.field = %field, error = %e, "Discarding malformed cached summary");
                None
            }
        }
    }
}

#[async_trait]
impl FilterStore for RedisCache {
    #[instrument(skip(self, keys), fields(cache.operation = "HMGET", cache.fields = keys.len()))]
    async fn get_summaries(
        &self,
        keys: &[ContextKey],
    ) -> Result<Vec<Option<FilterSummary>>, CacheError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.conn.clone();
        let fields: Vec<String> = keys.iter().map(ContextKey::encode).collect();

        let values: Vec<Option<String>> = redis::cmd("HMGET")
            .arg(self.keys.snapshot())
            .arg(&fields)
            .query_async(&mut conn)
            .await?;

        let summaries = fields
            .iter()
            .zip(values)
            .map(|(field, value)| value.and_then(|raw| Self::parse_summary(field, &raw)))
            .collect::<Vec<_>>();

        debug!(
            cache.hits = summaries.iter().filter(|s| s.is_some()).count(),
            "Summary lookup complete"
        );

        Ok(summaries)
    }

    #[instrument(skip(self, summary), fields(cache.operation = "HSET", cache.field = %key))]
    async fn put_summary(
        &self,
        key: &ContextKey,
        summary: &FilterSummary,
    ) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let hash = self.keys.snapshot();
        let json = serde_json::to_string(summary)?;

        let _: () = redis::pipe()
            .atomic()
            .hset(&hash, key.encode(), json)
            .ignore()
            .expire(&hash, self.ttl_secs())
            .ignore()
            .query_async(&mut conn)
            .await?;

        debug!(cache.ttl_secs = self.ttl.as_secs(), "Summary stored");

        Ok(())
    }

    #[instrument(skip(self, snapshot), fields(cache.operation = "REPLACE", cache.contexts = snapshot.len()))]
    async fn replace_snapshot(&self, snapshot: &FilterSnapshot) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let hash = self.keys.snapshot();

        let fields = snapshot
            .iter()
            .map(|(key, summary)| Ok((key.encode(), serde_json::to_string(summary)?)))
            .collect::<Result<Vec<(String, String)>, serde_json::Error>>()?;

        let mut pipe = redis::pipe();
        pipe.atomic().del(&hash).ignore();
        if !fields.is_empty() {
            pipe.hset_multiple(&hash, &fields)
                .ignore()
                .expire(&hash, self.ttl_secs())
                .ignore();
        }

        let _: () = pipe.query_async(&mut conn).await?;

        debug!("Snapshot replaced");

        Ok(())
    }

    #[instrument(skip(self), fields(cache.operation = "HGETALL"))]
    async fn load_snapshot(&self) -> Result<FilterSnapshot, CacheError> {
        let mut conn = self.conn.clone();
        let raw: HashMap<String, String> = conn.hgetall(self.keys.snapshot()).await?;

        let snapshot = raw
            .into_iter()
            .filter_map(|(field, value)| {
                let key = match ContextKey::decode(&field) {
                    Ok(key) => key,
                    Err(e) => {
                        warn!(cache.field = %field, error = %e, "Skipping unreadable context field");
                        return None;
                    }
                };
                Self::parse_summary(&field, &value).map(|summary| (key, summary))
            })
            .collect();

        Ok(snapshot)
    }

    #[instrument(skip(self), fields(cache.operation = "TTL"))]
    async fn ttl(&self) -> Result<Option<Duration>, CacheError> {
        let mut conn = self.conn.clone();
        let ttl: i64 = conn.ttl(self.keys.snapshot()).await?;

        // -1 (no expiry) or -2 (doesn't exist)
        Ok(u64::try_from(ttl).ok().filter(|secs| *secs > 0).map(Duration::from_secs))
    }

    #[instrument(skip(self), fields(cache.operation = "DEL"))]
    async fn clear(&self) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(self.keys.snapshot()).await?;

        debug!("Snapshot cleared");

        Ok(())
    }

    #[instrument(skip(self), fields(cache.operation = "SET_NX"))]
    async fn try_acquire_lock(
        &self,
        name: &str,
        ttl: Duration,
    ) -> Result<Option<LockToken>, CacheError> {
        let mut conn = self.conn.clone();
        let token = LockToken {
            key: self.keys.lock(name),
            value: Uuid::new_v4().to_string(),
        };
        let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1);

        let reply: Option<String> = redis::cmd("SET")
            .arg(&token.key)
            .arg(&token.value)
            .arg("NX")
            .arg("PX")
            .arg(ttl_ms)
            .query_async(&mut conn)
            .await?;

        Ok(reply.map(|_| token))
    }

    #[instrument(skip(self, token), fields(cache.operation = "UNLOCK", cache.lock = %token.key))]
    async fn release_lock(&self, token: &LockToken) -> Result<bool, CacheError> {
        let mut conn = self.conn.clone();
        let script = Script::new(RELEASE_LOCK_SCRIPT);

        let released: i64 = script
            .key(&token.key)
            .arg(&token.value)
            .invoke_async(&mut conn)
            .await?;

        Ok(released == 1)
    }

    async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
