//! In-process filter store.
//!
//! Mirrors [`RedisCache`](crate::RedisCache): the whole mapping shares one
//! expiry refreshed by every write, and locks expire on their own TTL.
//! Time is read from [`tokio::time::Instant`] so paused-clock tests can
//! drive expiry.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;
use vitrine_models::{ContextKey, FilterSnapshot, FilterSummary};

use crate::store::{CacheError, FilterStore, LockToken};

#[derive(Debug, Default)]
struct State {
    entries: BTreeMap<ContextKey, FilterSummary>,
    expires_at: Option<Instant>,
    locks: HashMap<String, (String, Instant)>,
}

impl State {
    fn purge_expired(&mut self, now: Instant) {
        if self.expires_at.is_some_and(|at| at <= now) {
            self.entries.clear();
            self.expires_at = None;
        }
        self.locks.retain(|_, (_, until)| *until > now);
    }

    fn live_entries(&self, now: Instant) -> Option<&BTreeMap<ContextKey, FilterSummary>> {
        match self.expires_at {
            Some(at) if at > now => Some(&self.entries),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct MemoryFilterStore {
    state: RwLock<State>,
    ttl: Duration,
}

impl MemoryFilterStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            state: RwLock::new(State::default()),
            ttl,
        }
    }
}

#[async_trait]
impl FilterStore for MemoryFilterStore {
    async fn get_summaries(
        &self,
        keys: &[ContextKey],
    ) -> Result<Vec<Option<FilterSummary>>, CacheError> {
        let state = self.state.read().await;
        let entries = state.live_entries(Instant::now());

        Ok(keys
            .iter()
            .map(|key| entries.and_then(|e| e.get(key)).cloned())
            .collect())
    }

    async fn put_summary(
        &self,
        key: &ContextKey,
        summary: &FilterSummary,
    ) -> Result<(), CacheError> {
        let now = Instant::now();
        let mut state = self.state.write().await;
        state.purge_expired(now);
        state.entries.insert(key.clone(), summary.clone());
        state.expires_at = Some(now + self.ttl);

        debug!(cache.field = %key, "Summary stored in memory");
        Ok(())
    }

    async fn replace_snapshot(&self, snapshot: &FilterSnapshot) -> Result<(), CacheError> {
        let now = Instant::now();
        let mut state = self.state.write().await;
        state.entries = snapshot
            .iter()
            .map(|(key, summary)| (key.clone(), summary.clone()))
            .collect();
        state.expires_at = (!state.entries.is_empty()).then(|| now + self.ttl);
        Ok(())
    }

    async fn load_snapshot(&self) -> Result<FilterSnapshot, CacheError> {
        let state = self.state.read().await;
        Ok(state
            .live_entries(Instant::now())
            .map(|entries| {
                entries
                    .iter()
                    .map(|(key, summary)| (key.clone(), summary.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn ttl(&self) -> Result<Option<Duration>, CacheError> {
        let now = Instant::now();
        let state = self.state.read().await;
        Ok(state
            .expires_at
            .filter(|at| *at > now)
            .map(|at| at.duration_since(now)))
    }

    async fn clear(&self) -> Result<(), CacheError> {
        let mut state = self.state.write().await;
        state.entries.clear();
        state.expires_at = None;
        Ok(())
    }

    async fn try_acquire_lock(
        &self,
        name: &str,
        ttl: Duration,
    ) -> Result<Option<LockToken>, CacheError> {
        let now = Instant::now();
        let mut state = self.state.write().await;
        state.purge_expired(now);

        if state.locks.contains_key(name) {
            return Ok(None);
        }

        let token = LockToken {
            key: name.to_string(),
            value: Uuid::new_v4().to_string(),
        };
        state
            .locks
            .insert(token.key.clone(), (token.value.clone(), now + ttl));

        Ok(Some(token))
    }

    async fn release_lock(&self, token: &LockToken) -> Result<bool, CacheError> {
        let mut state = self.state.write().await;
        let owned = state
            .locks
            .get(&token.key)
            .is_some_and(|(value, _)| *value == token.value);

        if owned {
            state.locks.remove(&token.key);
        }
        Ok(owned)
    }

    async fn ping(&self) -> Result<(), CacheError> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
