//! Result cache with per-volatility TTL classes
//!
//! Backed by `moka::future::Cache` with a per-entry expiry taken from the
//! entry's TTL class. There is no entry-count bound; eviction is TTL-only.
//!
//! Concurrent misses for the same key are collapsed by `try_get_with`: one
//! caller computes, the others receive its result. Failed computations are
//! not stored.

pub mod clock;

pub use clock::{Clock, SystemClock};

use crate::config::CacheConfig;
use chrono::{DateTime, Duration, Utc};
use moka::future::Cache;
use moka::Expiry;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Volatility class of a cached field group
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TtlClass {
    /// Bookmaker odds
    Short,
    /// Model predictions
    Medium,
    /// Fixture identity, teams, league
    Long,
}

impl TtlClass {
    /// Class of the most volatile group among `groups`
    pub fn most_volatile<I: IntoIterator<Item = FieldGroup>>(groups: I) -> TtlClass {
        groups
            .into_iter()
            .map(FieldGroup::ttl_class)
            .min()
            .unwrap_or(TtlClass::Long)
    }
}

/// Field groups of a cached result, by data source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldGroup {
    Fixture,
    Predictions,
    Odds,
}

impl FieldGroup {
    pub fn ttl_class(self) -> TtlClass {
        match self {
            FieldGroup::Fixture => TtlClass::Long,
            FieldGroup::Predictions => TtlClass::Medium,
            FieldGroup::Odds => TtlClass::Short,
        }
    }
}

/// Window length per TTL class
#[derive(Debug, Clone, Copy)]
pub struct TtlPolicy {
    pub long: Duration,
    pub medium: Duration,
    pub short: Duration,
}

impl TtlPolicy {
    pub fn window(&self, class: TtlClass) -> Duration {
        match class {
            TtlClass::Long => self.long,
            TtlClass::Medium => self.medium,
            TtlClass::Short => self.short,
        }
    }
}

impl From<&CacheConfig> for TtlPolicy {
    fn from(config: &CacheConfig) -> Self {
        Self {
            long: Duration::seconds(config.long_ttl_secs as i64),
            medium: Duration::seconds(config.medium_ttl_secs as i64),
            short: Duration::seconds(config.short_ttl_secs as i64),
        }
    }
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self::from(&CacheConfig::default())
    }
}

/// Fixture id plus the query parameters that shaped the result
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub fixture_id: u64,
    params: Vec<(String, String)>,
}

impl CacheKey {
    pub fn new(fixture_id: u64) -> Self {
        Self {
            fixture_id,
            params: Vec::new(),
        }
    }

    /// Add a query parameter; order of insertion does not matter
    pub fn with_param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((name.into(), value.to_string()));
        self.params.sort();
        self
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fixture:{}", self.fixture_id)?;
        for (i, (name, value)) in self.params.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{}{}={}", sep, name, value)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub payload: V,
    pub stored_at: DateTime<Utc>,
    pub ttl_class: TtlClass,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: u64,
    pub hits: u64,
    pub misses: u64,
}

/// Expires each entry after the window of its TTL class
struct ClassExpiry {
    policy: TtlPolicy,
}

impl<V> Expiry<CacheKey, CacheEntry<V>> for ClassExpiry {
    fn expire_after_create(
        &self,
        _key: &CacheKey,
        entry: &CacheEntry<V>,
        _created_at: Instant,
    ) -> Option<std::time::Duration> {
        self.policy.window(entry.ttl_class).to_std().ok()
    }
}

pub struct ResultCache<V> {
    entries: Cache<CacheKey, CacheEntry<V>>,
    policy: TtlPolicy,
    /// Decides freshness on read; moka's own timer reclaims the memory
    clock: Arc<dyn Clock>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V: Clone + Send + Sync + 'static> ResultCache<V> {
    pub fn new(policy: TtlPolicy) -> Self {
        Self::with_clock(policy, Arc::new(SystemClock))
    }

    pub fn with_clock(policy: TtlPolicy, clock: Arc<dyn Clock>) -> Self {
        let entries = Cache::builder()
            .expire_after(ClassExpiry { policy })
            .build();

        Self {
            entries,
            policy,
            clock,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Serve `key` from cache, or run `compute` once across all concurrent
    /// callers of the same key and store its result. Errors are not cached.
    pub async fn get_or_try_insert_with<F, Fut, E>(
        &self,
        key: CacheKey,
        compute: F,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(V, TtlClass), E>>,
        E: Clone + Send + Sync + 'static,
    {
        if let Some(entry) = self.entries.get(&key).await {
            if self.is_fresh(&entry) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(key = %key, "Cache hit");
                return Ok(entry.payload);
            }
            tracing::debug!(key = %key, class = ?entry.ttl_class, "Evicting expired cache entry");
            self.entries.invalidate(&key).await;
        }

        let computed = AtomicBool::new(false);
        let init = async {
            computed.store(true, Ordering::Relaxed);
            let (payload, ttl_class) = compute().await?;
            Ok::<_, E>(CacheEntry {
                payload,
                stored_at: self.clock.now(),
                ttl_class,
            })
        };

        let outcome = self.entries.try_get_with(key.clone(), init).await;

        if computed.load(Ordering::Relaxed) {
            self.misses.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(key = %key, "Cache miss");
        } else {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(key = %key, "Cache hit after in-flight computation");
        }

        match outcome {
            Ok(entry) => Ok(entry.payload),
            Err(shared) => Err(Arc::try_unwrap(shared).unwrap_or_else(|e| (*e).clone())),
        }
    }

    pub async fn stats(&self) -> CacheStats {
        self.entries.run_pending_tasks().await;
        CacheStats {
            entries: self.entries.entry_count(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    fn is_fresh(&self, entry: &CacheEntry<V>) -> bool {
        self.clock.now() - entry.stored_at < self.policy.window(entry.ttl_class)
    }
}
