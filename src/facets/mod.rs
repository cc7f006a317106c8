//! Reference-facet cache
//!
//! Distinct values of the five filterable reference columns, cached per
//! facet with a fixed TTL and a least-recently-used entry ceiling. The time
//! source is injected so expiry is testable without waiting; dashmap gives
//! entry-level atomicity, so readers never observe a partially written
//! entry and concurrent misses simply race to an idempotent refresh.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::types::Result;
use crate::warehouse::Warehouse;

/// A filterable reference column exposed as a facet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facet {
    Cycle,
    OrgLog,
    OrgCd,
    EngmtManager,
    AcoAnalyst,
}

impl Facet {
    pub const ALL: [Facet; 5] = [
        Facet::Cycle,
        Facet::OrgLog,
        Facet::OrgCd,
        Facet::EngmtManager,
        Facet::AcoAnalyst,
    ];

    /// Column of the setup view backing this facet
    pub fn column(&self) -> &'static str {
        match self {
            Self::Cycle => "dx_cycle",
            Self::OrgLog => "org_log",
            Self::OrgCd => "org_cd",
            Self::EngmtManager => "engmt_manager",
            Self::AcoAnalyst => "aco_analyst",
        }
    }

    /// Route segment under /api/filters/
    pub fn name(&self) -> &'static str {
        match self {
            Self::Cycle => "cycle",
            Self::OrgLog => "org-log",
            Self::OrgCd => "org-cd",
            Self::EngmtManager => "engmt-manager",
            Self::AcoAnalyst => "aco-analyst",
        }
    }

    pub fn from_path_segment(segment: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == segment)
    }
}

/// One cached facet value: the cycle facet carries integers, the rest strings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FacetValue {
    Int(i64),
    Str(String),
}

/// Cache tuning knobs
#[derive(Debug, Clone)]
pub struct FacetCacheConfig {
    pub ttl: Duration,
    pub max_entries: usize,
}

impl Default for FacetCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(24 * 60 * 60),
            max_entries: 100,
        }
    }
}

/// Injectable time source
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall-clock time source used outside of tests
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

struct CacheSlot {
    values: Vec<FacetValue>,
    fetched_at: Instant,
    last_used: Instant,
}

/// Counters exposed on the health endpoint
#[derive(Debug, Clone, Default, Serialize)]
pub struct FacetCacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
}

/// TTL + LRU bounded cache of distinct facet values
pub struct FacetCache {
    entries: DashMap<Facet, CacheSlot>,
    config: FacetCacheConfig,
    clock: Arc<dyn Clock>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    expirations: AtomicU64,
}

impl FacetCache {
    pub fn new(config: FacetCacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            config,
            clock,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
            expirations: AtomicU64::new(0),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(FacetCacheConfig::default(), Arc::new(SystemClock))
    }

    pub fn config(&self) -> &FacetCacheConfig {
        &self.config
    }

    /// Cached distinct values for a facet
    ///
    /// A hit within TTL answers from memory. A miss or an expired entry
    /// fetches through the warehouse, filters nulls and stores the result
    /// with a fresh timestamp. A fetch failure propagates and leaves the
    /// cache without an entry for the facet.
    pub async fn get(&self, facet: Facet, warehouse: &dyn Warehouse) -> Result<Vec<FacetValue>> {
        let now = self.clock.now();

        if let Some(mut slot) = self.entries.get_mut(&facet) {
            if now.duration_since(slot.fetched_at) < self.config.ttl {
                slot.last_used = now;
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(facet = facet.name(), "facet cache hit");
                return Ok(slot.values.clone());
            }
        }

        // Expired entries are discarded before the refresh so a failed fetch
        // cannot resurrect stale values.
        if self.entries.remove(&facet).is_some() {
            self.expirations.fetch_add(1, Ordering::Relaxed);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(facet = facet.name(), "facet cache miss, fetching distinct values");

        let rows = warehouse.fetch_distinct(facet.column()).await?;
        let values: Vec<FacetValue> = rows.into_iter().filter_map(facet_value).collect();

        self.evict_for(facet);
        let now = self.clock.now();
        self.entries.insert(
            facet,
            CacheSlot {
                values: values.clone(),
                fetched_at: now,
                last_used: now,
            },
        );
        Ok(values)
    }

    pub fn stats(&self) -> FacetCacheStats {
        FacetCacheStats {
            entries: self.entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
        }
    }

    /// Drop least-recently-used entries until the incoming key fits
    fn evict_for(&self, incoming: Facet) {
        while self.entries.len() >= self.config.max_entries
            && !self.entries.contains_key(&incoming)
        {
            let lru = self
                .entries
                .iter()
                .min_by_key(|entry| entry.value().last_used)
                .map(|entry| *entry.key());
            match lru {
                Some(key) => {
                    self.entries.remove(&key);
                    self.evictions.fetch_add(1, Ordering::Relaxed);
                    debug!(facet = key.name(), "facet cache eviction");
                }
                None => break,
            }
        }
    }
}

/// Convert a warehouse cell into a facet value, dropping nulls
fn facet_value(value: serde_json::Value) -> Option<FacetValue> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::Number(n) => n.as_i64().map(FacetValue::Int),
        serde_json::Value::String(s) => Some(FacetValue::Str(s)),
        other => Some(FacetValue::Str(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    use crate::query::QueryDescriptor;
    use crate::rules::OrgSetupRecord;
    use crate::types::ReviewError;

    /// Test clock advanced by hand
    struct ManualClock {
        start: Instant,
        offset: Mutex<Duration>,
    }

    impl ManualClock {
        fn new() -> Self {
            Self {
                start: Instant::now(),
                offset: Mutex::new(Duration::ZERO),
            }
        }

        fn advance(&self, by: Duration) {
            *self.offset.lock().unwrap() += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            self.start + *self.offset.lock().unwrap()
        }
    }

    /// Counting warehouse stub with optional failure injection
    struct StubWarehouse {
        fetches: AtomicUsize,
        fail: bool,
    }

    impl StubWarehouse {
        fn new() -> Self {
            Self {
                fetches: AtomicUsize::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                fetches: AtomicUsize::new(0),
                fail: true,
            }
        }

        fn fetch_count(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Warehouse for StubWarehouse {
        async fn execute(&self, _query: &QueryDescriptor) -> Result<Vec<OrgSetupRecord>> {
            Ok(Vec::new())
        }

        async fn fetch_distinct(&self, column: &str) -> Result<Vec<serde_json::Value>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ReviewError::BackingService("warehouse down".to_string()));
            }
            Ok(match column {
                "dx_cycle" => vec![
                    serde_json::json!(12),
                    serde_json::json!(null),
                    serde_json::json!(7),
                ],
                _ => vec![serde_json::json!("A"), serde_json::json!(null), serde_json::json!("B")],
            })
        }
    }

    fn cache_with(clock: Arc<ManualClock>, max_entries: usize) -> FacetCache {
        FacetCache::new(
            FacetCacheConfig {
                ttl: Duration::from_secs(86_400),
                max_entries,
            },
            clock,
        )
    }

    #[tokio::test]
    async fn test_hit_within_ttl_skips_fetch() {
        let clock = Arc::new(ManualClock::new());
        let cache = cache_with(Arc::clone(&clock), 100);
        let warehouse = StubWarehouse::new();

        let first = cache.get(Facet::Cycle, &warehouse).await.unwrap();
        assert_eq!(first, vec![FacetValue::Int(12), FacetValue::Int(7)]);
        assert_eq!(warehouse.fetch_count(), 1);

        clock.advance(Duration::from_secs(3600));
        let second = cache.get(Facet::Cycle, &warehouse).await.unwrap();
        assert_eq!(second, first);
        assert_eq!(warehouse.fetch_count(), 1, "hit must not reach the warehouse");
    }

    #[tokio::test]
    async fn test_expiry_triggers_exactly_one_refetch() {
        let clock = Arc::new(ManualClock::new());
        let cache = cache_with(Arc::clone(&clock), 100);
        let warehouse = StubWarehouse::new();

        cache.get(Facet::OrgLog, &warehouse).await.unwrap();
        clock.advance(Duration::from_secs(86_400));
        cache.get(Facet::OrgLog, &warehouse).await.unwrap();
        assert_eq!(warehouse.fetch_count(), 2);
        assert_eq!(cache.stats().expirations, 1);

        // Fresh again after the refresh
        cache.get(Facet::OrgLog, &warehouse).await.unwrap();
        assert_eq!(warehouse.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_nulls_filtered_from_values() {
        let clock = Arc::new(ManualClock::new());
        let cache = cache_with(clock, 100);
        let warehouse = StubWarehouse::new();

        let values = cache.get(Facet::AcoAnalyst, &warehouse).await.unwrap();
        assert_eq!(
            values,
            vec![
                FacetValue::Str("A".to_string()),
                FacetValue::Str("B".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn test_fetch_failure_leaves_cache_unchanged() {
        let clock = Arc::new(ManualClock::new());
        let cache = cache_with(clock, 100);
        let warehouse = StubWarehouse::failing();

        let err = cache.get(Facet::Cycle, &warehouse).await.unwrap_err();
        assert!(matches!(err, ReviewError::BackingService(_)));
        assert_eq!(cache.stats().entries, 0);

        // The next call tries again rather than serving a phantom entry
        let _ = cache.get(Facet::Cycle, &warehouse).await;
        assert_eq!(warehouse.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_lru_eviction_at_capacity() {
        let clock = Arc::new(ManualClock::new());
        let cache = cache_with(Arc::clone(&clock), 2);
        let warehouse = StubWarehouse::new();

        cache.get(Facet::Cycle, &warehouse).await.unwrap();
        clock.advance(Duration::from_secs(1));
        cache.get(Facet::OrgLog, &warehouse).await.unwrap();
        clock.advance(Duration::from_secs(1));

        // Touch Cycle so OrgLog becomes least recently used
        cache.get(Facet::Cycle, &warehouse).await.unwrap();
        clock.advance(Duration::from_secs(1));

        cache.get(Facet::OrgCd, &warehouse).await.unwrap();
        assert_eq!(cache.stats().evictions, 1);
        assert_eq!(cache.stats().entries, 2);

        // OrgLog was evicted; Cycle still answers without a fetch
        let fetches_before = warehouse.fetch_count();
        cache.get(Facet::Cycle, &warehouse).await.unwrap();
        assert_eq!(warehouse.fetch_count(), fetches_before);
        cache.get(Facet::OrgLog, &warehouse).await.unwrap();
        assert_eq!(warehouse.fetch_count(), fetches_before + 1);
    }

    #[test]
    fn test_facet_path_segments_round_trip() {
        for facet in Facet::ALL {
            assert_eq!(Facet::from_path_segment(facet.name()), Some(facet));
        }
        assert_eq!(Facet::from_path_segment("unknown"), None);
    }

    #[test]
    fn test_facet_value_wire_shape() {
        assert_eq!(
            serde_json::to_string(&FacetValue::Int(7)).unwrap(),
            "7"
        );
        assert_eq!(
            serde_json::to_string(&FacetValue::Str("A".to_string())).unwrap(),
            "\"A\""
        );
    }
}
