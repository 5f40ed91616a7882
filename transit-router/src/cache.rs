//! Result caching for route queries.
//!
//! A bounded cache (TTL + max capacity) in front of the facade's path
//! queries. The key carries the full semantic identity of a query
//! including the graph version it ran against, so a republished graph can
//! never serve results computed on a superseded snapshot. The cache is
//! purely a performance layer: behavior with it disabled is identical.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;

use crate::domain::{StopId, TimeOfDay};
use crate::routing::RouteResult;
use crate::search::SortKey;

/// Which facade operation produced a cached entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryOp {
    Fastest,
    Cheapest,
    LeastTransfers,
    Options,
}

/// Cache key: the full semantic identity of a query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub op: QueryOp,
    pub origin: StopId,
    pub destination: StopId,
    pub time_of_day: Option<TimeOfDay>,
    pub sort: SortKey,
    pub max_options: usize,
    /// Version id of the snapshot the query ran against.
    pub graph_version: String,
}

/// Cached value: the ranked results of one query.
pub type CachedRoutes = Arc<Vec<RouteResult>>;

/// Configuration for the query cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(30),
            max_capacity: 1024,
        }
    }
}

/// Bounded-TTL cache for route query results.
pub struct QueryCache {
    routes: MokaCache<QueryKey, CachedRoutes>,
}

impl QueryCache {
    /// Create a new cache with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let routes = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { routes }
    }

    /// Get a cached entry.
    pub async fn get(&self, key: &QueryKey) -> Option<CachedRoutes> {
        self.routes.get(key).await
    }

    /// Insert an entry.
    pub async fn insert(&self, key: QueryKey, routes: CachedRoutes) {
        self.routes.insert(key, routes).await;
        // moka maintains entry_count() via an internal pending-task queue;
        // run it synchronously so entry_count() reflects this insert right away.
        self.routes.run_pending_tasks().await;
    }

    /// Number of cached entries (for monitoring).
    pub fn entry_count(&self) -> u64 {
        self.routes.entry_count()
    }

    /// Invalidate all cached entries.
    pub fn invalidate_all(&self) {
        self.routes.invalidate_all();
    }
}
