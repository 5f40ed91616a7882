//! The routing facade: fastest / cheapest / least-transfer / top-N
//! queries over the latest published graph snapshot.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::{CacheConfig, CachedRoutes, QueryCache, QueryKey, QueryOp};
use crate::domain::{StopId, TimeOfDay};
use crate::enrich::{self, EnrichedRoute};
use crate::graph::{GraphStore, RouteGraph};
use crate::search::{Criterion, InvalidCriterion, PathResult, SearchError, SortKey, shortest_path};

use super::nearby::{NearbyStop, nearby_stops};

/// Error from a routing query.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoutingError {
    /// No graph has been published yet; build and publish one first.
    #[error("no route graph available; build and publish one first")]
    GraphUnavailable,

    /// A queried stop id does not exist in the graph.
    #[error("stop {0} does not exist in the graph")]
    StopNotFound(StopId),

    /// No connection exists between the two stops. An expected outcome,
    /// not an infrastructure failure.
    #[error("no route found from {origin} to {destination}")]
    NoRouteFound {
        origin: StopId,
        destination: StopId,
    },

    /// An unsupported criterion or sort key was requested.
    #[error(transparent)]
    InvalidCriterion(#[from] InvalidCriterion),
}

impl From<SearchError> for RoutingError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::StopNotFound(id) => RoutingError::StopNotFound(id),
            SearchError::NoRouteFound {
                origin,
                destination,
            } => RoutingError::NoRouteFound {
                origin,
                destination,
            },
        }
    }
}

/// Options for a route query.
#[derive(Debug, Clone)]
pub struct QueryOptions {
    /// Maximum number of results returned by option queries.
    pub max_options: usize,

    /// Ordering for option lists.
    pub sort: SortKey,

    /// Give-up point. Past this instant, enrichment is skipped and the
    /// raw path returned as-is; the search itself always runs.
    pub deadline: Option<Instant>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            max_options: 5,
            sort: SortKey::Duration,
            deadline: None,
        }
    }
}

/// A query answer: the raw path plus best-effort enrichment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteResult {
    pub path: PathResult,
    /// `None` when enrichment failed or was skipped; the path stands on
    /// its own.
    pub enrichment: Option<EnrichedRoute>,
}

impl RouteResult {
    /// Number of route changes along the path.
    pub fn transfer_count(&self) -> usize {
        self.path.transfer_count()
    }
}

/// Facade over the graph store, search engine and enrichment pipeline.
pub struct RoutingService {
    store: Arc<GraphStore>,
    cache: Option<QueryCache>,
}

impl RoutingService {
    /// Create a facade without a result cache.
    pub fn new(store: Arc<GraphStore>) -> Self {
        Self { store, cache: None }
    }

    /// Create a facade with a bounded-TTL result cache in front of every
    /// path query.
    pub fn with_cache(store: Arc<GraphStore>, config: &CacheConfig) -> Self {
        Self {
            store,
            cache: Some(QueryCache::new(config)),
        }
    }

    /// Fastest route between two stops, optionally adjusted for a time of
    /// day.
    pub async fn find_fastest(
        &self,
        origin: &StopId,
        destination: &StopId,
        time_of_day: Option<TimeOfDay>,
        options: &QueryOptions,
    ) -> Result<RouteResult, RoutingError> {
        self.single(
            QueryOp::Fastest,
            Criterion::Duration,
            origin,
            destination,
            time_of_day,
            options,
        )
        .await
    }

    /// Cheapest route between two stops.
    pub async fn find_cheapest(
        &self,
        origin: &StopId,
        destination: &StopId,
        options: &QueryOptions,
    ) -> Result<RouteResult, RoutingError> {
        self.single(
            QueryOp::Cheapest,
            Criterion::Fare,
            origin,
            destination,
            None,
            options,
        )
        .await
    }

    /// Route with the fewest transfers.
    ///
    /// Runs a fastest-path search and annotates the result with its
    /// transfer count; it does not minimize transfers independently.
    pub async fn find_least_transfers(
        &self,
        origin: &StopId,
        destination: &StopId,
        options: &QueryOptions,
    ) -> Result<RouteResult, RoutingError> {
        self.single(
            QueryOp::LeastTransfers,
            Criterion::Duration,
            origin,
            destination,
            None,
            options,
        )
        .await
    }

    /// Ranked route options: one search per criterion, sorted by the
    /// requested key and truncated to `max_options`.
    ///
    /// A criterion whose search finds no path is skipped; the query as a
    /// whole fails only when every criterion comes up empty.
    pub async fn find_options(
        &self,
        origin: &StopId,
        destination: &StopId,
        time_of_day: Option<TimeOfDay>,
        options: &QueryOptions,
    ) -> Result<Vec<RouteResult>, RoutingError> {
        let graph = self.latest_graph()?;
        for id in [origin, destination] {
            if !graph.contains_stop(id) {
                return Err(RoutingError::StopNotFound(id.clone()));
            }
        }

        let key = query_key(QueryOp::Options, origin, destination, time_of_day, options, &graph);
        if let Some(cached) = self.cached(&key).await {
            debug!(%origin, %destination, "options cache hit");
            return Ok(cached.as_ref().clone());
        }

        let mut results = Vec::new();
        for criterion in [Criterion::Duration, Criterion::Fare, Criterion::Distance] {
            match shortest_path(&graph, origin, destination, criterion) {
                Ok(path) => results.push(self.finish(path, &graph, time_of_day, options)),
                Err(err) => warn!(%criterion, %err, "criterion search failed"),
            }
        }

        if results.is_empty() {
            return Err(RoutingError::NoRouteFound {
                origin: origin.clone(),
                destination: destination.clone(),
            });
        }

        sort_results(&mut results, options.sort);
        results.truncate(options.max_options);

        // As in `single`: cache only when every option is fully enriched.
        if results.iter().all(|r| r.enrichment.is_some()) {
            self.store_cached(key, Arc::new(results.clone())).await;
        }
        Ok(results)
    }

    /// Stops within `radius_km` of a point, closest first.
    pub fn find_nearby_stops(
        &self,
        latitude: f64,
        longitude: f64,
        radius_km: f64,
    ) -> Result<Vec<NearbyStop>, RoutingError> {
        let graph = self.latest_graph()?;
        Ok(nearby_stops(
            graph.nodes().map(|n| &n.details),
            latitude,
            longitude,
            radius_km,
        ))
    }

    /// Number of cached query results (0 when caching is disabled).
    pub fn cache_entry_count(&self) -> u64 {
        self.cache.as_ref().map_or(0, QueryCache::entry_count)
    }

    /// Drop every cached query result.
    pub fn invalidate_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.invalidate_all();
        }
    }

    fn latest_graph(&self) -> Result<Arc<RouteGraph>, RoutingError> {
        self.store.latest().ok_or(RoutingError::GraphUnavailable)
    }

    async fn single(
        &self,
        op: QueryOp,
        criterion: Criterion,
        origin: &StopId,
        destination: &StopId,
        time_of_day: Option<TimeOfDay>,
        options: &QueryOptions,
    ) -> Result<RouteResult, RoutingError> {
        let graph = self.latest_graph()?;

        let key = query_key(op, origin, destination, time_of_day, options, &graph);
        if let Some(cached) = self.cached(&key).await {
            if let Some(result) = cached.first() {
                debug!(?op, %origin, %destination, "cache hit");
                return Ok(result.clone());
            }
        }

        let path = shortest_path(&graph, origin, destination, criterion)?;
        let result = self.finish(path, &graph, time_of_day, options);

        // The deadline is not part of the key, so only fully-enriched
        // results may enter the cache: a degraded entry must never be
        // served to a later query that could enrich.
        if result.enrichment.is_some() {
            self.store_cached(key, Arc::new(vec![result.clone()])).await;
        }
        Ok(result)
    }

    /// Enrich unless the deadline has passed. Enrichment failures fall
    /// back to the raw path; they never fail the query.
    fn finish(
        &self,
        path: PathResult,
        graph: &RouteGraph,
        time_of_day: Option<TimeOfDay>,
        options: &QueryOptions,
    ) -> RouteResult {
        if options.deadline.is_some_and(|d| Instant::now() >= d) {
            debug!("deadline passed; skipping enrichment");
            return RouteResult {
                path,
                enrichment: None,
            };
        }

        match enrich::enrich(&path, graph, time_of_day) {
            Ok(enriched) => RouteResult {
                path,
                enrichment: Some(enriched),
            },
            Err(err) => {
                warn!(%err, "enrichment failed; returning raw path");
                RouteResult {
                    path,
                    enrichment: None,
                }
            }
        }
    }

    async fn cached(&self, key: &QueryKey) -> Option<CachedRoutes> {
        match &self.cache {
            Some(cache) => cache.get(key).await,
            None => None,
        }
    }

    async fn store_cached(&self, key: QueryKey, value: CachedRoutes) {
        if let Some(cache) = &self.cache {
            cache.insert(key, value).await;
        }
    }
}

fn query_key(
    op: QueryOp,
    origin: &StopId,
    destination: &StopId,
    time_of_day: Option<TimeOfDay>,
    options: &QueryOptions,
    graph: &RouteGraph,
) -> QueryKey {
    QueryKey {
        op,
        origin: origin.clone(),
        destination: destination.clone(),
        time_of_day,
        sort: options.sort,
        max_options: options.max_options,
        graph_version: graph.version().id.clone(),
    }
}

fn sort_results(results: &mut [RouteResult], sort: SortKey) {
    match sort {
        SortKey::Duration => results.sort_by(|a, b| {
            a.path
                .total_duration_min
                .total_cmp(&b.path.total_duration_min)
        }),
        SortKey::Fare => results.sort_by(|a, b| a.path.total_fare.total_cmp(&b.path.total_fare)),
        SortKey::Transfers => results.sort_by_key(RouteResult::transfer_count),
        SortKey::Distance => results.sort_by(|a, b| {
            a.path
                .total_distance_km
                .total_cmp(&b.path.total_distance_km)
        }),
    }
}
