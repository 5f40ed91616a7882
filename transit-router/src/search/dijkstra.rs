//! Dijkstra shortest-path search.
//!
//! Runs to completion in memory once started; the only suspension points
//! of a query sit outside this module. Results are self-contained copies
//! of the traversed edge data, so they stay valid after the snapshot that
//! produced them is superseded.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use serde::Serialize;
use tracing::{debug, trace};

use crate::domain::{RouteId, StopId};
use crate::graph::{Edge, RouteGraph};

use super::criterion::Criterion;

/// Error from shortest-path search.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// A queried stop id does not exist in the graph.
    #[error("stop {0} does not exist in the graph")]
    StopNotFound(StopId),

    /// The frontier emptied without reaching the destination. An expected
    /// outcome for disconnected stops, not an infrastructure failure.
    #[error("no route found from {origin} to {destination}")]
    NoRouteFound {
        origin: StopId,
        destination: StopId,
    },
}

/// One traversed edge of a returned path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathHop {
    pub from: StopId,
    pub to: StopId,
    /// Route represented by this hop (the edge's first traversal).
    pub route_id: RouteId,
    pub route_number: String,
    /// The representing traversal's own figures, used when hops are
    /// collapsed into rider-facing legs.
    pub duration_min: f64,
    pub fare: f64,
    pub distance_km: f64,
    /// Edge aggregates, used for path totals.
    pub min_duration: f64,
    pub min_fare: f64,
    /// Transfer minutes charged on non-direct edges.
    pub transfer_min: f64,
}

/// A raw path between two stops.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathResult {
    pub criterion: Criterion,
    /// Total weight under the search criterion.
    pub total_weight: f64,
    /// Stop ids from origin to destination inclusive.
    pub stops: Vec<StopId>,
    pub hops: Vec<PathHop>,
    /// Sum of edge minimum durations plus transfer minutes, regardless of
    /// the optimized criterion.
    pub total_duration_min: f64,
    /// Sum of edge minimum fares, regardless of the optimized criterion.
    pub total_fare: f64,
    /// Sum of hop distances, kilometers.
    pub total_distance_km: f64,
}

impl PathResult {
    /// Number of route changes along the path.
    pub fn transfer_count(&self) -> usize {
        self.hops
            .windows(2)
            .filter(|w| w[0].route_id != w[1].route_id)
            .count()
    }
}

/// Frontier entry, ordered as a min-heap by tentative weight.
#[derive(Debug, Clone, PartialEq)]
struct FrontierEntry {
    weight: f64,
    stop: StopId,
}

impl Eq for FrontierEntry {}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so BinaryHeap pops the smallest weight first. Ties
        // break arbitrarily.
        other
            .weight
            .total_cmp(&self.weight)
            .then_with(|| other.stop.cmp(&self.stop))
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn hop_from_edge(edge: &Edge) -> PathHop {
    // Every edge in a constructed graph has at least one traversal.
    let primary = &edge.traversals[0];
    PathHop {
        from: edge.from.clone(),
        to: edge.to.clone(),
        route_id: primary.route_id.clone(),
        route_number: primary.route_number.clone(),
        duration_min: primary.duration_min,
        fare: primary.fare,
        distance_km: primary.distance_km,
        min_duration: edge.min_duration,
        min_fare: edge.min_fare,
        transfer_min: edge.transfer_time_min(),
    }
}

/// Find the lightest path from `origin` to `destination` under `criterion`.
///
/// Both stops are checked for existence before the search starts. A
/// disconnected destination yields [`SearchError::NoRouteFound`]; an
/// origin equal to the destination yields a trivial single-stop path with
/// zero totals.
pub fn shortest_path(
    graph: &RouteGraph,
    origin: &StopId,
    destination: &StopId,
    criterion: Criterion,
) -> Result<PathResult, SearchError> {
    for id in [origin, destination] {
        if !graph.contains_stop(id) {
            return Err(SearchError::StopNotFound(id.clone()));
        }
    }

    let mut dist: HashMap<StopId, f64> = HashMap::new();
    let mut prev: HashMap<StopId, (StopId, usize)> = HashMap::new();
    let mut visited: HashSet<StopId> = HashSet::new();
    let mut frontier = BinaryHeap::new();

    dist.insert(origin.clone(), 0.0);
    frontier.push(FrontierEntry {
        weight: 0.0,
        stop: origin.clone(),
    });

    let mut settled = 0usize;
    while let Some(FrontierEntry { weight, stop }) = frontier.pop() {
        if !visited.insert(stop.clone()) {
            continue;
        }
        settled += 1;
        trace!(%stop, weight, "settled");

        if &stop == destination {
            break;
        }

        for (edge_idx, edge) in graph.edges_from(&stop) {
            if visited.contains(&edge.to) {
                continue;
            }
            let tentative = weight + criterion.weight(edge);
            if dist.get(&edge.to).is_none_or(|&known| tentative < known) {
                dist.insert(edge.to.clone(), tentative);
                prev.insert(edge.to.clone(), (stop.clone(), edge_idx));
                frontier.push(FrontierEntry {
                    weight: tentative,
                    stop: edge.to.clone(),
                });
            }
        }
    }

    if origin != destination && !prev.contains_key(destination) {
        debug!(%origin, %destination, settled, "frontier exhausted");
        return Err(SearchError::NoRouteFound {
            origin: origin.clone(),
            destination: destination.clone(),
        });
    }

    // Walk predecessor links back to the origin.
    let mut hops: Vec<PathHop> = Vec::new();
    let mut current = destination.clone();
    while let Some((previous, edge_idx)) = prev.get(&current) {
        hops.push(hop_from_edge(&graph.edges()[*edge_idx]));
        current = previous.clone();
    }
    hops.reverse();

    let mut stops = Vec::with_capacity(hops.len() + 1);
    stops.push(origin.clone());
    stops.extend(hops.iter().map(|h| h.to.clone()));

    let total_duration_min = hops.iter().map(|h| h.min_duration + h.transfer_min).sum();
    let total_fare = hops.iter().map(|h| h.min_fare).sum();
    let total_distance_km = hops.iter().map(|h| h.distance_km).sum();
    let total_weight = dist.get(destination).copied().unwrap_or(0.0);

    debug!(
        %origin,
        %destination,
        %criterion,
        settled,
        hops = hops.len(),
        total_weight,
        "path found"
    );

    Ok(PathResult {
        criterion,
        total_weight,
        stops,
        hops,
        total_duration_min,
        total_fare,
        total_distance_km,
    })
}
