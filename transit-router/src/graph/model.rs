//! Route graph snapshot types.
//!
//! A `RouteGraph` is an immutable snapshot of the whole stop/edge network.
//! Once published it is never mutated; rebuilds produce a new snapshot and
//! supersede the old one in the store.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::domain::{RouteId, StopDetails, StopId};

/// Fixed penalty in minutes charged per transfer on an edge traversal.
pub const TRANSFER_PENALTY_MIN: f64 = 10.0;

/// One route's membership entry on a stop node.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteMembership {
    pub route_id: RouteId,
    pub route_number: String,
    /// Position of the stop within the route's sequence.
    pub sequence: u32,
}

/// A stop in the graph, with the routes that call at it.
#[derive(Debug, Clone, PartialEq)]
pub struct StopNode {
    pub details: StopDetails,
    pub memberships: Vec<RouteMembership>,
}

/// One route's traversal of an edge.
#[derive(Debug, Clone, PartialEq)]
pub struct Traversal {
    pub route_id: RouteId,
    pub route_number: String,
    /// Segment distance, kilometers.
    pub distance_km: f64,
    /// Segment duration, minutes.
    pub duration_min: f64,
    /// Average speed in km/h (`distance / duration × 60`), 0 when the
    /// distance is unknown.
    pub average_speed: f64,
    /// Segment fare.
    pub fare: f64,
    /// Minutes charged if boarding this traversal requires a transfer.
    pub transfer_penalty_min: f64,
}

/// A stop where a transfer happens partway along an edge.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferStop {
    pub stop_id: StopId,
    pub stop_name: String,
    /// Minutes spent making the transfer.
    pub transfer_min: f64,
}

/// A directed connection between two stops consecutive on at least one
/// route. Several routes may share the same stop pair; each contributes
/// one traversal record.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub from: StopId,
    pub to: StopId,
    pub traversals: Vec<Traversal>,
    /// Minimum duration across traversals, minutes.
    pub min_duration: f64,
    /// Minimum fare across traversals.
    pub min_fare: f64,
    /// Mean duration across traversals, minutes.
    pub average_duration: f64,
    /// Mean fare across traversals.
    pub average_fare: f64,
    /// False when riding this edge involves an intermediate transfer.
    pub direct_connection: bool,
    pub transfer_stops: Vec<TransferStop>,
}

impl Edge {
    /// The traversal whose figures represent this edge in rider-facing
    /// output. `None` only for a hand-built edge with no traversals; the
    /// graph constructor drops such edges.
    pub fn primary_traversal(&self) -> Option<&Traversal> {
        self.traversals.first()
    }

    /// Total transfer minutes charged when this edge is not a direct
    /// connection.
    pub fn transfer_time_min(&self) -> f64 {
        if self.direct_connection {
            0.0
        } else {
            self.transfer_stops.iter().map(|t| t.transfer_min).sum()
        }
    }
}

/// Metadata identifying one built snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphVersion {
    pub id: String,
    pub built_at: DateTime<Utc>,
    pub build_time: Duration,
}

/// Immutable snapshot of the transit network.
#[derive(Debug, Clone)]
pub struct RouteGraph {
    version: GraphVersion,
    nodes: HashMap<StopId, StopNode>,
    edges: Vec<Edge>,
    /// Outgoing edge indices per stop.
    adjacency: HashMap<StopId, Vec<usize>>,
}

impl RouteGraph {
    /// Assemble a snapshot. Edges with no traversals cannot be ridden and
    /// are dropped here, so the rest of the crate can rely on every edge
    /// having a primary traversal.
    pub(crate) fn new(
        version: GraphVersion,
        nodes: HashMap<StopId, StopNode>,
        edges: Vec<Edge>,
    ) -> Self {
        let edges: Vec<Edge> = edges
            .into_iter()
            .filter(|e| !e.traversals.is_empty())
            .collect();

        let mut adjacency: HashMap<StopId, Vec<usize>> = HashMap::new();
        for (idx, edge) in edges.iter().enumerate() {
            adjacency.entry(edge.from.clone()).or_default().push(idx);
        }

        Self {
            version,
            nodes,
            edges,
            adjacency,
        }
    }

    /// Snapshot metadata.
    pub fn version(&self) -> &GraphVersion {
        &self.version
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Whether a stop exists in this snapshot.
    pub fn contains_stop(&self, id: &StopId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Look up a stop node.
    pub fn node(&self, id: &StopId) -> Option<&StopNode> {
        self.nodes.get(id)
    }

    /// All stop nodes, in no particular order.
    pub fn nodes(&self) -> impl Iterator<Item = &StopNode> {
        self.nodes.values()
    }

    /// All edges, in build order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Outgoing edges of a stop, as (index, edge) pairs.
    pub fn edges_from(&self, id: &StopId) -> impl Iterator<Item = (usize, &Edge)> {
        self.adjacency
            .get(id)
            .into_iter()
            .flatten()
            .map(|&idx| (idx, &self.edges[idx]))
    }
}
