//! Graph construction from raw stop-sequence records.
//!
//! Records are grouped per route and sorted by sequence; each consecutive
//! pair yields one edge segment. Multiple routes sharing a stop pair
//! accumulate onto the same edge as separate traversal records.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use chrono::Utc;
use tracing::{info, warn};

use crate::domain::{RouteId, StopId, StopSequenceRecord};

use super::model::{
    Edge, GraphVersion, RouteGraph, RouteMembership, StopNode, TRANSFER_PENALTY_MIN, Traversal,
};

/// Error from graph construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// No stop-sequence records were supplied.
    #[error("no stop-sequence records supplied")]
    EmptyInput,
}

/// A segment skipped during construction because its derived measures
/// were unusable.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildWarning {
    pub route_number: String,
    pub from_stop: StopId,
    pub to_stop: StopId,
    pub reason: &'static str,
}

impl fmt::Display for BuildWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "route {}: segment {} -> {} skipped: {}",
            self.route_number, self.from_stop, self.to_stop, self.reason
        )
    }
}

/// Result of a successful build: the snapshot plus any skipped segments.
#[derive(Debug)]
pub struct BuildResult {
    pub graph: RouteGraph,
    pub warnings: Vec<BuildWarning>,
}

/// Builds immutable `RouteGraph` snapshots from stop-sequence records.
///
/// Building never publishes: hand the resulting graph to
/// [`GraphStore::publish`](super::GraphStore::publish) to make it the
/// current latest. A failed build therefore cannot disturb the version
/// readers are using.
#[derive(Debug, Default)]
pub struct GraphBuilder;

impl GraphBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Build a new snapshot from raw records.
    ///
    /// Segments with unusable measures (non-positive duration or distance,
    /// negative fare) are skipped and reported as warnings rather than
    /// failing the build.
    pub fn build(&self, records: &[StopSequenceRecord]) -> Result<BuildResult, BuildError> {
        if records.is_empty() {
            return Err(BuildError::EmptyInput);
        }
        let started = Instant::now();

        // Group per route. An ordered map keeps edge ordering identical
        // across builds from identical input.
        let mut by_route: BTreeMap<RouteId, Vec<&StopSequenceRecord>> = BTreeMap::new();
        for record in records {
            by_route
                .entry(record.route_id.clone())
                .or_default()
                .push(record);
        }

        // Nodes: one per distinct stop, carrying its route memberships.
        let mut nodes: HashMap<StopId, StopNode> = HashMap::new();
        for record in records {
            let node = nodes
                .entry(record.stop.id.clone())
                .or_insert_with(|| StopNode {
                    details: record.stop.clone(),
                    memberships: Vec::new(),
                });
            node.memberships.push(RouteMembership {
                route_id: record.route_id.clone(),
                route_number: record.route_number.clone(),
                sequence: record.sequence,
            });
        }

        // Edges: one per (from, to) pair, accumulating traversals across
        // routes.
        let mut edge_index: HashMap<(StopId, StopId), usize> = HashMap::new();
        let mut edges: Vec<Edge> = Vec::new();
        let mut warnings: Vec<BuildWarning> = Vec::new();

        for (_, mut group) in by_route {
            group.sort_by_key(|r| r.sequence);

            for pair in group.windows(2) {
                let (from, to) = (pair[0], pair[1]);

                let distance = to.distance_from_start_km - from.distance_from_start_km;
                let duration = to.arrival_offset_min - from.departure_offset_min;
                let fare = to.fare_from_start - from.fare_from_start;

                let reason = if duration <= 0.0 || !duration.is_finite() {
                    Some("non-positive segment duration")
                } else if distance <= 0.0 || !distance.is_finite() {
                    Some("non-positive segment distance")
                } else if fare < 0.0 || !fare.is_finite() {
                    Some("negative segment fare")
                } else {
                    None
                };

                if let Some(reason) = reason {
                    warn!(
                        route = %from.route_number,
                        from = %from.stop.id,
                        to = %to.stop.id,
                        reason,
                        "skipping segment"
                    );
                    warnings.push(BuildWarning {
                        route_number: from.route_number.clone(),
                        from_stop: from.stop.id.clone(),
                        to_stop: to.stop.id.clone(),
                        reason,
                    });
                    continue;
                }

                let average_speed = if distance > 0.0 {
                    distance / duration * 60.0
                } else {
                    0.0
                };

                let key = (from.stop.id.clone(), to.stop.id.clone());
                let idx = *edge_index.entry(key).or_insert_with(|| {
                    edges.push(Edge {
                        from: from.stop.id.clone(),
                        to: to.stop.id.clone(),
                        traversals: Vec::new(),
                        min_duration: 0.0,
                        min_fare: 0.0,
                        average_duration: 0.0,
                        average_fare: 0.0,
                        direct_connection: true,
                        transfer_stops: Vec::new(),
                    });
                    edges.len() - 1
                });

                edges[idx].traversals.push(Traversal {
                    route_id: from.route_id.clone(),
                    route_number: from.route_number.clone(),
                    distance_km: distance,
                    duration_min: duration,
                    average_speed,
                    fare,
                    transfer_penalty_min: TRANSFER_PENALTY_MIN,
                });
            }
        }

        for edge in &mut edges {
            edge.min_duration = edge
                .traversals
                .iter()
                .map(|t| t.duration_min)
                .fold(f64::INFINITY, f64::min);
            edge.min_fare = edge
                .traversals
                .iter()
                .map(|t| t.fare)
                .fold(f64::INFINITY, f64::min);
            let n = edge.traversals.len() as f64;
            edge.average_duration = edge.traversals.iter().map(|t| t.duration_min).sum::<f64>() / n;
            edge.average_fare = edge.traversals.iter().map(|t| t.fare).sum::<f64>() / n;
        }

        // A counter component keeps ids unique even when two builds land
        // in the same millisecond.
        static BUILD_SEQ: AtomicU64 = AtomicU64::new(0);
        let seq = BUILD_SEQ.fetch_add(1, Ordering::Relaxed);

        let built_at = Utc::now();
        let version = GraphVersion {
            id: format!("v{}-{seq}", built_at.timestamp_millis()),
            built_at,
            build_time: started.elapsed(),
        };
        let graph = RouteGraph::new(version, nodes, edges);

        info!(
            version = %graph.version().id,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            build_ms = graph.version().build_time.as_millis() as u64,
            skipped = warnings.len(),
            "route graph built"
        );

        Ok(BuildResult { graph, warnings })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Coordinates, StopDetails};

    fn sid(s: &str) -> StopId {
        StopId::parse(s).unwrap()
    }

    fn record(
        route: &str,
        stop: &str,
        sequence: u32,
        distance: f64,
        arrival: f64,
        departure: f64,
        fare: f64,
    ) -> StopSequenceRecord {
        StopSequenceRecord {
            route_id: RouteId::parse(route).unwrap(),
            route_number: route.to_string(),
            stop: StopDetails {
                id: sid(stop),
                code: stop.to_uppercase(),
                name: format!("Stop {stop}"),
                coordinates: Coordinates::new(9.9, 76.3),
            },
            sequence,
            distance_from_start_km: distance,
            arrival_offset_min: arrival,
            departure_offset_min: departure,
            fare_from_start: fare,
        }
    }

    #[test]
    fn empty_input_is_an_error() {
        let result = GraphBuilder::new().build(&[]);
        assert_eq!(result.unwrap_err(), BuildError::EmptyInput);
    }

    #[test]
    fn consecutive_stops_become_edges() {
        let records = vec![
            record("r1", "a", 1, 0.0, 0.0, 0.0, 0.0),
            record("r1", "b", 2, 5.0, 10.0, 12.0, 8.0),
            record("r1", "c", 3, 12.0, 30.0, 30.0, 20.0),
        ];

        let result = GraphBuilder::new().build(&records).unwrap();
        let graph = result.graph;

        assert!(result.warnings.is_empty());
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);

        let (_, ab) = graph.edges_from(&sid("a")).next().unwrap();
        assert_eq!(ab.to, sid("b"));
        let t = &ab.traversals[0];
        assert_eq!(t.distance_km, 5.0);
        assert_eq!(t.duration_min, 10.0);
        assert_eq!(t.fare, 8.0);
        assert_eq!(t.average_speed, 5.0 / 10.0 * 60.0);

        // No edge is synthesized between non-adjacent stops.
        assert!(graph.edges_from(&sid("a")).all(|(_, e)| e.to != sid("c")));
    }

    #[test]
    fn dwell_time_uses_departure_offset() {
        // b arrives at 10 but departs at 12; the b -> c segment starts at
        // the departure.
        let records = vec![
            record("r1", "a", 1, 0.0, 0.0, 0.0, 0.0),
            record("r1", "b", 2, 5.0, 10.0, 12.0, 8.0),
            record("r1", "c", 3, 9.0, 20.0, 20.0, 14.0),
        ];

        let result = GraphBuilder::new().build(&records).unwrap();
        let (_, bc) = result.graph.edges_from(&sid("b")).next().unwrap();
        assert_eq!(bc.traversals[0].duration_min, 8.0);
    }

    #[test]
    fn unsorted_input_is_ordered_by_sequence() {
        let records = vec![
            record("r1", "c", 3, 12.0, 30.0, 30.0, 20.0),
            record("r1", "a", 1, 0.0, 0.0, 0.0, 0.0),
            record("r1", "b", 2, 5.0, 10.0, 10.0, 8.0),
        ];

        let result = GraphBuilder::new().build(&records).unwrap();
        let graph = result.graph;

        assert_eq!(graph.edge_count(), 2);
        let (_, ab) = graph.edges_from(&sid("a")).next().unwrap();
        assert_eq!(ab.to, sid("b"));
        let (_, bc) = graph.edges_from(&sid("b")).next().unwrap();
        assert_eq!(bc.to, sid("c"));
    }

    #[test]
    fn shared_stop_pair_accumulates_traversals() {
        let records = vec![
            record("r1", "a", 1, 0.0, 0.0, 0.0, 0.0),
            record("r1", "b", 2, 5.0, 10.0, 10.0, 8.0),
            record("r2", "a", 1, 0.0, 0.0, 0.0, 0.0),
            record("r2", "b", 2, 5.0, 14.0, 14.0, 6.0),
        ];

        let result = GraphBuilder::new().build(&records).unwrap();
        let graph = result.graph;

        assert_eq!(graph.edge_count(), 1);
        let (_, edge) = graph.edges_from(&sid("a")).next().unwrap();
        assert_eq!(edge.traversals.len(), 2);
        assert_eq!(edge.min_duration, 10.0);
        assert_eq!(edge.min_fare, 6.0);
        assert_eq!(edge.average_duration, 12.0);
        assert_eq!(edge.average_fare, 7.0);
    }

    #[test]
    fn node_memberships_record_every_route() {
        let records = vec![
            record("r1", "a", 1, 0.0, 0.0, 0.0, 0.0),
            record("r1", "b", 2, 5.0, 10.0, 10.0, 8.0),
            record("r2", "b", 4, 11.0, 25.0, 25.0, 12.0),
            record("r2", "c", 5, 15.0, 35.0, 35.0, 16.0),
        ];

        let result = GraphBuilder::new().build(&records).unwrap();
        let node = result.graph.node(&sid("b")).unwrap();

        assert_eq!(node.memberships.len(), 2);
        let sequences: Vec<u32> = node.memberships.iter().map(|m| m.sequence).collect();
        assert!(sequences.contains(&2));
        assert!(sequences.contains(&4));
    }

    #[test]
    fn bad_segment_is_skipped_with_warning() {
        // The b record's arrival offset precedes a's departure: negative
        // duration, so a -> b is skipped while b -> c survives.
        let records = vec![
            record("r1", "a", 1, 0.0, 30.0, 30.0, 0.0),
            record("r1", "b", 2, 5.0, 10.0, 10.0, 8.0),
            record("r1", "c", 3, 9.0, 20.0, 20.0, 14.0),
        ];

        let result = GraphBuilder::new().build(&records).unwrap();

        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].from_stop, sid("a"));
        assert_eq!(result.warnings[0].to_stop, sid("b"));
        assert_eq!(result.graph.edge_count(), 1);
        assert!(result.graph.edges_from(&sid("a")).next().is_none());
        assert!(result.graph.edges_from(&sid("b")).next().is_some());
    }

    #[test]
    fn single_stop_route_builds_a_node_without_edges() {
        let records = vec![record("r9", "lonely", 1, 0.0, 0.0, 0.0, 0.0)];

        let result = GraphBuilder::new().build(&records).unwrap();
        assert_eq!(result.graph.node_count(), 1);
        assert_eq!(result.graph.edge_count(), 0);
    }

    #[test]
    fn identical_input_builds_identical_graphs() {
        let records = vec![
            record("r1", "a", 1, 0.0, 0.0, 0.0, 0.0),
            record("r1", "b", 2, 5.0, 10.0, 12.0, 8.0),
            record("r2", "b", 1, 0.0, 0.0, 0.0, 0.0),
            record("r2", "c", 2, 4.0, 9.0, 9.0, 6.0),
        ];

        let builder = GraphBuilder::new();
        let first = builder.build(&records).unwrap().graph;
        let second = builder.build(&records).unwrap().graph;

        assert_eq!(first.edges(), second.edges());
        let mut first_nodes: Vec<&StopNode> = first.nodes().collect();
        let mut second_nodes: Vec<&StopNode> = second.nodes().collect();
        first_nodes.sort_by(|a, b| a.details.id.cmp(&b.details.id));
        second_nodes.sort_by(|a, b| a.details.id.cmp(&b.details.id));
        assert_eq!(first_nodes, second_nodes);
    }
}
