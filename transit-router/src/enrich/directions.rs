//! Route legs, summary text and turn-by-turn directions.

use serde::Serialize;

use crate::domain::RouteId;
use crate::search::PathHop;

use super::EnrichedStop;

/// A maximal run of consecutive same-route hops.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteLeg {
    pub route_id: RouteId,
    pub route_number: String,
    /// Index of the leg's first stop in the path's stop sequence.
    pub board_index: usize,
    /// Index of the stop where the rider alights or transfers.
    pub alight_index: usize,
    /// Accumulated duration of the leg's hops, minutes.
    pub duration_min: f64,
    /// Accumulated fare of the leg's hops.
    pub fare: f64,
}

/// Collapse consecutive same-route hops into legs.
pub fn collapse_legs(hops: &[PathHop]) -> Vec<RouteLeg> {
    let mut legs: Vec<RouteLeg> = Vec::new();
    for (i, hop) in hops.iter().enumerate() {
        match legs.last_mut() {
            Some(leg) if leg.route_id == hop.route_id => {
                leg.alight_index = i + 1;
                leg.duration_min += hop.duration_min;
                leg.fare += hop.fare;
            }
            _ => legs.push(RouteLeg {
                route_id: hop.route_id.clone(),
                route_number: hop.route_number.clone(),
                board_index: i,
                alight_index: i + 1,
                duration_min: hop.duration_min,
                fare: hop.fare,
            }),
        }
    }
    legs
}

/// One turn-by-turn instruction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Direction {
    /// Board a route at a stop.
    Board {
        stop: EnrichedStop,
        route_number: String,
        duration_min: f64,
        fare: f64,
        message: String,
    },
    /// Leave the current route at a stop.
    Alight {
        stop: EnrichedStop,
        route_number: String,
        message: String,
    },
}

/// One-line description of the route.
pub fn summary(legs: &[RouteLeg], stops: &[EnrichedStop], transfer_count: usize) -> String {
    if legs.is_empty() {
        return "No travel required".to_string();
    }
    if legs.len() == 1 && stops.len() >= 2 {
        let first = &stops[0];
        let last = &stops[stops.len() - 1];
        return format!(
            "Take {} from {} to {}",
            legs[0].route_number, first.name, last.name
        );
    }

    let mut route_numbers: Vec<&str> = Vec::new();
    for leg in legs {
        if !route_numbers.contains(&leg.route_number.as_str()) {
            route_numbers.push(&leg.route_number);
        }
    }
    format!(
        "Take {} with {} transfer(s)",
        route_numbers.join(" → "),
        transfer_count
    )
}

/// Build board/alight instructions, one pair per leg.
///
/// The alight for a leg lands on the first stop of the next differing
/// route, or on the final destination for the last leg.
pub fn directions(legs: &[RouteLeg], stops: &[EnrichedStop]) -> Vec<Direction> {
    let mut out = Vec::with_capacity(legs.len() * 2);
    for (i, leg) in legs.iter().enumerate() {
        let board_stop = &stops[leg.board_index];
        out.push(Direction::Board {
            stop: board_stop.clone(),
            route_number: leg.route_number.clone(),
            duration_min: leg.duration_min,
            fare: leg.fare,
            message: format!("Board {} at {}", leg.route_number, board_stop.name),
        });

        let alight_stop = &stops[leg.alight_index];
        let message = if i + 1 == legs.len() {
            format!("Alight at {} (final destination)", alight_stop.name)
        } else {
            format!("Alight at {}", alight_stop.name)
        };
        out.push(Direction::Alight {
            stop: alight_stop.clone(),
            route_number: leg.route_number.clone(),
            message,
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Coordinates, StopId};

    fn hop(route: &str, from: &str, to: &str, duration: f64, fare: f64) -> PathHop {
        PathHop {
            from: StopId::parse(from).unwrap(),
            to: StopId::parse(to).unwrap(),
            route_id: RouteId::parse(route).unwrap(),
            route_number: route.to_string(),
            duration_min: duration,
            fare,
            distance_km: 1.0,
            min_duration: duration,
            min_fare: fare,
            transfer_min: 0.0,
        }
    }

    fn stop(id: &str) -> EnrichedStop {
        EnrichedStop {
            stop_id: StopId::parse(id).unwrap(),
            name: format!("Stop {id}"),
            code: id.to_uppercase(),
            coordinates: Coordinates::new(0.0, 0.0),
        }
    }

    #[test]
    fn same_route_hops_collapse_into_one_leg() {
        let hops = vec![
            hop("r1", "a", "b", 10.0, 5.0),
            hop("r1", "b", "c", 20.0, 10.0),
            hop("r2", "c", "d", 15.0, 8.0),
        ];

        let legs = collapse_legs(&hops);

        assert_eq!(legs.len(), 2);
        assert_eq!(legs[0].route_number, "r1");
        assert_eq!(legs[0].board_index, 0);
        assert_eq!(legs[0].alight_index, 2);
        assert_eq!(legs[0].duration_min, 30.0);
        assert_eq!(legs[0].fare, 15.0);
        assert_eq!(legs[1].board_index, 2);
        assert_eq!(legs[1].alight_index, 3);
    }

    #[test]
    fn no_hops_means_no_legs() {
        assert!(collapse_legs(&[]).is_empty());
    }

    #[test]
    fn single_leg_summary_names_endpoints() {
        let hops = vec![hop("r1", "a", "b", 10.0, 5.0), hop("r1", "b", "c", 20.0, 10.0)];
        let legs = collapse_legs(&hops);
        let stops = vec![stop("a"), stop("b"), stop("c")];

        let text = summary(&legs, &stops, 0);
        assert_eq!(text, "Take r1 from Stop a to Stop c");
    }

    #[test]
    fn multi_leg_summary_lists_routes_and_transfers() {
        let hops = vec![
            hop("r1", "a", "b", 10.0, 5.0),
            hop("r2", "b", "c", 20.0, 10.0),
            hop("r1", "c", "d", 5.0, 3.0),
        ];
        let legs = collapse_legs(&hops);
        let stops = vec![stop("a"), stop("b"), stop("c"), stop("d")];

        let text = summary(&legs, &stops, 2);
        assert_eq!(text, "Take r1 → r2 with 2 transfer(s)");
    }

    #[test]
    fn trivial_path_summary() {
        assert_eq!(summary(&[], &[stop("a")], 0), "No travel required");
    }

    #[test]
    fn directions_pair_board_and_alight_per_leg() {
        let hops = vec![
            hop("r1", "a", "b", 10.0, 5.0),
            hop("r1", "b", "c", 20.0, 10.0),
            hop("r2", "c", "d", 15.0, 8.0),
        ];
        let legs = collapse_legs(&hops);
        let stops = vec![stop("a"), stop("b"), stop("c"), stop("d")];

        let dirs = directions(&legs, &stops);
        assert_eq!(dirs.len(), 4);

        match &dirs[0] {
            Direction::Board {
                stop,
                route_number,
                duration_min,
                fare,
                message,
            } => {
                assert_eq!(stop.stop_id, StopId::parse("a").unwrap());
                assert_eq!(route_number, "r1");
                assert_eq!(*duration_min, 30.0);
                assert_eq!(*fare, 15.0);
                assert_eq!(message, "Board r1 at Stop a");
            }
            other => panic!("expected board, got {other:?}"),
        }

        // The first alight lands on the transfer stop, where r2 begins.
        match &dirs[1] {
            Direction::Alight { stop, message, .. } => {
                assert_eq!(stop.stop_id, StopId::parse("c").unwrap());
                assert_eq!(message, "Alight at Stop c");
            }
            other => panic!("expected alight, got {other:?}"),
        }

        match &dirs[3] {
            Direction::Alight { stop, message, .. } => {
                assert_eq!(stop.stop_id, StopId::parse("d").unwrap());
                assert_eq!(message, "Alight at Stop d (final destination)");
            }
            other => panic!("expected alight, got {other:?}"),
        }
    }
}
