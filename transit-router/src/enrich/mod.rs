//! Rider-facing route enrichment.
//!
//! Turns a raw path into a description a rider can follow: hydrated stop
//! details, transfer count, a walking-distance estimate, a confidence
//! score, time-of-day adjusted totals, a summary line and turn-by-turn
//! directions.
//!
//! Enrichment is best-effort. Callers recover from any failure here by
//! falling back to the raw path; a valid path must never turn into a
//! query failure because hydration hiccuped.

mod directions;
mod score;

pub use directions::{Direction, RouteLeg, collapse_legs, directions, summary};
pub use score::{confidence, walking_distance_m};

use serde::Serialize;

use crate::domain::{Coordinates, StopDetails, StopId, TimeOfDay};
use crate::graph::RouteGraph;
use crate::search::PathResult;

/// Error from a stop-directory lookup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("stop directory lookup failed: {0}")]
pub struct DirectoryError(pub String);

/// Source of stop display details for hydration.
///
/// `Ok(None)` means the stop is unknown and hydration degrades to a
/// placeholder; `Err` means the directory itself failed and enrichment is
/// abandoned.
pub trait StopDirectory {
    fn find_stop(&self, id: &StopId) -> Result<Option<StopDetails>, DirectoryError>;
}

impl StopDirectory for RouteGraph {
    fn find_stop(&self, id: &StopId) -> Result<Option<StopDetails>, DirectoryError> {
        Ok(self.node(id).map(|n| n.details.clone()))
    }
}

/// Error from enrichment. Recovered by callers, never surfaced to riders.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnrichError {
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

/// A hydrated stop on an enriched route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedStop {
    pub stop_id: StopId,
    pub name: String,
    pub code: String,
    pub coordinates: Coordinates,
}

impl EnrichedStop {
    fn from_details(details: StopDetails) -> Self {
        Self {
            stop_id: details.id,
            name: details.name,
            code: details.code,
            coordinates: details.coordinates,
        }
    }

    /// Placeholder for a stop missing from the directory.
    fn unknown(id: &StopId) -> Self {
        Self {
            stop_id: id.clone(),
            name: "Unknown Stop".to_string(),
            code: "UNKNOWN".to_string(),
            coordinates: Coordinates::new(0.0, 0.0),
        }
    }
}

/// Raw totals scaled for the time of day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AdjustedTotals {
    pub duration_min: f64,
    pub fare: f64,
}

/// A rider-facing route description.
///
/// Adjusted totals sit alongside the raw totals on the underlying path;
/// they never replace them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedRoute {
    pub stops: Vec<EnrichedStop>,
    pub legs: Vec<RouteLeg>,
    pub transfer_count: usize,
    /// Straight-line estimate, meters. A proxy, not a walking-path
    /// distance.
    pub walking_distance_m: f64,
    /// Heuristic score in [0, 100].
    pub confidence: u8,
    pub time_of_day: Option<TimeOfDay>,
    pub adjusted: AdjustedTotals,
    pub summary: String,
    pub directions: Vec<Direction>,
}

/// Enrich a raw path.
pub fn enrich(
    path: &PathResult,
    directory: &impl StopDirectory,
    time_of_day: Option<TimeOfDay>,
) -> Result<EnrichedRoute, EnrichError> {
    let mut stops = Vec::with_capacity(path.stops.len());
    for id in &path.stops {
        let stop = match directory.find_stop(id)? {
            Some(details) => EnrichedStop::from_details(details),
            None => EnrichedStop::unknown(id),
        };
        stops.push(stop);
    }

    let legs = collapse_legs(&path.hops);
    let transfer_count = path.transfer_count();
    let walking_distance_m = walking_distance_m(&stops);
    let confidence = confidence(legs.len(), path.total_distance_km);

    // Without a time of day the adjusted totals are the raw totals,
    // untouched: rounding only happens when a multiplier is applied.
    let adjusted = match time_of_day {
        Some(time) => {
            let adjustment = time.adjustment();
            AdjustedTotals {
                duration_min: adjustment.apply_duration(path.total_duration_min),
                fare: adjustment.apply_fare(path.total_fare),
            }
        }
        None => AdjustedTotals {
            duration_min: path.total_duration_min,
            fare: path.total_fare,
        },
    };

    let summary = summary(&legs, &stops, transfer_count);
    let directions = directions(&legs, &stops);

    Ok(EnrichedRoute {
        stops,
        legs,
        transfer_count,
        walking_distance_m,
        confidence,
        time_of_day,
        adjusted,
        summary,
        directions,
    })
}
