//! Raw stop-sequence membership records.
//!
//! The import pipeline produces one record per (route, stop) membership.
//! All measures are cumulative from the start of the route; the graph
//! builder turns deltas between consecutive records into edge segments.

use serde::{Deserialize, Serialize};

use super::{RouteId, StopDetails};

/// One stop's membership in one route's stop sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopSequenceRecord {
    pub route_id: RouteId,
    /// Rider-facing route number, e.g. "KSR-42".
    pub route_number: String,
    pub stop: StopDetails,
    /// Position of this stop within the route, ascending from the start.
    pub sequence: u32,
    /// Cumulative distance from the route start, kilometers.
    pub distance_from_start_km: f64,
    /// Scheduled arrival offset from the route start, minutes.
    pub arrival_offset_min: f64,
    /// Scheduled departure offset from the route start, minutes.
    /// Differs from the arrival offset by the dwell time at the stop.
    pub departure_offset_min: f64,
    /// Cumulative fare from the route start.
    pub fare_from_start: f64,
}
