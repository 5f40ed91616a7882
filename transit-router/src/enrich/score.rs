//! Confidence scoring and walking-distance estimation.

use super::EnrichedStop;

/// Distance in kilometers beyond which the confidence score is docked.
const LONG_ROUTE_KM: f64 = 100.0;

/// Confidence score for a path, in [0, 100].
///
/// Additive heuristic: 5 points off per route leg, 10 more for paths
/// longer than 100 km, 15 more when the path needs more than one leg.
pub fn confidence(leg_count: usize, total_distance_km: f64) -> u8 {
    let mut score: i64 = 100;
    score -= leg_count as i64 * 5;
    if total_distance_km > LONG_ROUTE_KM {
        score -= 10;
    }
    if leg_count > 1 {
        score -= 15;
    }
    score.clamp(0, 100) as u8
}

/// Straight-line walking estimate between consecutive stops, in meters.
///
/// A proxy built from great-circle distances, not a walking-path
/// distance.
pub fn walking_distance_m(stops: &[EnrichedStop]) -> f64 {
    let km: f64 = stops
        .windows(2)
        .map(|w| w[0].coordinates.distance_km(&w[1].coordinates))
        .sum();
    (km * 1000.0).round()
}
