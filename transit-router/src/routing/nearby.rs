//! Nearby-stop lookup by coordinates.

use serde::Serialize;

use crate::domain::{Coordinates, StopDetails, haversine_km};

/// Kilometers per degree of latitude.
const KM_PER_DEGREE_LAT: f64 = 110.574;
/// Kilometers per degree of longitude at the equator.
const KM_PER_DEGREE_LON: f64 = 111.320;

/// A stop within a search radius, with its distance from the query point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyStop {
    pub stop: StopDetails,
    pub distance_km: f64,
}

/// Find stops within `radius_km` of a point, closest first.
///
/// A cheap bounding-box prefilter narrows the candidates before exact
/// great-circle distances are computed and ranked. The edge set plays no
/// part here; only stop coordinates matter.
pub fn nearby_stops<'a>(
    stops: impl IntoIterator<Item = &'a StopDetails>,
    latitude: f64,
    longitude: f64,
    radius_km: f64,
) -> Vec<NearbyStop> {
    let center = Coordinates::new(latitude, longitude);
    let lat_delta = radius_km / KM_PER_DEGREE_LAT;
    let lon_scale = latitude.to_radians().cos().abs();
    let lon_delta = if lon_scale > f64::EPSILON {
        radius_km / (KM_PER_DEGREE_LON * lon_scale)
    } else {
        // At the poles every longitude is within reach.
        180.0
    };

    let mut found: Vec<NearbyStop> = stops
        .into_iter()
        .filter(|s| {
            (s.coordinates.latitude - latitude).abs() <= lat_delta
                && (s.coordinates.longitude - longitude).abs() <= lon_delta
        })
        .map(|s| NearbyStop {
            stop: s.clone(),
            distance_km: haversine_km(&s.coordinates, &center),
        })
        .filter(|n| n.distance_km <= radius_km)
        .collect();

    found.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    found
}
