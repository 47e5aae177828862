//! Route-proximity filtering of POI sets.
//!
//! Distance to the route is approximated as distance to the nearest overview
//! path *vertex*, not true point-to-segment distance. POIs lying near the
//! route between widely spaced vertices can be under-counted; callers rely
//! on this approximation, so do not change it to segment distance without
//! revisiting the search radius defaults. The overview path is a simplified
//! polyline (tens to low hundreds of points) and POI sets are bounded by
//! source pagination, so the O(path x POIs) scan stays cheap.

use crate::constants::PROXIMITY_YIELD_BATCH;
use crate::models::{Coordinates, PointOfInterest};
use std::collections::HashSet;

/// Filter `pois` to those within `radius_meters` of any vertex of `path`.
///
/// Per POI, path vertices are scanned in order and the scan short-circuits on
/// the first vertex within the radius. The boundary is inclusive: a POI at
/// exactly `radius_meters` is kept, and radius 0 keeps only exact
/// coincidences. The result has no duplicates (by POI id); its order is
/// unspecified.
pub fn find_near(
    path: &[Coordinates],
    pois: &[PointOfInterest],
    radius_meters: f64,
) -> Vec<PointOfInterest> {
    if path.is_empty() {
        return Vec::new();
    }

    let mut seen = HashSet::new();
    let mut result = Vec::new();

    for poi in pois {
        if !seen.insert(poi.id) {
            continue;
        }
        if near_path(path, &poi.coordinates, radius_meters) {
            result.push(poi.clone());
        }
    }

    result
}

/// Cooperative variant of [`find_near`] for large POI sets: identical output,
/// but yields to the scheduler between fixed-size batches so a long scan
/// cannot monopolize the single execution thread.
pub async fn find_near_yielding(
    path: &[Coordinates],
    pois: &[PointOfInterest],
    radius_meters: f64,
) -> Vec<PointOfInterest> {
    if path.is_empty() {
        return Vec::new();
    }

    let mut seen = HashSet::new();
    let mut result = Vec::new();

    for batch in pois.chunks(PROXIMITY_YIELD_BATCH) {
        for poi in batch {
            if !seen.insert(poi.id) {
                continue;
            }
            if near_path(path, &poi.coordinates, radius_meters) {
                result.push(poi.clone());
            }
        }
        tokio::task::yield_now().await;
    }

    result
}

fn near_path(path: &[Coordinates], location: &Coordinates, radius_meters: f64) -> bool {
    path.iter()
        .any(|vertex| location.distance_meters_to(vertex) <= radius_meters)
}
