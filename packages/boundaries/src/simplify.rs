//! Topology-preserving simplification in spherical Web Mercator meters.

use std::f64::consts::PI;

use geo::{Coord, CoordsIter, MapCoords, MultiPolygon, SimplifyVwPreserve};

/// WGS84 semi-major axis used by EPSG:3857.
const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Latitude limit of the Web Mercator square.
const MAX_LATITUDE: f64 = 85.051_128_78;

/// Chord length, as a multiple of the tolerance, at which the area
/// threshold equals a perpendicular-distance tolerance.
const CHORD_RATIO: f64 = 10.0;

/// Returns `true` when every coordinate lies within lon/lat bounds.
#[must_use]
pub fn is_geographic(geometry: &MultiPolygon<f64>) -> bool {
    geometry
        .coords_iter()
        .all(|c| c.x.abs() <= 180.0 && c.y.abs() <= 90.0)
}

/// Projects a lon/lat coordinate to EPSG:3857 meters.
#[must_use]
pub fn to_mercator(coord: Coord<f64>) -> Coord<f64> {
    let lat = coord.y.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    Coord {
        x: EARTH_RADIUS_M * coord.x.to_radians(),
        y: EARTH_RADIUS_M * (PI / 4.0 + lat.to_radians() / 2.0).tan().ln(),
    }
}

/// Inverse of [`to_mercator`].
#[must_use]
pub fn from_mercator(coord: Coord<f64>) -> Coord<f64> {
    Coord {
        x: (coord.x / EARTH_RADIUS_M).to_degrees(),
        y: (2.0 * (coord.y / EARTH_RADIUS_M).exp().atan() - PI / 2.0).to_degrees(),
    }
}

/// Simplifies a lon/lat geometry with Visvalingam–Whyatt in projected
/// meters.
///
/// Visvalingam–Whyatt thresholds on triangle area, not distance. A vertex
/// `d` meters off a chord of length `L` spans `L * d / 2`, so the threshold
/// is `tolerance_m * (CHORD_RATIO * tolerance_m) / 2`. At 200 m that drops
/// a vertex 200 m off a 2 km chord, or 100 m off a 4 km one. Short chords
/// keep proportionally more detail than a Douglas-Peucker distance pass.
///
/// Rings never self-intersect or collapse below a valid ring. A
/// non-positive tolerance returns the geometry unchanged.
#[must_use]
pub fn simplify_geographic(geometry: &MultiPolygon<f64>, tolerance_m: f64) -> MultiPolygon<f64> {
    if tolerance_m <= 0.0 {
        return geometry.clone();
    }

    let area = area_threshold(tolerance_m);
    geometry
        .map_coords(to_mercator)
        .simplify_vw_preserve(&area)
        .map_coords(from_mercator)
}

fn area_threshold(tolerance_m: f64) -> f64 {
    tolerance_m * CHORD_RATIO * tolerance_m / 2.0
}

/// Simplifies every geometry in place, or none of them if any lies outside
/// lon/lat bounds (projected data cannot be reprojected here).
///
/// Returns the number of coordinates removed.
pub fn simplify_all(geometries: &mut [MultiPolygon<f64>], tolerance_m: f64) -> usize {
    if tolerance_m <= 0.0 || geometries.is_empty() {
        return 0;
    }

    if !geometries.iter().all(is_geographic) {
        log::warn!("Boundary coordinates are not lon/lat degrees; skipping simplification");
        return 0;
    }

    let mut removed = 0;
    for geometry in geometries.iter_mut() {
        let before = geometry.coords_count();
        *geometry = simplify_geographic(geometry, tolerance_m);
        removed += before.saturating_sub(geometry.coords_count());
    }

    log::debug!("Simplification at {tolerance_m} m removed {removed} coordinates");
    removed
}
