//! Utility functions for coordinate projection and geodetic distance

use crate::Coordinate;
use geo::Point;

/// Web Mercator half extent in meters (EPSG:3857)
pub const EARTH_MERCATOR_MAX: f64 = 20037508.34;

/// Maximum latitude that can be represented in Web Mercator.
///
/// Latitudes beyond this bound are clamped before projecting, which keeps every
/// projected value finite (the raw formula diverges at ±90°).
pub const MAX_LATITUDE: f64 = 85.05112878;

/// Mean Earth radius in meters used by the haversine formula
pub const EARTH_RADIUS_M: f64 = 6371000.0;

/// Precomputed constant: EARTH_MERCATOR_MAX / 180.0
const DEG_TO_METERS: f64 = EARTH_MERCATOR_MAX / 180.0;

/// Convert WGS84 (lon, lat) in degrees to Web Mercator (x, y) in meters
///
/// Uses the spherical forward formula
/// `x = lon · M/180`, `y = ln(tan((90 + lat)·π/360)) · 180/π · M/180`
/// with `M = 20037508.34`. Latitude is clamped to [`MAX_LATITUDE`].
#[inline(always)]
pub fn lonlat_to_mercator(lon: f64, lat: f64) -> Point<f64> {
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);

    let x = lon * DEG_TO_METERS;
    let y = ((90.0 + lat) * std::f64::consts::PI / 360.0).tan().ln().to_degrees() * DEG_TO_METERS;

    Point::new(x, y)
}

/// Convert a feature coordinate to Web Mercator, ignoring altitude
#[inline(always)]
pub fn coordinate_to_mercator(coord: &Coordinate) -> Point<f64> {
    lonlat_to_mercator(coord.lon, coord.lat)
}

/// Check whether a latitude is projected without clamping
#[inline(always)]
pub fn is_within_mercator_latitude(lat: f64) -> bool {
    (-MAX_LATITUDE..=MAX_LATITUDE).contains(&lat)
}

/// Calculate the great-circle distance between two coordinates in meters
#[inline]
pub fn haversine_distance(p1: &Coordinate, p2: &Coordinate) -> f64 {
    let lat1 = p1.lat.to_radians();
    let lat2 = p2.lat.to_radians();
    let delta_lat = (p2.lat - p1.lat).to_radians();
    let delta_lon = (p2.lon - p1.lon).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}
