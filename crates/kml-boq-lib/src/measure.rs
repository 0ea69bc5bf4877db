//! Geometric measurements
//!
//! Lines are measured on the sphere (haversine), polygons on the Web Mercator plane
//! (shoelace over projected vertices). Degenerate inputs measure as 0.

use crate::{Coordinate, Geometry, utils};
use geo::Point;

/// Total great-circle length of a polyline in meters
///
/// Sums the haversine distance of consecutive vertex pairs in input order.
/// Returns 0 for fewer than 2 points.
pub fn line_length(points: &[Coordinate]) -> f64 {
    points
        .windows(2)
        .map(|pair| utils::haversine_distance(&pair[0], &pair[1]))
        .sum()
}

/// Area of a polygon ring in square meters
///
/// Every vertex is projected to Web Mercator before the shoelace sum, and the ring
/// is closed if the last projected vertex differs from the first. Returns 0 for
/// fewer than 3 points.
pub fn polygon_area(ring: &[Coordinate]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }

    let projected: Vec<Point<f64>> = ring.iter().map(utils::coordinate_to_mercator).collect();
    shoelace_area(&projected)
}

/// Planar shoelace area of a ring, closing it when needed
///
/// Returns 0 for fewer than 3 points.
pub fn shoelace_area(ring: &[Point<f64>]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }

    let mut sum = 0.0;
    for pair in ring.windows(2) {
        sum += cross(pair[0], pair[1]);
    }

    let (first, last) = (ring[0], ring[ring.len() - 1]);
    if first != last {
        sum += cross(last, first);
    }

    (sum / 2.0).abs()
}

#[inline(always)]
fn cross(a: Point<f64>, b: Point<f64>) -> f64 {
    a.x() * b.y() - b.x() * a.y()
}

/// Quantity measured for a geometry: count for points, meters for lines,
/// square meters for polygons
pub fn quantity(geometry: &Geometry) -> f64 {
    match geometry {
        Geometry::Point(_) => 1.0,
        Geometry::Line(points) => line_length(points),
        Geometry::Polygon(ring) => polygon_area(ring),
    }
}
