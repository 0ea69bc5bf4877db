//! Normalized feature model
//!
//! This module provides the immutable [`Feature`] records produced by extraction
//! and the ordered [`FeatureCollection`] shared by the estimation and export paths.

use crate::ConvertError;
use geo::{Coord, Rect};
use std::fmt;
use std::str::FromStr;

/// Geographic position in WGS84 degrees, altitude in meters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
    pub alt: f64,
}

impl Coordinate {
    pub fn new(lon: f64, lat: f64, alt: f64) -> Self {
        Self { lon, lat, alt }
    }
}

/// Kind of a geometry, as reported in the BOQ and the raw dump
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Point,
    LineString,
    Polygon,
}

impl GeometryKind {
    /// Name used in reports and in the raw dump
    pub fn as_str(&self) -> &'static str {
        match self {
            GeometryKind::Point => "Point",
            GeometryKind::LineString => "LineString",
            GeometryKind::Polygon => "Polygon",
        }
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single placemark geometry
///
/// Lines hold at least 2 vertices and polygons at least 3 when produced by
/// [`extract_features`](crate::extract_features). Polygon rings are kept exactly as
/// written in the source, so a closing vertex may or may not be present.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Coordinate),
    Line(Vec<Coordinate>),
    /// Outer boundary ring only
    Polygon(Vec<Coordinate>),
}

impl Geometry {
    #[inline]
    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Point(_) => GeometryKind::Point,
            Geometry::Line(_) => GeometryKind::LineString,
            Geometry::Polygon(_) => GeometryKind::Polygon,
        }
    }

    /// All vertices in source order
    #[inline]
    pub fn coordinates(&self) -> &[Coordinate] {
        match self {
            Geometry::Point(coord) => std::slice::from_ref(coord),
            Geometry::Line(coords) | Geometry::Polygon(coords) => coords,
        }
    }
}

/// A named geographic feature with exactly one geometry
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    name: String,
    description: String,
    geometry: Geometry,
}

impl Feature {
    pub fn new(name: impl Into<String>, description: impl Into<String>, geometry: Geometry) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            geometry,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[inline]
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    #[inline]
    pub fn kind(&self) -> GeometryKind {
        self.geometry.kind()
    }
}

/// Selects which geometry kinds take part in a conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GeometryFilter {
    #[default]
    All,
    Only(GeometryKind),
}

impl GeometryFilter {
    #[inline]
    pub fn matches(&self, kind: GeometryKind) -> bool {
        match self {
            GeometryFilter::All => true,
            GeometryFilter::Only(only) => *only == kind,
        }
    }
}

impl FromStr for GeometryFilter {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(GeometryFilter::All),
            "point" => Ok(GeometryFilter::Only(GeometryKind::Point)),
            "linestring" | "line" => Ok(GeometryFilter::Only(GeometryKind::LineString)),
            "polygon" => Ok(GeometryFilter::Only(GeometryKind::Polygon)),
            _ => Err(ConvertError::InvalidFilter(s.to_string())),
        }
    }
}

impl fmt::Display for GeometryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeometryFilter::All => f.write_str("all"),
            GeometryFilter::Only(kind) => f.write_str(&kind.as_str().to_ascii_lowercase()),
        }
    }
}

/// Ordered features of one source document
///
/// Order is the document order of the source placemarks and drives item numbering
/// in reports and entity order in the drawing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureCollection {
    features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }

    #[inline]
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Feature> {
        self.features.iter()
    }

    /// Features accepted by `filter`, in document order
    pub fn filtered(&self, filter: GeometryFilter) -> impl Iterator<Item = &Feature> + '_ {
        self.features
            .iter()
            .filter(move |feature| filter.matches(feature.kind()))
    }

    /// Get the bounding box of all vertices in WGS84 degrees (x = lon, y = lat)
    ///
    /// Returns `None` for an empty collection.
    pub fn bounding_box_wgs84(&self) -> Option<Rect<f64>> {
        let mut coords = self
            .features
            .iter()
            .flat_map(|feature| feature.geometry().coordinates());
        let first = coords.next()?;

        let (mut min_x, mut min_y) = (first.lon, first.lat);
        let (mut max_x, mut max_y) = (first.lon, first.lat);
        for coord in coords {
            min_x = min_x.min(coord.lon);
            min_y = min_y.min(coord.lat);
            max_x = max_x.max(coord.lon);
            max_y = max_y.max(coord.lat);
        }

        Some(Rect::new(
            Coord { x: min_x, y: min_y },
            Coord { x: max_x, y: max_y },
        ))
    }

    /// Get the center of the bounding box as `(lon, lat)`
    #[inline]
    pub fn center_wgs84(&self) -> Option<(f64, f64)> {
        self.bounding_box_wgs84().map(|bbox| {
            let center = bbox.center();
            (center.x, center.y)
        })
    }
}

impl<'a> IntoIterator for &'a FeatureCollection {
    type Item = &'a Feature;
    type IntoIter = std::slice::Iter<'a, Feature>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_collection() -> FeatureCollection {
        FeatureCollection::new(vec![
            Feature::new("pole", "", Geometry::Point(Coordinate::new(106.8, -6.2, 0.0))),
            Feature::new(
                "cable",
                "",
                Geometry::Line(vec![
                    Coordinate::new(106.8, -6.2, 0.0),
                    Coordinate::new(106.9, -6.1, 0.0),
                ]),
            ),
            Feature::new(
                "plot",
                "",
                Geometry::Polygon(vec![
                    Coordinate::new(106.7, -6.3, 0.0),
                    Coordinate::new(106.75, -6.3, 0.0),
                    Coordinate::new(106.75, -6.25, 0.0),
                ]),
            ),
        ])
    }

    #[test]
    fn test_filter_parsing() {
        assert_eq!("all".parse::<GeometryFilter>().unwrap(), GeometryFilter::All);
        assert_eq!(
            "LineString".parse::<GeometryFilter>().unwrap(),
            GeometryFilter::Only(GeometryKind::LineString)
        );
        assert_eq!(
            "line".parse::<GeometryFilter>().unwrap(),
            GeometryFilter::Only(GeometryKind::LineString)
        );
        assert_eq!(
            " POLYGON ".parse::<GeometryFilter>().unwrap(),
            GeometryFilter::Only(GeometryKind::Polygon)
        );
        assert!(matches!(
            "circle".parse::<GeometryFilter>(),
            Err(ConvertError::InvalidFilter(_))
        ));
    }

    #[test]
    fn test_filter_display_parses_back() {
        for filter in [
            GeometryFilter::All,
            GeometryFilter::Only(GeometryKind::Point),
            GeometryFilter::Only(GeometryKind::LineString),
            GeometryFilter::Only(GeometryKind::Polygon),
        ] {
            assert_eq!(filter.to_string().parse::<GeometryFilter>().unwrap(), filter);
        }
    }

    #[test]
    fn test_filtered_preserves_order() {
        let collection = sample_collection();
        let all: Vec<&str> = collection
            .filtered(GeometryFilter::All)
            .map(Feature::name)
            .collect();
        assert_eq!(all, ["pole", "cable", "plot"]);

        let lines: Vec<&str> = collection
            .filtered(GeometryFilter::Only(GeometryKind::LineString))
            .map(Feature::name)
            .collect();
        assert_eq!(lines, ["cable"]);
    }

    #[test]
    fn test_point_coordinates_slice() {
        let geometry = Geometry::Point(Coordinate::new(1.0, 2.0, 3.0));
        assert_eq!(geometry.coordinates().len(), 1);
        assert_eq!(geometry.kind(), GeometryKind::Point);
    }

    #[test]
    fn test_bounding_box_and_center() {
        let collection = sample_collection();
        let bbox = collection.bounding_box_wgs84().unwrap();
        assert!((bbox.min().x - 106.7).abs() < 1e-12);
        assert!((bbox.max().x - 106.9).abs() < 1e-12);
        assert!((bbox.min().y + 6.3).abs() < 1e-12);
        assert!((bbox.max().y + 6.1).abs() < 1e-12);

        let (lon, lat) = collection.center_wgs84().unwrap();
        assert!((lon - 106.8).abs() < 1e-9);
        assert!((lat + 6.2).abs() < 1e-9);

        assert!(FeatureCollection::default().bounding_box_wgs84().is_none());
    }
}
