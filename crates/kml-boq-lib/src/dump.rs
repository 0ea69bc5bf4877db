//! Raw JSON dump of a feature collection
//!
//! The dump is GeoJSON-shaped: a `FeatureCollection` whose features carry a
//! `geometry` (`type` + `coordinates`, positions as `[lon, lat, alt]`) and
//! `properties` with the name, description and geometry type. Polygon coordinates
//! are nested one level deeper, as a list holding the outer ring.

use crate::{Coordinate, Feature, FeatureCollection, Geometry, Result};
use serde::Serialize;

#[derive(Serialize)]
struct RawCollection<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    features: Vec<RawFeature<'a>>,
}

#[derive(Serialize)]
struct RawFeature<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    geometry: RawGeometry,
    properties: RawProperties<'a>,
}

#[derive(Serialize)]
#[serde(tag = "type", content = "coordinates")]
enum RawGeometry {
    Point([f64; 3]),
    LineString(Vec<[f64; 3]>),
    Polygon(Vec<Vec<[f64; 3]>>),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RawProperties<'a> {
    name: &'a str,
    description: &'a str,
    geometry_type: &'static str,
}

#[inline]
fn position(coord: &Coordinate) -> [f64; 3] {
    [coord.lon, coord.lat, coord.alt]
}

impl From<&Geometry> for RawGeometry {
    fn from(geometry: &Geometry) -> Self {
        match geometry {
            Geometry::Point(coord) => RawGeometry::Point(position(coord)),
            Geometry::Line(coords) => RawGeometry::LineString(coords.iter().map(position).collect()),
            Geometry::Polygon(ring) => RawGeometry::Polygon(vec![ring.iter().map(position).collect()]),
        }
    }
}

impl<'a> From<&'a Feature> for RawFeature<'a> {
    fn from(feature: &'a Feature) -> Self {
        Self {
            kind: "Feature",
            geometry: feature.geometry().into(),
            properties: RawProperties {
                name: feature.name(),
                description: feature.description(),
                geometry_type: feature.kind().as_str(),
            },
        }
    }
}

/// Serialize the whole collection as pretty-printed JSON (two-space indent)
pub fn raw_dump(features: &FeatureCollection) -> Result<String> {
    let raw = RawCollection {
        kind: "FeatureCollection",
        features: features.iter().map(RawFeature::from).collect(),
    };
    Ok(serde_json::to_string_pretty(&raw)?)
}
