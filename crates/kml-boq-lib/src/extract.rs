//! Geometry extraction from KML placemarks
//!
//! Every `Placemark` in the document becomes at most one [`Feature`]. The geometry is
//! chosen by checking `Point`, then `LineString`, then `Polygon`. A tag without
//! coordinate text is passed over in favour of the next one, but the first tag that
//! has coordinates decides: if they don't parse, the placemark is dropped. Dropped
//! placemarks never fail the batch.

use crate::markup::{self, Element};
use crate::{Coordinate, Feature, FeatureCollection, Geometry, Result, utils};

/// Name given to placemarks without a (non-empty) `<name>`
pub const DEFAULT_NAME: &str = "Unnamed";

/// Minimum number of vertices for a line
const MIN_LINE_VERTICES: usize = 2;
/// Minimum number of vertices for a polygon ring
const MIN_RING_VERTICES: usize = 3;

/// Parse KML text and extract its features in document order
///
/// Fails only when the markup itself cannot be parsed; malformed placemarks are
/// skipped and logged at debug level.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn extract_features(kml: &str) -> Result<FeatureCollection> {
    let document = markup::parse_document(kml)?;

    let mut features = Vec::new();
    let mut skipped = 0usize;
    for (index, placemark) in document.descendants_named("Placemark").enumerate() {
        match parse_placemark(placemark) {
            Some(feature) => features.push(feature),
            None => {
                skipped += 1;
                tracing::debug!("Skipping placemark #{} without usable geometry", index + 1);
            }
        }
    }

    tracing::info!(
        "Extracted {} features ({} placemarks skipped)",
        features.len(),
        skipped
    );
    Ok(FeatureCollection::new(features))
}

/// Extract one feature from a placemark element
fn parse_placemark(placemark: &Element) -> Option<Feature> {
    let name = placemark
        .find("name")
        .map(|e| e.text_content().trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_NAME.to_string());
    let description = placemark
        .find("description")
        .map(|e| e.text_content().trim().to_string())
        .unwrap_or_default();

    let geometry = match parse_point(placemark)
        .or_else(|| parse_line(placemark))
        .or_else(|| parse_polygon(placemark))?
    {
        Candidate::Valid(geometry) => geometry,
        Candidate::Invalid(kind) => {
            tracing::debug!("Placemark '{}' has unparseable {} coordinates", name, kind);
            return None;
        }
    };

    for coord in geometry.coordinates() {
        if !utils::is_within_mercator_latitude(coord.lat) {
            tracing::warn!(
                "Placemark '{}' has latitude {} beyond the Web Mercator limit; it will be clamped for area and drawing output",
                name,
                coord.lat
            );
            break;
        }
    }

    Some(Feature::new(name, description, geometry))
}

/// Geometry tag that carries coordinate text
enum Candidate {
    Valid(Geometry),
    /// Coordinates present but unparseable or with too few vertices
    Invalid(&'static str),
}

/// `None` when the tag or its coordinate text is missing
fn parse_point(placemark: &Element) -> Option<Candidate> {
    let text = coordinates_text(placemark.find("Point")?)?;
    // A point holds a single tuple; anything after the first one is ignored
    let first = text.split_whitespace().next()?;
    Some(match parse_tuple(first) {
        Some(coord) => Candidate::Valid(Geometry::Point(coord)),
        None => Candidate::Invalid("Point"),
    })
}

fn parse_line(placemark: &Element) -> Option<Candidate> {
    let text = coordinates_text(placemark.find("LineString")?)?;
    Some(
        match parse_coordinates(&text).filter(|c| c.len() >= MIN_LINE_VERTICES) {
            Some(coords) => Candidate::Valid(Geometry::Line(coords)),
            None => Candidate::Invalid("LineString"),
        },
    )
}

fn parse_polygon(placemark: &Element) -> Option<Candidate> {
    let outer = placemark.find("Polygon")?.find("outerBoundaryIs")?;
    let text = coordinates_text(outer)?;
    Some(
        match parse_coordinates(&text).filter(|c| c.len() >= MIN_RING_VERTICES) {
            Some(coords) => Candidate::Valid(Geometry::Polygon(coords)),
            None => Candidate::Invalid("Polygon"),
        },
    )
}

/// Trimmed text of the first `<coordinates>` under `element`, if non-empty
fn coordinates_text(element: &Element) -> Option<String> {
    let text = element.find("coordinates")?.text_content();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Parse a whitespace-separated list of `lon,lat[,alt]` tuples
///
/// Returns `None` if any tuple is invalid.
pub fn parse_coordinates(text: &str) -> Option<Vec<Coordinate>> {
    text.split_whitespace().map(parse_tuple).collect()
}

/// Parse a single `lon,lat[,alt]` tuple
///
/// Longitude and latitude must be finite and within WGS84 ranges. A missing or
/// unparseable altitude defaults to 0.
pub fn parse_tuple(tuple: &str) -> Option<Coordinate> {
    let mut parts = tuple.split(',').map(str::trim);
    let lon: f64 = parts.next()?.parse().ok()?;
    let lat: f64 = parts.next()?.parse().ok()?;
    let alt = parts
        .next()
        .and_then(|alt| alt.parse::<f64>().ok())
        .filter(|alt| alt.is_finite())
        .unwrap_or(0.0);

    let valid = lon.is_finite()
        && lat.is_finite()
        && (-180.0..=180.0).contains(&lon)
        && (-90.0..=90.0).contains(&lat);
    valid.then_some(Coordinate::new(lon, lat, alt))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GeometryKind;

    fn kml(placemarks: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2"><Document>{}</Document></kml>"#,
            placemarks
        )
    }

    #[test]
    fn test_single_point() {
        let doc = kml(
            "<Placemark><name>A</name><description>test</description>\
             <Point><coordinates>106.8,-6.2</coordinates></Point></Placemark>",
        );
        let collection = extract_features(&doc).unwrap();
        assert_eq!(collection.len(), 1);

        let feature = &collection.features()[0];
        assert_eq!(feature.name(), "A");
        assert_eq!(feature.description(), "test");
        assert_eq!(
            feature.geometry(),
            &Geometry::Point(Coordinate::new(106.8, -6.2, 0.0))
        );
    }

    #[test]
    fn test_line_and_polygon() {
        let doc = kml(
            "<Placemark><name>road</name><LineString><coordinates>
                106.80,-6.20,10 106.81,-6.21,12
             </coordinates></LineString></Placemark>
             <Placemark><name>lot</name><Polygon><outerBoundaryIs><LinearRing><coordinates>
                106.80,-6.20 106.81,-6.20 106.81,-6.21 106.80,-6.20
             </coordinates></LinearRing></outerBoundaryIs></Polygon></Placemark>",
        );
        let collection = extract_features(&doc).unwrap();
        assert_eq!(collection.len(), 2);

        let road = &collection.features()[0];
        assert_eq!(road.kind(), GeometryKind::LineString);
        assert_eq!(road.geometry().coordinates()[1], Coordinate::new(106.81, -6.21, 12.0));

        let lot = &collection.features()[1];
        assert_eq!(lot.kind(), GeometryKind::Polygon);
        // Explicit closing vertex is kept as written
        assert_eq!(lot.geometry().coordinates().len(), 4);
    }

    #[test]
    fn test_defaults_for_missing_metadata() {
        let doc = kml("<Placemark><Point><coordinates>1,2,3</coordinates></Point></Placemark>");
        let collection = extract_features(&doc).unwrap();
        let feature = &collection.features()[0];
        assert_eq!(feature.name(), DEFAULT_NAME);
        assert_eq!(feature.description(), "");
    }

    #[test]
    fn test_malformed_placemark_is_dropped_in_order() {
        let doc = kml(
            "<Placemark><name>first</name><Point><coordinates>1,1</coordinates></Point></Placemark>
             <Placemark><name>broken</name><Point></Point></Placemark>
             <Placemark><name>third</name><Point><coordinates>3,3</coordinates></Point></Placemark>",
        );
        let collection = extract_features(&doc).unwrap();
        let names: Vec<&str> = collection.iter().map(Feature::name).collect();
        assert_eq!(names, ["first", "third"]);
    }

    #[test]
    fn test_point_takes_priority() {
        let doc = kml(
            "<Placemark><name>multi</name>
                <LineString><coordinates>0,0 1,1</coordinates></LineString>
                <Point><coordinates>5,5</coordinates></Point>
             </Placemark>",
        );
        let collection = extract_features(&doc).unwrap();
        assert_eq!(collection.features()[0].kind(), GeometryKind::Point);
    }

    #[test]
    fn test_empty_point_falls_through_to_line() {
        let doc = kml(
            "<Placemark><Point><coordinates> </coordinates></Point>
                <LineString><coordinates>0,0 1,1</coordinates></LineString></Placemark>",
        );
        let collection = extract_features(&doc).unwrap();
        assert_eq!(collection.features()[0].kind(), GeometryKind::LineString);
    }

    #[test]
    fn test_unparseable_point_drops_placemark() {
        let doc = kml(
            "<Placemark><name>bad</name><Point><coordinates>abc,def</coordinates></Point>
                <LineString><coordinates>0,0 1,1</coordinates></LineString></Placemark>
             <Placemark><name>ok</name><Point><coordinates>1,1</coordinates></Point></Placemark>",
        );
        let collection = extract_features(&doc).unwrap();
        let names: Vec<&str> = collection.iter().map(Feature::name).collect();
        assert_eq!(names, ["ok"]);
    }

    #[test]
    fn test_short_line_does_not_fall_through_to_polygon() {
        let doc = kml(
            "<Placemark><LineString><coordinates>0,0</coordinates></LineString>
                <Polygon><outerBoundaryIs><LinearRing><coordinates>0,0 1,0 1,1</coordinates>
                </LinearRing></outerBoundaryIs></Polygon></Placemark>",
        );
        assert!(extract_features(&doc).unwrap().is_empty());
    }

    #[test]
    fn test_polygon_inner_rings_are_ignored() {
        let doc = kml(
            "<Placemark><Polygon>
                <innerBoundaryIs><LinearRing><coordinates>9,9 9,8 8,8</coordinates></LinearRing></innerBoundaryIs>
                <outerBoundaryIs><LinearRing><coordinates>0,0 4,0 4,4 0,4</coordinates></LinearRing></outerBoundaryIs>
             </Polygon></Placemark>",
        );
        let collection = extract_features(&doc).unwrap();
        let ring = collection.features()[0].geometry().coordinates();
        assert_eq!(ring[0], Coordinate::new(0.0, 0.0, 0.0));
        assert_eq!(ring.len(), 4);
    }

    #[test]
    fn test_polygon_without_outer_boundary_is_dropped() {
        let doc = kml("<Placemark><Polygon><coordinates>0,0 1,0 1,1</coordinates></Polygon></Placemark>");
        assert!(extract_features(&doc).unwrap().is_empty());
    }

    #[test]
    fn test_degenerate_geometry_is_dropped() {
        let doc = kml(
            "<Placemark><LineString><coordinates>0,0</coordinates></LineString></Placemark>
             <Placemark><Polygon><outerBoundaryIs><LinearRing><coordinates>0,0 1,1</coordinates>
             </LinearRing></outerBoundaryIs></Polygon></Placemark>",
        );
        assert!(extract_features(&doc).unwrap().is_empty());
    }

    #[test]
    fn test_folders_are_flattened() {
        let doc = kml(
            "<Folder><Placemark><name>a</name><Point><coordinates>1,1</coordinates></Point></Placemark>
                <Folder><Placemark><name>b</name><Point><coordinates>2,2</coordinates></Point></Placemark></Folder>
             </Folder>
             <Placemark><name>c</name><Point><coordinates>3,3</coordinates></Point></Placemark>",
        );
        let collection = extract_features(&doc).unwrap();
        let names: Vec<&str> = collection.iter().map(Feature::name).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn test_parse_tuple() {
        assert_eq!(parse_tuple("1.5,2.5"), Some(Coordinate::new(1.5, 2.5, 0.0)));
        assert_eq!(parse_tuple("1.5,2.5,7"), Some(Coordinate::new(1.5, 2.5, 7.0)));
        assert_eq!(parse_tuple("1.5,2.5,abc"), Some(Coordinate::new(1.5, 2.5, 0.0)));
        assert_eq!(parse_tuple("1.5"), None);
        assert_eq!(parse_tuple("x,2"), None);
        assert_eq!(parse_tuple("NaN,2"), None);
        assert_eq!(parse_tuple("200,2"), None);
        assert_eq!(parse_tuple("2,95"), None);
    }

    #[test]
    fn test_parse_coordinates_rejects_any_bad_tuple() {
        assert_eq!(parse_coordinates("0,0 1,1").map(|c| c.len()), Some(2));
        assert_eq!(parse_coordinates("0,0\n\t1,1,5  2,2"), parse_coordinates("0,0 1,1,5 2,2"));
        assert!(parse_coordinates("0,0 oops 1,1").is_none());
    }

    #[test]
    fn test_invalid_markup_is_an_error() {
        assert!(extract_features("<kml><Placemark></kml>").is_err());
    }
}
