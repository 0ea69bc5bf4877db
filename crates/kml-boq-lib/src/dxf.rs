//! Minimal DXF export
//!
//! Writes an ASCII DXF (AutoCAD 2000, meters) with a HEADER, a single-layer TABLES
//! section and one entity per feature:
//!
//! - Point → `POINT` (altitude passed through as Z)
//! - Line → open `LWPOLYLINE`
//! - Polygon → closed `LWPOLYLINE`, ring vertices written as extracted
//!
//! Coordinates are projected to Web Mercator and translated by the centroid of all
//! exported vertices, so CAD programs work near the origin. The original centroid is
//! written as a `999` comment at the start of the ENTITIES section.

use crate::{Feature, FeatureCollection, Geometry, GeometryFilter, utils};
use geo::{Coord, Point};
use std::fmt::{self, Write};

/// Layer used when none is configured
pub const DEFAULT_LAYER: &str = "KML_LAYER";

/// Drawing options
#[derive(Debug, Clone)]
pub struct DxfOptions {
    /// Name of the single layer every entity is placed on
    pub layer_name: String,
}

impl Default for DxfOptions {
    fn default() -> Self {
        Self {
            layer_name: DEFAULT_LAYER.to_string(),
        }
    }
}

/// Serialize the features accepted by `filter` into DXF text
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn export_drawing(
    features: &FeatureCollection,
    filter: GeometryFilter,
    options: &DxfOptions,
) -> String {
    let included: Vec<&Feature> = features.filtered(filter).collect();
    profiling::scope!("dxf::project");
    let projected: Vec<Vec<Point<f64>>> = included
        .iter()
        .map(|feature| {
            feature
                .geometry()
                .coordinates()
                .iter()
                .map(utils::coordinate_to_mercator)
                .collect()
        })
        .collect();
    let center = centroid(projected.iter().flatten());

    let mut dxf = DxfWriter::default();
    dxf.header();
    dxf.tables(&options.layer_name);

    dxf.begin_section("ENTITIES");
    let offset = match center {
        Some(center) => {
            dxf.comment(format_args!(
                "Original centroid X={}, Y={} (coordinates translated to origin)",
                Fixed(center.x),
                Fixed(center.y)
            ));
            center
        }
        None => Coord { x: 0.0, y: 0.0 },
    };

    for (feature, points) in included.iter().zip(&projected) {
        let local: Vec<Coord<f64>> = points.iter().map(|p| p.0 - offset).collect();
        match feature.geometry() {
            Geometry::Point(coord) => {
                if let Some(position) = local.first() {
                    dxf.point(&options.layer_name, *position, coord.alt);
                }
            }
            Geometry::Line(_) => dxf.lwpolyline(&options.layer_name, &local, false),
            Geometry::Polygon(_) => dxf.lwpolyline(&options.layer_name, &local, true),
        }
    }
    dxf.end_section();
    dxf.pair(0, "EOF");

    tracing::info!(
        "Exported {} entities to DXF ({} bytes)",
        included.len(),
        dxf.out.len()
    );
    dxf.out
}

/// Arithmetic mean of all points, `None` when there are none
pub fn centroid<'a, I>(points: I) -> Option<Coord<f64>>
where
    I: IntoIterator<Item = &'a Point<f64>>,
{
    let mut sum = Coord { x: 0.0, y: 0.0 };
    let mut count = 0usize;
    for point in points {
        sum = sum + point.0;
        count += 1;
    }
    (count > 0).then(|| sum / count as f64)
}

/// Fixed 6-decimal formatting used for every DXF real value
struct Fixed(f64);

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Normalize -0.0 so centered coordinates never print as "-0.000000"
        let value = if self.0 == 0.0 { 0.0 } else { self.0 };
        write!(f, "{:.6}", value)
    }
}

/// Group-code/value pair writer
#[derive(Default)]
struct DxfWriter {
    out: String,
}

impl DxfWriter {
    fn pair(&mut self, code: u16, value: impl fmt::Display) {
        // Formatting into a String cannot fail
        let _ = write!(self.out, "{}\n{}\n", code, value);
    }

    fn comment(&mut self, text: fmt::Arguments<'_>) {
        self.pair(999, text);
    }

    fn begin_section(&mut self, name: &str) {
        self.pair(0, "SECTION");
        self.pair(2, name);
    }

    fn end_section(&mut self) {
        self.pair(0, "ENDSEC");
    }

    fn header(&mut self) {
        self.begin_section("HEADER");
        self.pair(9, "$ACADVER");
        self.pair(1, "AC1015");
        // Drawing units: meters
        self.pair(9, "$INSUNITS");
        self.pair(70, 6);
        self.end_section();
    }

    fn tables(&mut self, layer: &str) {
        self.begin_section("TABLES");
        self.pair(0, "TABLE");
        self.pair(2, "LAYER");
        self.pair(70, 1);
        self.pair(0, "LAYER");
        self.pair(2, layer);
        self.pair(70, 0);
        self.pair(62, 7);
        self.pair(6, "CONTINUOUS");
        self.pair(0, "ENDTAB");
        self.end_section();
    }

    fn point(&mut self, layer: &str, position: Coord<f64>, altitude: f64) {
        self.pair(0, "POINT");
        self.pair(8, layer);
        self.pair(10, Fixed(position.x));
        self.pair(20, Fixed(position.y));
        self.pair(30, Fixed(altitude));
    }

    fn lwpolyline(&mut self, layer: &str, vertices: &[Coord<f64>], closed: bool) {
        self.pair(0, "LWPOLYLINE");
        self.pair(8, layer);
        self.pair(90, vertices.len());
        self.pair(70, u8::from(closed));
        for vertex in vertices {
            self.pair(10, Fixed(vertex.x));
            self.pair(20, Fixed(vertex.y));
        }
    }
}
