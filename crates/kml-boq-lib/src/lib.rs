//! KML BOQ Library - Geometry pipeline for KML/KMZ takeoff
//!
//! This library turns KML/KMZ documents into a flat set of point, line and polygon
//! features, measures them with geodetically-aware math, prices them into a bill of
//! quantities (BOQ) and serializes them into a minimal DXF drawing.
//!
//! # Architecture
//!
//! - **[`utils`]**: WGS84 → Web Mercator projection and haversine distance
//! - **[`loader`]**: Reads markup text from a `.kml` file or the first `.kml` entry of a `.kmz`
//! - **[`extract`]**: Walks placemarks and produces an ordered [`FeatureCollection`]
//! - **[`measure`]**: Line length and polygon area
//! - **[`estimate`]**: Priced [`BoqReport`] and the rows handed to a [`TableSink`]
//! - **[`dxf`]**: Centroid re-centered DXF text output
//! - **[`ConversionSession`]**: Holds one loaded file and the last report
//!
//! # Data flow
//!
//! ```text
//! bytes -> loader -> markup -> extract -> FeatureCollection -+-> measure -> estimate -> BoqReport
//!                                                            +-> dxf -> drawing text
//! ```

mod dump;
pub mod dxf;
pub mod estimate;
pub mod extract;
mod feature;
pub mod loader;
mod markup;
pub mod measure;
mod session;
pub mod utils;

// Public API exports
pub use dump::raw_dump;
pub use dxf::{DxfOptions, export_drawing};
pub use estimate::{BoqReport, Cell, LineItem, Summary, TableSink, estimate};
pub use extract::extract_features;
pub use feature::{Coordinate, Feature, FeatureCollection, Geometry, GeometryFilter, GeometryKind};
pub use loader::{SourceInfo, SourceKind};
pub use session::{Config, ConversionRequest, ConversionSession};

/// Error types for the conversion pipeline
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("Unsupported input '{0}': expected a .kml or .kmz file")]
    UnsupportedInput(String),

    #[error("No KML file found in KMZ archive")]
    NoMarkupInArchive,

    #[error("KMZ archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("KML parsing error at byte {position}: {message}")]
    Markup { position: u64, message: String },

    #[error("KML is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("Invalid geometry filter '{0}': expected all, point, linestring or polygon")]
    InvalidFilter(String),

    #[error("No BOQ report available: run a conversion first")]
    NoReport,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConvertError>;
