//! ConversionSession - Top-level context for one loaded file
//!
//! The session owns the extracted features of one source file and the most recent
//! BOQ report. Features are read-only once loaded; every conversion request
//! replaces the report.

use crate::dxf::DEFAULT_LAYER;
use crate::loader::{self, SourceInfo};
use crate::{
    BoqReport, Cell, ConvertError, DxfOptions, FeatureCollection, GeometryFilter, Result,
    dump, dxf, estimate, extract,
};
use std::path::Path;
use std::sync::Arc;

/// Default price applied per unit of quantity
pub const DEFAULT_UNIT_RATE: f64 = 1000.0;

/// Default currency label used in table headers
pub const DEFAULT_CURRENCY: &str = "Rp";

/// Configuration for conversions
#[derive(Debug, Clone)]
pub struct Config {
    /// Price per unit (count, meter or square meter), applied to every item
    pub unit_rate: f64,
    /// Geometry kinds included in the estimate and the drawing
    pub filter: GeometryFilter,
    /// Layer every DXF entity is placed on
    pub layer_name: String,
    /// Currency label for the BOQ table
    pub currency: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            unit_rate: DEFAULT_UNIT_RATE,
            filter: GeometryFilter::All,
            layer_name: DEFAULT_LAYER.to_string(),
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

/// Parameters of one conversion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConversionRequest {
    pub filter: GeometryFilter,
    pub unit_rate: f64,
}

impl From<&Config> for ConversionRequest {
    fn from(config: &Config) -> Self {
        Self {
            filter: config.filter,
            unit_rate: config.unit_rate,
        }
    }
}

/// Session-scoped state for one source file
#[derive(Debug, Clone)]
pub struct ConversionSession {
    config: Config,
    source: Option<SourceInfo>,
    features: Arc<FeatureCollection>,
    /// Report of the last conversion, with the request that produced it
    report: Option<(ConversionRequest, BoqReport)>,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl ConversionSession {
    /// Create an empty session
    pub fn new(config: Config) -> Self {
        Self {
            config,
            source: None,
            features: Arc::new(FeatureCollection::default()),
            report: None,
        }
    }

    /// Load a `.kml`/`.kmz` file from raw bytes, replacing any previous source
    pub fn load_bytes(&mut self, file_name: &str, bytes: &[u8]) -> Result<&FeatureCollection> {
        let (info, markup) = loader::load_markup(file_name, bytes)?;
        self.install(info, &markup)
    }

    /// Load a `.kml`/`.kmz` file from disk, replacing any previous source
    pub fn load_path(&mut self, path: &Path) -> Result<&FeatureCollection> {
        let (info, markup) = loader::load_markup_from_path(path)?;
        self.install(info, &markup)
    }

    fn install(&mut self, info: SourceInfo, markup: &str) -> Result<&FeatureCollection> {
        let features = extract::extract_features(markup)?;
        tracing::info!("Loaded {} features from {}", features.len(), info.name);

        self.source = Some(info);
        self.features = Arc::new(features);
        self.report = None;
        Ok(self.features.as_ref())
    }

    /// Estimate the loaded features, replacing the previous report
    pub fn convert(&mut self, request: ConversionRequest) -> &BoqReport {
        let report = estimate::estimate(self.features.filtered(request.filter), request.unit_rate);
        let (_, report) = self.report.insert((request, report));
        report
    }

    /// Estimate with the session configuration
    pub fn convert_default(&mut self) -> &BoqReport {
        let request = ConversionRequest::from(&self.config);
        self.convert(request)
    }

    /// DXF text for the features accepted by `filter`
    pub fn export_drawing(&self, filter: GeometryFilter) -> String {
        let options = DxfOptions {
            layer_name: self.config.layer_name.clone(),
        };
        dxf::export_drawing(&self.features, filter, &options)
    }

    /// BOQ table rows of the last conversion
    pub fn table_rows(&self, generated_on: &str) -> Result<Vec<Vec<Cell>>> {
        let (_, report) = self.report.as_ref().ok_or(ConvertError::NoReport)?;
        Ok(report.table_rows(generated_on, &self.config.currency))
    }

    /// Raw JSON dump of all loaded features, regardless of filter
    pub fn raw_dump(&self) -> Result<String> {
        dump::raw_dump(&self.features)
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[inline]
    pub fn source(&self) -> Option<&SourceInfo> {
        self.source.as_ref()
    }

    /// Shared handle to the loaded features
    #[inline]
    pub fn features(&self) -> Arc<FeatureCollection> {
        Arc::clone(&self.features)
    }

    #[inline]
    pub fn report(&self) -> Option<&BoqReport> {
        self.report.as_ref().map(|(_, report)| report)
    }

    /// Request that produced the current report
    #[inline]
    pub fn last_request(&self) -> Option<ConversionRequest> {
        self.report.as_ref().map(|(request, _)| *request)
    }

    /// Drop the loaded source and report
    pub fn clear(&mut self) {
        self.source = None;
        self.features = Arc::new(FeatureCollection::default());
        self.report = None;
    }
}
