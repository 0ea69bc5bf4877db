use clap::Parser;
use kml_boq_lib::{Config, GeometryFilter};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// KML BOQ - Convert KML/KMZ files into a DXF drawing, a bill of quantities and a raw JSON dump
pub struct Settings {
    /// KML or KMZ file to convert
    #[clap(value_name = "FILE")]
    pub input: PathBuf,

    /// Directory the output files are written to
    #[clap(short, long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Geometry kinds to include (all, point, linestring, polygon)
    #[clap(short, long, default_value = "all")]
    pub geometry_type: GeometryFilter,

    /// Price per unit (per point, per meter of line, per square meter of polygon)
    #[clap(short, long, env = "KML_BOQ_UNIT_RATE", default_value = "1000")]
    pub unit_rate: f64,

    /// Currency label used in the BOQ table
    #[clap(long, default_value = "Rp")]
    pub currency: String,

    /// DXF layer name
    #[clap(long, default_value = "KML_LAYER")]
    pub layer_name: String,

    /// File name of the DXF drawing
    #[clap(long, default_value = "converted.dxf")]
    pub dxf_name: String,

    /// File name of the BOQ table
    #[clap(long, default_value = "BOQ_Report.csv")]
    pub boq_name: String,

    /// File name of the raw JSON dump
    #[clap(long, default_value = "converted.json")]
    pub json_name: String,

    /// Skip writing the DXF drawing
    #[clap(long, default_value = "false")]
    pub no_dxf: bool,

    /// Skip writing the BOQ table
    #[clap(long, default_value = "false")]
    pub no_boq: bool,

    /// Skip writing the raw JSON dump
    #[clap(long, default_value = "false")]
    pub no_json: bool,
}

impl Settings {
    /// Parse the command line, exiting with a usage message on error
    pub fn from_cli() -> Self {
        match Settings::try_parse() {
            Ok(args) => args,
            Err(e) => e.exit(),
        }
    }

    /// Library configuration derived from the command line
    pub fn config(&self) -> Config {
        Config {
            unit_rate: self.unit_rate,
            filter: self.geometry_type,
            layer_name: self.layer_name.clone(),
            currency: self.currency.clone(),
        }
    }
}
