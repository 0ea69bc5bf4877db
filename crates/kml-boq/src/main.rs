//! KML BOQ - Command-line converter
//!
//! Loads one `.kml`/`.kmz` file, prints the bill of quantities summary and writes
//! the DXF drawing, the BOQ table (CSV) and the raw JSON dump.

mod logging;
mod output;
mod settings;

use anyhow::Context;
use kml_boq_lib::{ConversionRequest, ConversionSession, TableSink};
use output::CsvSink;
use settings::Settings;
use std::path::{Path, PathBuf};

fn main() -> anyhow::Result<()> {
    logging::setup_logging();
    let settings = Settings::from_cli();

    // File IO is the only async boundary; the pipeline itself runs synchronously
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start the async runtime")?;

    rt.block_on(run(settings)).map(|written| {
        for path in written {
            tracing::info!("Wrote {}", path.display());
        }
    })
}

/// Convert the input file and write the requested outputs, returning their paths
async fn run(settings: Settings) -> anyhow::Result<Vec<PathBuf>> {
    let file_name = settings
        .input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .with_context(|| format!("Not a file: {}", settings.input.display()))?;
    let bytes = tokio::fs::read(&settings.input)
        .await
        .with_context(|| format!("Failed to read {}", settings.input.display()))?;

    let config = settings.config();
    let mut session = ConversionSession::new(config);
    session
        .load_bytes(&file_name, &bytes)
        .with_context(|| format!("Error parsing file {}", file_name))?;

    if let Some((lon, lat)) = session.features().center_wgs84() {
        tracing::info!("Features centered at lon {:.6}, lat {:.6}", lon, lat);
    }

    let request = ConversionRequest::from(session.config());
    let currency = session.config().currency.clone();
    let report = session.convert(request);
    println!("{}", report.summary_line(&currency));

    tokio::fs::create_dir_all(&settings.output_dir)
        .await
        .with_context(|| format!("Failed to create {}", settings.output_dir.display()))?;

    let mut written = Vec::new();

    if !settings.no_dxf {
        let path = settings.output_dir.join(&settings.dxf_name);
        let drawing = session.export_drawing(request.filter);
        write_output(&path, drawing.into_bytes()).await?;
        written.push(path);
    }

    if !settings.no_boq {
        let path = settings.output_dir.join(&settings.boq_name);
        let generated_on = chrono::Local::now().format("%d/%m/%Y").to_string();
        let rows = session.table_rows(&generated_on)?;

        let mut sink = CsvSink::new(Vec::new());
        sink.write_rows(&rows).context("Failed to build BOQ table")?;
        write_output(&path, sink.finish()?).await?;
        written.push(path);
    }

    if !settings.no_json {
        let path = settings.output_dir.join(&settings.json_name);
        write_output(&path, session.raw_dump()?.into_bytes()).await?;
        written.push(path);
    }

    Ok(written)
}

async fn write_output(path: &Path, contents: Vec<u8>) -> anyhow::Result<()> {
    tokio::fs::write(path, contents)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))
}
