//! Output sinks for the BOQ table

use kml_boq_lib::{Cell, TableSink};
use std::io;

/// Writes BOQ rows as CSV, padding every row to the widest one
pub struct CsvSink<W: io::Write> {
    writer: csv::Writer<W>,
}

impl<W: io::Write> CsvSink<W> {
    pub fn new(inner: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(inner),
        }
    }

    /// Flush and return the underlying writer
    pub fn finish(self) -> io::Result<W> {
        self.writer.into_inner().map_err(|e| e.into_error())
    }
}

impl<W: io::Write> TableSink for CsvSink<W> {
    type Error = csv::Error;

    fn write_rows(&mut self, rows: &[Vec<Cell>]) -> Result<(), Self::Error> {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in rows {
            let fields = row
                .iter()
                .map(ToString::to_string)
                .chain(std::iter::repeat_n(String::new(), width - row.len()));
            self.writer.write_record(fields)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
