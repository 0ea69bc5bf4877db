//! Bill of quantities estimation
//!
//! Turns measured features into priced line items. A single unit rate applies to
//! every item; filtering by geometry kind is done by the caller.

use crate::{Feature, GeometryKind, measure};
use std::fmt;

/// Unit for point items
pub const UNIT_COUNT: &str = "count";
/// Unit for line items
pub const UNIT_LINEAR_METER: &str = "linear-meter";
/// Unit for polygon items
pub const UNIT_SQUARE_METER: &str = "square-meter";

/// Title written on the first row of the BOQ table
pub const TABLE_TITLE: &str = "BILL OF QUANTITIES (BOQ)";

/// One priced row of the bill of quantities
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub name: String,
    pub kind: GeometryKind,
    pub quantity: f64,
    pub unit: &'static str,
    pub unit_price: f64,
    /// Always `quantity * unit_price`
    pub total_price: f64,
}

/// Number of included features per geometry kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub points: usize,
    pub lines: usize,
    pub polygons: usize,
}

impl Summary {
    #[inline]
    pub fn total(&self) -> usize {
        self.points + self.lines + self.polygons
    }

    fn record(&mut self, kind: GeometryKind) {
        match kind {
            GeometryKind::Point => self.points += 1,
            GeometryKind::LineString => self.lines += 1,
            GeometryKind::Polygon => self.polygons += 1,
        }
    }
}

/// Priced report for one conversion request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoqReport {
    items: Vec<LineItem>,
    total_cost: f64,
    summary: Summary,
}

/// Unit of measure for a geometry kind
#[inline]
pub fn unit_for(kind: GeometryKind) -> &'static str {
    match kind {
        GeometryKind::Point => UNIT_COUNT,
        GeometryKind::LineString => UNIT_LINEAR_METER,
        GeometryKind::Polygon => UNIT_SQUARE_METER,
    }
}

/// Price every feature at `unit_rate`, in iteration order
///
/// Each geometry is measured once. Items whose feature has an empty name are
/// called `Feature <n>`, `n` being the 1-based position in `features`.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn estimate<'a, I>(features: I, unit_rate: f64) -> BoqReport
where
    I: IntoIterator<Item = &'a Feature>,
{
    let mut report = BoqReport::default();

    for (index, feature) in features.into_iter().enumerate() {
        let kind = feature.kind();
        let quantity = measure::quantity(feature.geometry());
        let total_price = quantity * unit_rate;

        let name = if feature.name().is_empty() {
            format!("Feature {}", index + 1)
        } else {
            feature.name().to_string()
        };

        report.summary.record(kind);
        report.total_cost += total_price;
        report.items.push(LineItem {
            name,
            kind,
            quantity,
            unit: unit_for(kind),
            unit_price: unit_rate,
            total_price,
        });
    }

    tracing::info!(
        "Estimated {} items at rate {}: total {:.2}",
        report.items.len(),
        unit_rate,
        report.total_cost
    );
    report
}

impl BoqReport {
    #[inline]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    #[inline]
    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    #[inline]
    pub fn summary(&self) -> Summary {
        self.summary
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Rows handed to a spreadsheet sink
    ///
    /// Layout: title, generation date, blank, header, one row per item, blank,
    /// and a total row with `TOTAL:` in the sixth column.
    pub fn table_rows(&self, generated_on: &str, currency: &str) -> Vec<Vec<Cell>> {
        let mut rows = Vec::with_capacity(self.items.len() + 6);

        rows.push(vec![Cell::text(TABLE_TITLE)]);
        rows.push(vec![Cell::text(format!("Generated on: {}", generated_on))]);
        rows.push(Vec::new());
        rows.push(vec![
            Cell::text("No"),
            Cell::text("Item"),
            Cell::text("Type"),
            Cell::text("Quantity"),
            Cell::text("Unit"),
            Cell::text(format!("Unit Price ({})", currency)),
            Cell::text(format!("Total Price ({})", currency)),
        ]);

        for (index, item) in self.items.iter().enumerate() {
            rows.push(vec![
                Cell::Integer(index as u64 + 1),
                Cell::text(item.name.as_str()),
                Cell::text(item.kind.as_str()),
                Cell::Number(item.quantity),
                Cell::text(item.unit),
                Cell::Number(item.unit_price),
                Cell::Number(item.total_price),
            ]);
        }

        rows.push(Vec::new());
        let mut total_row = vec![Cell::Empty; 5];
        total_row.push(Cell::text("TOTAL:"));
        total_row.push(Cell::Number(self.total_cost));
        rows.push(total_row);

        rows
    }

    /// Write the table rows into `sink`
    pub fn write_table<S: TableSink>(
        &self,
        sink: &mut S,
        generated_on: &str,
        currency: &str,
    ) -> std::result::Result<(), S::Error> {
        sink.write_rows(&self.table_rows(generated_on, currency))
    }

    /// One-line human summary
    pub fn summary_line(&self, currency: &str) -> String {
        format!(
            "{} items ({} points, {} lines, {} polygons), total cost {} {:.2}",
            self.items.len(),
            self.summary.points,
            self.summary.lines,
            self.summary.polygons,
            currency,
            self.total_cost
        )
    }
}

/// A single spreadsheet cell
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Integer(u64),
    Number(f64),
}

impl Cell {
    #[inline]
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(text) => f.write_str(text),
            Cell::Integer(value) => write!(f, "{}", value),
            Cell::Number(value) => write!(f, "{}", value),
        }
    }
}

/// Receives the BOQ table and serializes it into some spreadsheet container
pub trait TableSink {
    type Error;

    fn write_rows(&mut self, rows: &[Vec<Cell>]) -> std::result::Result<(), Self::Error>;
}

/// In-memory sink, mostly useful for tests and previews
impl TableSink for Vec<Vec<Cell>> {
    type Error = std::convert::Infallible;

    fn write_rows(&mut self, rows: &[Vec<Cell>]) -> std::result::Result<(), Self::Error> {
        self.extend_from_slice(rows);
        Ok(())
    }
}
