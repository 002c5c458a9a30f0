use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;

use crate::error::{Result, TallyError};
use crate::models::DerivedLine;
use crate::settings::FeeConfig;

/// Column order of flattened rows. Basic rows stop after `revenue`.
pub const SINK_COLUMNS: &[&str] = &[
    "order_id",
    "order_date",
    "product_name",
    "quantity_sold",
    "unit_price",
    "revenue",
    "unit_cost",
    "cost_total",
    "fee_estimate",
    "net_profit",
    "margin_pct",
];

/// Append-only destination for computed rows. Never read back.
pub trait RowSink {
    /// Append rows, returning how many were written.
    fn append_rows(&mut self, rows: &[Vec<String>]) -> Result<usize>;
}

fn num(d: Decimal) -> String {
    d.normalize().to_string()
}

pub fn flatten_basic(line: &DerivedLine) -> Vec<String> {
    let l = &line.line;
    vec![
        l.order_id.clone().unwrap_or_default(),
        l.order_date.clone().unwrap_or_default(),
        l.product_name.clone(),
        l.quantity_sold.to_string(),
        num(l.unit_price),
        num(line.revenue),
    ]
}

/// Flatten a precise-mode line; the fee is rounded per `fees.rounding`.
pub fn flatten_precise(line: &DerivedLine, fees: &FeeConfig) -> Vec<String> {
    let mut row = flatten_basic(line);
    if let Some(p) = &line.profit {
        row.extend([
            num(p.unit_cost),
            num(p.cost_total),
            num(fees.display_fee(p.fee_estimate)),
            num(p.net_profit),
            p.margin.percent().map(|m| num(m.round_dp(1))).unwrap_or_default(),
        ]);
    }
    row
}

/// Appends rows to a CSV file, writing the header once when the file is new.
///
/// The file is opened on the first append and the handle is reused afterwards.
/// A file holds rows of one width only: basic rows cannot follow precise rows
/// or the other way round.
pub struct CsvAppendSink {
    path: PathBuf,
    writer: Option<(csv::Writer<File>, usize)>,
}

impl CsvAppendSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: None,
        }
    }

    fn unavailable(&self, e: impl std::fmt::Display) -> TallyError {
        TallyError::SinkUnavailable(format!("{}: {e}", self.path.display()))
    }

    fn open(&self, width: usize) -> Result<csv::Writer<File>> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.unavailable(e))?;
        let existing = header_width(&self.path).map_err(|e| self.unavailable(e))?;
        let mut writer = csv::Writer::from_writer(file);
        match existing {
            None => writer
                .write_record(&SINK_COLUMNS[..width.min(SINK_COLUMNS.len())])
                .map_err(|e| self.unavailable(e))?,
            Some(n) if n == width => {}
            Some(n) => {
                return Err(self.unavailable(format!(
                    "existing header has {n} columns, rows have {width}"
                )))
            }
        }
        Ok(writer)
    }

    fn write_rows(&mut self, rows: &[Vec<String>]) -> Result<usize> {
        let Some(width) = rows.first().map(Vec::len) else {
            return Ok(0);
        };
        if rows.iter().any(|r| r.len() != width) {
            return Err(self.unavailable("rows have mixed column counts"));
        }
        if let Some((_, open_width)) = &self.writer {
            if *open_width != width {
                return Err(self.unavailable(format!(
                    "sink holds {open_width}-column rows, got {width}"
                )));
            }
        } else {
            let writer = self.open(width)?;
            self.writer = Some((writer, width));
        }
        let Some((writer, _)) = self.writer.as_mut() else {
            return Err(TallyError::SinkUnavailable("writer not initialised".to_string()));
        };
        for row in rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(rows.len())
    }
}

/// Field count of the first record, or `None` for an empty file.
fn header_width(path: &Path) -> csv::Result<Option<usize>> {
    let mut reader = csv::ReaderBuilder::new().has_headers(false).from_path(path)?;
    let mut record = csv::StringRecord::new();
    Ok(reader.read_record(&mut record)?.then(|| record.len()))
}

impl RowSink for CsvAppendSink {
    fn append_rows(&mut self, rows: &[Vec<String>]) -> Result<usize> {
        match self.write_rows(rows) {
            Ok(n) => {
                log::info!("appended {n} rows to {}", self.path.display());
                Ok(n)
            }
            Err(e) => {
                log::warn!("append to {} failed: {e}", self.path.display());
                Err(match e {
                    TallyError::SinkUnavailable(_) => e,
                    other => self.unavailable(other),
                })
            }
        }
    }
}
