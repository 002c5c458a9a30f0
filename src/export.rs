use std::path::Path;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::error::{Result, TallyError};
use crate::importer::{load_table, parse_decimal};
use crate::models::{Cell, ProductSummary, RawTable};

pub const SUMMARY_HEADERS: [&str; 3] = ["product_name", "total_quantity", "total_revenue"];

/// Write the product summary as a single-sheet workbook.
pub fn write_summary_xlsx(summaries: &[ProductSummary], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name("summary")?;

    for (col, header) in SUMMARY_HEADERS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, &bold)?;
    }
    for (i, s) in summaries.iter().enumerate() {
        let row = (i + 1) as u32;
        sheet.write_string(row, 0, &s.product_name)?;
        write_amount(sheet, row, 1, Decimal::from(s.total_quantity))?;
        write_amount(sheet, row, 2, s.total_revenue)?;
    }
    sheet.set_column_width(0, 32.0)?;

    workbook.save(path)?;
    log::info!("wrote {} summary rows to {}", summaries.len(), path.display());
    Ok(())
}

/// Numeric cell when an f64 reads back as exactly `value`, text otherwise.
fn write_amount(sheet: &mut Worksheet, row: u32, col: u16, value: Decimal) -> Result<()> {
    let exact = value
        .to_f64()
        .filter(|f| Decimal::from_str(&f.to_string()).ok() == Some(value));
    match exact {
        Some(n) => sheet.write_number(row, col, n)?,
        None => sheet.write_string(row, col, value.to_string())?,
    };
    Ok(())
}

/// Read a summary sheet written by `write_summary_xlsx` back into values.
pub fn read_summary(path: &Path) -> Result<Vec<ProductSummary>> {
    summaries_from_table(&load_table(path)?)
}

pub fn summaries_from_table(table: &RawTable) -> Result<Vec<ProductSummary>> {
    for header in SUMMARY_HEADERS {
        if !table.has_column(header) {
            return Err(TallyError::MissingColumn {
                column: header.to_string(),
            });
        }
    }
    let [name_col, qty_col, revenue_col] = SUMMARY_HEADERS;

    table
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let cell = |label: &str| row.get(label).cloned().unwrap_or(Cell::Empty);
            let invalid = |label: &str| TallyError::InvalidNumeric {
                row: i + 1,
                column: label.to_string(),
                value: cell(label).to_string(),
            };
            let total_quantity = parse_decimal(&cell(qty_col))
                .and_then(|d| d.to_u64())
                .ok_or_else(|| invalid(qty_col))?;
            let total_revenue = parse_decimal(&cell(revenue_col)).ok_or_else(|| invalid(revenue_col))?;
            Ok(ProductSummary {
                product_name: cell(name_col).to_string(),
                total_quantity,
                total_revenue,
            })
        })
        .collect()
}
