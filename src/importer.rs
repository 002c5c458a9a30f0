use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::error::{Result, TallyError};
use crate::models::{Cell, ColumnMap, RawRow, RawTable};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a numeric cell without rounding. Text may carry thousands
/// separators, a `₩` prefix or a trailing `원`.
pub fn parse_decimal(cell: &Cell) -> Option<Decimal> {
    match cell {
        Cell::Int(i) => Some(Decimal::from(*i)),
        Cell::Float(f) if f.is_finite() => Decimal::from_str(&f.to_string()).ok(),
        Cell::Text(raw) => {
            let s: String = raw
                .chars()
                .filter(|c| !matches!(c, ',' | '₩' | '원' | '"') && !c.is_whitespace())
                .collect();
            if s.is_empty() {
                return None;
            }
            Decimal::from_str(&s).ok()
        }
        _ => None,
    }
}

pub fn excel_serial_to_date(serial: f64) -> Option<String> {
    // Excel epoch is 1899-12-30 (accounting for the 1900 leap year bug)
    let base = chrono::NaiveDate::from_ymd_opt(1899, 12, 30)?;
    let date = base.checked_add_signed(chrono::Duration::days(serial as i64))?;
    Some(date.format("%Y-%m-%d").to_string())
}

/// Render a date cell as text. Numeric cells are treated as Excel serials.
pub fn cell_to_date(cell: &Cell) -> Option<String> {
    match cell {
        Cell::Float(f) => excel_serial_to_date(*f),
        Cell::Int(i) => excel_serial_to_date(*i as f64),
        Cell::Text(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

fn is_spreadsheet(file_path: &Path) -> bool {
    file_path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e.to_ascii_lowercase().as_str(), "xlsx" | "xlsm" | "xls" | "ods"))
        .unwrap_or(false)
}

fn push_row(table: &mut RawTable, row: RawRow) {
    if row.values().all(Cell::is_empty) {
        return;
    }
    table.rows.push(row);
}

// ---------------------------------------------------------------------------
// load_table
// ---------------------------------------------------------------------------

/// Read an order export into a `RawTable`. The first row is the header.
pub fn load_table(file_path: &Path) -> Result<RawTable> {
    let table = if is_spreadsheet(file_path) {
        load_xlsx(file_path)?
    } else {
        load_csv(file_path)?
    };
    log::info!(
        "loaded {} rows ({} columns) from {}",
        table.rows.len(),
        table.headers.len(),
        file_path.display()
    );
    Ok(table)
}

fn load_csv(file_path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(file_path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(std::io::BufReader::new(file));

    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();
    let mut table = RawTable {
        headers,
        rows: Vec::new(),
    };

    for result in rdr.records() {
        let record = result?;
        let mut row = RawRow::new();
        for (label, value) in table.headers.iter().zip(record.iter()) {
            let cell = if value.is_empty() {
                Cell::Empty
            } else {
                Cell::Text(value.to_string())
            };
            row.insert(label.clone(), cell);
        }
        push_row(&mut table, row);
    }
    log::debug!("csv headers: {:?}", table.headers);
    Ok(table)
}

#[cfg(feature = "xlsx")]
fn load_xlsx(file_path: &Path) -> Result<RawTable> {
    use calamine::{Data, Reader};

    let mut workbook = calamine::open_workbook_auto(file_path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| TallyError::Other(format!("{} has no worksheets", file_path.display())))??;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header) => header.iter().map(|c| c.to_string().trim().to_string()).collect(),
        None => Vec::new(),
    };
    let mut table = RawTable {
        headers,
        rows: Vec::new(),
    };

    for data_row in rows {
        let mut row = RawRow::new();
        for (label, value) in table.headers.iter().zip(data_row.iter()) {
            let cell = match value {
                Data::Empty => Cell::Empty,
                Data::Int(i) => Cell::Int(*i),
                Data::Float(f) => Cell::Float(*f),
                Data::String(s) => Cell::Text(s.clone()),
                Data::Bool(b) => Cell::Bool(*b),
                Data::DateTime(dt) => Cell::Float(dt.as_f64()),
                other => Cell::Text(other.to_string()),
            };
            row.insert(label.clone(), cell);
        }
        push_row(&mut table, row);
    }
    log::debug!("xlsx headers: {:?}", table.headers);
    Ok(table)
}

#[cfg(not(feature = "xlsx"))]
fn load_xlsx(file_path: &Path) -> Result<RawTable> {
    Err(TallyError::Other(format!(
        "{}: XLSX support requires the 'xlsx' feature",
        file_path.display()
    )))
}

// ---------------------------------------------------------------------------
// Cost tables
// ---------------------------------------------------------------------------

/// Read a product → unit-cost table using the product and cost column labels.
pub fn load_costs(file_path: &Path, columns: &ColumnMap) -> Result<HashMap<String, Decimal>> {
    let table = load_table(file_path)?;
    costs_from_table(&table, columns)
}

pub fn costs_from_table(table: &RawTable, columns: &ColumnMap) -> Result<HashMap<String, Decimal>> {
    for label in [&columns.product_name, &columns.unit_cost] {
        if !table.has_column(label) {
            return Err(TallyError::MissingColumn {
                column: label.clone(),
            });
        }
    }

    let mut costs = HashMap::new();
    for (i, row) in table.rows.iter().enumerate() {
        let name = row
            .get(&columns.product_name)
            .map(|c| c.to_string().trim().to_string())
            .unwrap_or_default();
        if name.is_empty() {
            return Err(TallyError::EmptyProductName { row: i + 1 });
        }
        let cell = row.get(&columns.unit_cost).unwrap_or(&Cell::Empty);
        let cost = parse_decimal(cell)
            .filter(|c| !c.is_sign_negative())
            .ok_or_else(|| TallyError::InvalidNumeric {
                row: i + 1,
                column: columns.unit_cost.clone(),
                value: cell.to_string(),
            })?;
        costs.insert(name, cost);
    }
    Ok(costs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_csv(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal(&Cell::Text("15,000".into())), Some(Decimal::new(15000, 0)));
        assert_eq!(parse_decimal(&Cell::Text("₩12,000".into())), Some(Decimal::new(12000, 0)));
        assert_eq!(parse_decimal(&Cell::Text("9,900원".into())), Some(Decimal::new(9900, 0)));
        assert_eq!(parse_decimal(&Cell::Text(" 2.5 ".into())), Some(Decimal::new(25, 1)));
        assert_eq!(parse_decimal(&Cell::Int(3)), Some(Decimal::new(3, 0)));
        assert_eq!(parse_decimal(&Cell::Float(0.1)), Some(Decimal::new(1, 1)));
        assert_eq!(parse_decimal(&Cell::Text("abc".into())), None);
        assert_eq!(parse_decimal(&Cell::Empty), None);
        assert_eq!(parse_decimal(&Cell::Float(f64::NAN)), None);
    }

    #[test]
    fn test_excel_serial_to_date() {
        assert_eq!(excel_serial_to_date(45667.0), Some("2025-01-10".to_string()));
    }

    #[test]
    fn test_cell_to_date() {
        assert_eq!(cell_to_date(&Cell::Text(" 2025-03-01 ".into())), Some("2025-03-01".to_string()));
        assert_eq!(cell_to_date(&Cell::Float(45667.0)), Some("2025-01-10".to_string()));
        assert_eq!(cell_to_date(&Cell::Empty), None);
    }

    #[test]
    fn test_load_csv_reads_headers_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "orders.csv",
            "\u{feff}주문번호,상품명,판매수량,판매가\n\
             A-1,사과 1kg,2,\"15,000\"\n\
             ,,,\n\
             A-2,귤 2kg,1,12000\n",
        );
        let table = load_table(&path).unwrap();
        assert_eq!(table.headers, vec!["주문번호", "상품명", "판매수량", "판매가"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0]["판매가"], Cell::Text("15,000".into()));
        assert_eq!(table.rows[1]["상품명"], Cell::Text("귤 2kg".into()));
    }

    #[test]
    fn test_load_csv_short_row_leaves_columns_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "short.csv", "a,b,c\n1,2\n");
        let table = load_table(&path).unwrap();
        assert_eq!(table.rows.len(), 1);
        assert!(table.rows[0].get("c").is_none());
    }

    #[test]
    fn test_load_costs() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "costs.csv", "상품명,원가\n사과 1kg,\"9,000\"\n귤 2kg,7000\n");
        let costs = load_costs(&path, &ColumnMap::default()).unwrap();
        assert_eq!(costs.len(), 2);
        assert_eq!(costs["사과 1kg"], Decimal::new(9000, 0));
    }

    #[test]
    fn test_load_costs_missing_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "costs.csv", "상품명,price\n사과 1kg,9000\n");
        let err = load_costs(&path, &ColumnMap::default()).unwrap_err();
        assert!(matches!(err, TallyError::MissingColumn { ref column } if column == "원가"));
    }

    #[test]
    fn test_load_costs_rejects_bad_number() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "costs.csv", "상품명,원가\n사과 1kg,free\n");
        let err = load_costs(&path, &ColumnMap::default()).unwrap_err();
        assert!(matches!(err, TallyError::InvalidNumeric { row: 1, .. }));
    }
}
