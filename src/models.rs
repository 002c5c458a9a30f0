use std::collections::HashMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Raw input
// ---------------------------------------------------------------------------

/// A single spreadsheet value as handed over by the importer.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => write!(f, "{s}"),
            Cell::Int(i) => write!(f, "{i}"),
            Cell::Float(v) => write!(f, "{v}"),
            Cell::Bool(b) => write!(f, "{b}"),
        }
    }
}

pub type RawRow = HashMap<String, Cell>;

/// Header labels in sheet order plus one map per data row.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    pub fn has_column(&self, label: &str) -> bool {
        self.headers.iter().any(|h| h == label)
    }
}

// ---------------------------------------------------------------------------
// Logical columns
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    OrderId,
    ProductName,
    QuantitySold,
    UnitPrice,
    UnitCost,
    OrderDate,
}

/// Maps each logical column to the header label used in the source sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
    pub order_id: String,
    pub product_name: String,
    pub quantity_sold: String,
    pub unit_price: String,
    pub unit_cost: String,
    pub order_date: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            order_id: "주문번호".to_string(),
            product_name: "상품명".to_string(),
            quantity_sold: "판매수량".to_string(),
            unit_price: "판매가".to_string(),
            unit_cost: "원가".to_string(),
            order_date: "주문일".to_string(),
        }
    }
}

impl ColumnMap {
    pub fn label(&self, column: Column) -> &str {
        match column {
            Column::OrderId => &self.order_id,
            Column::ProductName => &self.product_name,
            Column::QuantitySold => &self.quantity_sold,
            Column::UnitPrice => &self.unit_price,
            Column::UnitCost => &self.unit_cost,
            Column::OrderDate => &self.order_date,
        }
    }
}

// ---------------------------------------------------------------------------
// Order lines and derived values
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine {
    pub order_id: Option<String>,
    pub product_name: String,
    pub quantity_sold: u64,
    pub unit_price: Decimal,
    pub unit_cost: Option<Decimal>,
    pub order_date: Option<String>,
}

/// Net profit as a share of revenue. `Undefined` when revenue is zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Margin {
    Percent(Decimal),
    Undefined,
}

impl Margin {
    /// `None` when the percentage does not fit in a `Decimal`.
    pub fn checked(profit: Decimal, revenue: Decimal) -> Option<Self> {
        if revenue.is_zero() {
            return Some(Margin::Undefined);
        }
        profit
            .checked_div(revenue)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .map(Margin::Percent)
    }

    pub fn percent(&self) -> Option<Decimal> {
        match self {
            Margin::Percent(p) => Some(*p),
            Margin::Undefined => None,
        }
    }
}

impl fmt::Display for Margin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Margin::Percent(p) => write!(f, "{}%", p.round_dp(1)),
            Margin::Undefined => write!(f, "n/a"),
        }
    }
}

/// Cost, fee and profit figures attached to a line in precise mode.
#[derive(Debug, Clone, PartialEq)]
pub struct Profit {
    pub unit_cost: Decimal,
    pub cost_total: Decimal,
    pub fee_estimate: Decimal,
    pub net_profit: Decimal,
    pub margin: Margin,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DerivedLine {
    pub line: OrderLine,
    pub revenue: Decimal,
    pub profit: Option<Profit>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductSummary {
    pub product_name: String,
    pub total_quantity: u64,
    pub total_revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreciseTotals {
    pub total_revenue: Decimal,
    pub total_cost: Decimal,
    pub total_fee: Decimal,
    pub total_profit: Decimal,
    pub overall_margin: Margin,
}
