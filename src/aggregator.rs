use std::collections::{BTreeMap, HashMap};

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::error::{Result, TallyError};
use crate::importer::{cell_to_date, parse_decimal};
use crate::models::{
    Cell, Column, ColumnMap, DerivedLine, Margin, OrderLine, PreciseTotals, ProductSummary, Profit,
    RawRow, RawTable,
};
use crate::settings::{FeeConfig, Settings};

/// Largest quantity accepted on a single order line.
pub const MAX_QUANTITY: u64 = 1_000_000_000;
/// Largest unit price or unit cost accepted on a single order line.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000;

/// Everything the aggregator needs besides the data and the fee rates.
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    pub columns: ColumnMap,
    /// Unit cost used for products with no known cost.
    pub fallback_unit_cost: Decimal,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

impl From<&Settings> for AggregatorConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            columns: settings.columns.clone(),
            fallback_unit_cost: settings.fallback_unit_cost,
        }
    }
}

pub struct BasicReport {
    pub lines: Vec<DerivedLine>,
    pub total_sales: Decimal,
}

pub struct PreciseReport {
    pub lines: Vec<DerivedLine>,
    pub totals: PreciseTotals,
    pub effective_fee_rate: Decimal,
}

/// Turns order rows into revenue, cost, fee and margin figures.
///
/// Holds only configuration; every operation is a pure function of its inputs.
pub struct SalesAggregator {
    config: AggregatorConfig,
}

impl SalesAggregator {
    pub fn new(config: AggregatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Projection and parsing
    // -----------------------------------------------------------------------

    /// Restrict every row to exactly `required`, preserving order and count.
    pub fn project(&self, table: &RawTable, required: &[&str]) -> Result<Vec<RawRow>> {
        if let Some(missing) = required.iter().find(|label| !table.has_column(label)) {
            return Err(TallyError::MissingColumn {
                column: missing.to_string(),
            });
        }
        Ok(table
            .rows
            .iter()
            .map(|row| {
                required
                    .iter()
                    .map(|label| {
                        let cell = row.get(*label).cloned().unwrap_or(Cell::Empty);
                        (label.to_string(), cell)
                    })
                    .collect()
            })
            .collect())
    }

    /// Project the order columns and parse each row into an `OrderLine`.
    ///
    /// Product, quantity and price are required; order id, unit cost and
    /// order date are picked up when the table has them.
    pub fn order_lines(&self, table: &RawTable) -> Result<Vec<OrderLine>> {
        let cols = &self.config.columns;
        let mut labels = vec![
            cols.label(Column::ProductName),
            cols.label(Column::QuantitySold),
            cols.label(Column::UnitPrice),
        ];
        for optional in [Column::OrderId, Column::UnitCost, Column::OrderDate] {
            if table.has_column(cols.label(optional)) {
                labels.push(cols.label(optional));
            }
        }

        let rows = self.project(table, &labels)?;
        let lines = rows
            .iter()
            .enumerate()
            .map(|(i, row)| self.parse_line(i + 1, row))
            .collect::<Result<Vec<_>>>()?;
        log::debug!("parsed {} order lines", lines.len());
        Ok(lines)
    }

    fn parse_line(&self, row_no: usize, row: &RawRow) -> Result<OrderLine> {
        let cols = &self.config.columns;
        let text = |column: Column| -> Option<String> {
            row.get(cols.label(column))
                .filter(|c| !c.is_empty())
                .map(|c| c.to_string().trim().to_string())
        };
        let invalid = |column: Column| TallyError::InvalidNumeric {
            row: row_no,
            column: cols.label(column).to_string(),
            value: row.get(cols.label(column)).map(|c| c.to_string()).unwrap_or_default(),
        };
        let amount = |column: Column| -> Result<Decimal> {
            row.get(cols.label(column))
                .and_then(parse_decimal)
                .filter(|d| !d.is_sign_negative() && *d <= Decimal::from(MAX_AMOUNT))
                .ok_or_else(|| invalid(column))
        };

        let product_name = text(Column::ProductName).ok_or(TallyError::EmptyProductName { row: row_no })?;

        let quantity = amount(Column::QuantitySold)?;
        if !quantity.fract().is_zero() {
            return Err(invalid(Column::QuantitySold));
        }
        let quantity_sold = quantity
            .to_u64()
            .filter(|q| *q <= MAX_QUANTITY)
            .ok_or_else(|| invalid(Column::QuantitySold))?;

        let unit_price = amount(Column::UnitPrice)?;

        let unit_cost = match row.get(cols.label(Column::UnitCost)) {
            Some(cell) if !cell.is_empty() => Some(amount(Column::UnitCost)?),
            _ => None,
        };

        Ok(OrderLine {
            order_id: text(Column::OrderId),
            product_name,
            quantity_sold,
            unit_price,
            unit_cost,
            order_date: row.get(cols.label(Column::OrderDate)).and_then(cell_to_date),
        })
    }

    // -----------------------------------------------------------------------
    // Basic mode
    // -----------------------------------------------------------------------

    pub fn compute_basic(&self, lines: &[OrderLine]) -> Result<BasicReport> {
        let mut derived = Vec::with_capacity(lines.len());
        let mut total_sales = Decimal::ZERO;
        for (i, line) in lines.iter().enumerate() {
            let revenue = revenue(i + 1, line)?;
            total_sales = total_sales
                .checked_add(revenue)
                .ok_or_else(|| overflow("total sales"))?;
            derived.push(DerivedLine {
                revenue,
                line: line.clone(),
                profit: None,
            });
        }
        log::debug!("basic mode: {} lines", derived.len());
        Ok(BasicReport {
            lines: derived,
            total_sales,
        })
    }

    /// One summary per distinct product name, ordered by name.
    pub fn summarize(&self, lines: &[DerivedLine]) -> Vec<ProductSummary> {
        let mut groups: BTreeMap<&str, (u64, Decimal)> = BTreeMap::new();
        for l in lines {
            let entry = groups.entry(l.line.product_name.as_str()).or_default();
            entry.0 += l.line.quantity_sold;
            entry.1 += l.revenue;
        }
        groups
            .into_iter()
            .map(|(name, (total_quantity, total_revenue))| ProductSummary {
                product_name: name.to_string(),
                total_quantity,
                total_revenue,
            })
            .collect()
    }

    // -----------------------------------------------------------------------
    // Precise mode
    // -----------------------------------------------------------------------

    /// Unit cost for a line: explicit table first, then the line's own
    /// cost column, then the configured fallback.
    pub fn unit_cost_for(&self, line: &OrderLine, cost_by_product: &HashMap<String, Decimal>) -> Decimal {
        cost_by_product
            .get(&line.product_name)
            .copied()
            .or(line.unit_cost)
            .unwrap_or(self.config.fallback_unit_cost)
    }

    /// Cost, fee, net profit and margin per line plus aggregate totals.
    ///
    /// Fails with `Settings` when `fees` is out of range and with `Overflow`
    /// when a product or quotient does not fit in a `Decimal`.
    pub fn compute_precise(
        &self,
        lines: &[OrderLine],
        cost_by_product: &HashMap<String, Decimal>,
        fees: &FeeConfig,
    ) -> Result<PreciseReport> {
        fees.validate()?;
        let rate = fees.effective_rate();

        let mut derived = Vec::with_capacity(lines.len());
        for (i, line) in lines.iter().enumerate() {
            let row = i + 1;
            let at = |what: &str| overflow(format!("{what} on row {row}"));

            let revenue = revenue(row, line)?;
            let unit_cost = self.unit_cost_for(line, cost_by_product);
            let cost_total = Decimal::from(line.quantity_sold)
                .checked_mul(unit_cost)
                .ok_or_else(|| at("cost total"))?;
            let fee_estimate = revenue
                .checked_mul(rate)
                .and_then(|f| f.checked_div(Decimal::ONE_HUNDRED))
                .ok_or_else(|| at("fee estimate"))?;
            let net_profit = revenue
                .checked_sub(cost_total)
                .and_then(|p| p.checked_sub(fee_estimate))
                .ok_or_else(|| at("net profit"))?;
            let margin = Margin::checked(net_profit, revenue).ok_or_else(|| at("margin"))?;

            derived.push(DerivedLine {
                line: line.clone(),
                revenue,
                profit: Some(Profit {
                    unit_cost,
                    cost_total,
                    fee_estimate,
                    net_profit,
                    margin,
                }),
            });
        }

        let mut totals = PreciseTotals {
            total_revenue: Decimal::ZERO,
            total_cost: Decimal::ZERO,
            total_fee: Decimal::ZERO,
            total_profit: Decimal::ZERO,
            overall_margin: Margin::Undefined,
        };
        for l in &derived {
            add(&mut totals.total_revenue, l.revenue, "total revenue")?;
            if let Some(p) = &l.profit {
                add(&mut totals.total_cost, p.cost_total, "total cost")?;
                add(&mut totals.total_fee, p.fee_estimate, "total fee")?;
                add(&mut totals.total_profit, p.net_profit, "total profit")?;
            }
        }
        totals.overall_margin = Margin::checked(totals.total_profit, totals.total_revenue)
            .ok_or_else(|| overflow("overall margin"))?;

        log::debug!("precise mode: {} lines at fee rate {rate}%", derived.len());
        Ok(PreciseReport {
            lines: derived,
            totals,
            effective_fee_rate: rate,
        })
    }
}

fn overflow(what: impl Into<String>) -> TallyError {
    TallyError::Overflow(what.into())
}

fn add(acc: &mut Decimal, value: Decimal, what: &str) -> Result<()> {
    *acc = acc.checked_add(value).ok_or_else(|| overflow(what))?;
    Ok(())
}

fn revenue(row: usize, line: &OrderLine) -> Result<Decimal> {
    Decimal::from(line.quantity_sold)
        .checked_mul(line.unit_price)
        .ok_or_else(|| overflow(format!("revenue on row {row}")))
}
