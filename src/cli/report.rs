use colored::Colorize;
use comfy_table::{Cell, Table};
use rust_decimal::Decimal;

use crate::aggregator::PreciseReport;
use crate::fmt::won;
use crate::models::{Margin, ProductSummary};
use crate::settings::FeeConfig;

// ---------------------------------------------------------------------------
// Pure formatting functions (computed values → String)
// ---------------------------------------------------------------------------

pub fn format_total_sales(total_sales: Decimal, line_count: usize) -> String {
    format!(
        "{} {}  ({line_count} order lines)",
        "Total sales:".bold(),
        won(total_sales).green().bold()
    )
}

pub fn format_summary(summary: &[ProductSummary]) -> String {
    if summary.is_empty() {
        return "No order lines found.".to_string();
    }
    let mut table = Table::new();
    table.set_header(vec!["Product", "Quantity", "Revenue"]);
    for s in summary {
        table.add_row(vec![
            Cell::new(&s.product_name),
            Cell::new(s.total_quantity),
            Cell::new(won(s.total_revenue)),
        ]);
    }
    format!("Product Summary\n{table}")
}

fn margin_cell(margin: &Margin) -> String {
    match margin {
        Margin::Percent(p) if p.is_sign_negative() => margin.to_string().red().to_string(),
        Margin::Percent(_) => margin.to_string(),
        Margin::Undefined => margin.to_string().dimmed().to_string(),
    }
}

pub fn format_precise(report: &PreciseReport, fees: &FeeConfig) -> String {
    let mut table = Table::new();
    table.set_header(vec![
        "Product", "Qty", "Revenue", "Unit Cost", "Cost", "Fee", "Net Profit", "Margin",
    ]);
    for l in &report.lines {
        let Some(p) = &l.profit else { continue };
        let profit = if p.net_profit.is_sign_negative() {
            won(p.net_profit).red().to_string()
        } else {
            won(p.net_profit)
        };
        table.add_row(vec![
            Cell::new(&l.line.product_name),
            Cell::new(l.line.quantity_sold),
            Cell::new(won(l.revenue)),
            Cell::new(won(p.unit_cost)),
            Cell::new(won(p.cost_total)),
            Cell::new(won(fees.display_fee(p.fee_estimate))),
            Cell::new(profit),
            Cell::new(margin_cell(&p.margin)),
        ]);
    }

    let t = &report.totals;
    let mut totals = Table::new();
    totals.set_header(vec!["Total", "Amount"]);
    totals.add_row(vec![Cell::new("Revenue"), Cell::new(won(t.total_revenue))]);
    totals.add_row(vec![Cell::new("Cost"), Cell::new(won(t.total_cost))]);
    totals.add_row(vec![Cell::new("Fees"), Cell::new(won(fees.display_fee(t.total_fee)))]);
    let net_label = if t.total_profit.is_sign_negative() {
        "Net Profit".red().bold()
    } else {
        "Net Profit".green().bold()
    };
    totals.add_row(vec![Cell::new(net_label), Cell::new(won(t.total_profit))]);
    totals.add_row(vec![Cell::new("Margin"), Cell::new(margin_cell(&t.overall_margin))]);

    format!(
        "Profit by Line (fee rate {}%)\n{table}\n\n{totals}",
        report.effective_fee_rate.normalize()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use crate::aggregator::{AggregatorConfig, SalesAggregator};
    use crate::models::OrderLine;

    #[test]
    fn test_format_summary_lists_products() {
        colored::control::set_override(false);
        let out = format_summary(&[ProductSummary {
            product_name: "Apple 1kg".to_string(),
            total_quantity: 5,
            total_revenue: Decimal::new(75000, 0),
        }]);
        assert!(out.starts_with("Product Summary"));
        assert!(out.contains("Apple 1kg"));
        assert!(out.contains("75,000 원"));
    }

    #[test]
    fn test_format_summary_empty() {
        assert_eq!(format_summary(&[]), "No order lines found.");
    }

    #[test]
    fn test_format_precise_shows_rate_and_undefined_margin() {
        colored::control::set_override(false);
        let agg = SalesAggregator::new(AggregatorConfig::default());
        let lines = vec![OrderLine {
            order_id: None,
            product_name: "X".to_string(),
            quantity_sold: 0,
            unit_price: Decimal::new(25000, 0),
            unit_cost: Some(Decimal::new(15000, 0)),
            order_date: None,
        }];
        let fees = FeeConfig::default();
        let report = agg.compute_precise(&lines, &HashMap::new(), &fees).unwrap();
        let out = format_precise(&report, &fees);
        assert!(out.contains("fee rate 14.74%"));
        assert!(out.contains("n/a"));
    }
}
