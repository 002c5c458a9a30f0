use std::collections::HashMap;
use std::path::PathBuf;

use crate::aggregator::{AggregatorConfig, SalesAggregator};
use crate::cli::report;
use crate::cli::AnalyzeArgs;
use crate::error::{Result, TallyError};
use crate::importer::{load_costs, load_table};
use crate::models::{ProductSummary, RawTable};
use crate::settings::{load_settings, shellexpand_path, Settings};
use crate::sink::{flatten_basic, flatten_precise, CsvAppendSink, RowSink};

pub fn run(file: &str, args: AnalyzeArgs) -> Result<()> {
    let settings = load_settings();
    let table = load_table(&PathBuf::from(shellexpand_path(file)))?;
    analyze_table(&settings, &table, &args)
}

/// Compute, print, then hand the result to the export and sink collaborators.
///
/// All computation finishes before anything is printed; export and sink
/// failures are reported after the report has been shown.
pub(crate) fn analyze_table(settings: &Settings, table: &RawTable, args: &AnalyzeArgs) -> Result<()> {
    let fees = args.fee_config(&settings.fees);
    fees.validate()?;
    let mut config = AggregatorConfig::from(settings);
    if let Some(cost) = args.fallback_cost {
        config.fallback_unit_cost = cost;
    }
    if config.fallback_unit_cost.is_sign_negative() {
        return Err(TallyError::Settings(format!(
            "fallback_unit_cost must not be negative, got {}",
            config.fallback_unit_cost
        )));
    }
    let agg = SalesAggregator::new(config);

    let lines = agg.order_lines(table)?;
    let basic = agg.compute_basic(&lines)?;
    let summary = agg.summarize(&basic.lines);

    let precise = if args.precise {
        let costs = match &args.costs {
            Some(path) => load_costs(&PathBuf::from(shellexpand_path(path)), &agg.config().columns)?,
            None => HashMap::new(),
        };
        Some(agg.compute_precise(&lines, &costs, &fees)?)
    } else {
        None
    };

    println!("{}", report::format_total_sales(basic.total_sales, lines.len()));
    println!();
    println!("{}", report::format_summary(&summary));
    if let Some(p) = &precise {
        println!();
        println!("{}", report::format_precise(p, &fees));
    }

    if let Some(output) = &args.output {
        export_summary(&summary, output)?;
    }

    let sink_path = args.append.clone().or_else(|| settings.sink_path.clone());
    if let Some(path) = sink_path {
        let rows: Vec<Vec<String>> = match &precise {
            Some(p) => p.lines.iter().map(|l| flatten_precise(l, &fees)).collect(),
            None => basic.lines.iter().map(flatten_basic).collect(),
        };
        let mut sink = CsvAppendSink::new(shellexpand_path(&path));
        let n = sink.append_rows(&rows)?;
        println!("Appended {n} rows to {path}");
    }

    Ok(())
}

#[cfg(feature = "xlsx")]
fn export_summary(summary: &[ProductSummary], output: &str) -> Result<()> {
    let path = PathBuf::from(shellexpand_path(output));
    crate::export::write_summary_xlsx(summary, &path)?;
    println!("Wrote {}", path.display());
    Ok(())
}

#[cfg(not(feature = "xlsx"))]
fn export_summary(_summary: &[ProductSummary], _output: &str) -> Result<()> {
    Err(crate::error::TallyError::Other(
        "XLSX export requires the 'xlsx' feature".into(),
    ))
}
