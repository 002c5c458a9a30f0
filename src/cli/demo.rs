use crate::cli::analyze::analyze_table;
use crate::cli::AnalyzeArgs;
use crate::error::Result;
use crate::sample::sample_table;
use crate::settings::load_settings;

pub fn run(args: AnalyzeArgs) -> Result<()> {
    let settings = load_settings();
    let table = sample_table(&settings.columns);
    println!("Sample data: {} orders\n", table.rows.len());
    analyze_table(&settings, &table, &args)
}
