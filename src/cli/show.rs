use std::path::PathBuf;

use colored::Colorize;
use rust_decimal::Decimal;

use crate::cli::report::format_summary;
use crate::error::{Result, TallyError};
use crate::export::read_summary;
use crate::fmt::won;
use crate::settings::shellexpand_path;

pub fn run(file: &str) -> Result<()> {
    let summary = read_summary(&PathBuf::from(shellexpand_path(file)))?;
    let total = summary
        .iter()
        .try_fold(Decimal::ZERO, |acc, s| acc.checked_add(s.total_revenue))
        .ok_or_else(|| TallyError::Overflow("total sales".to_string()))?;
    let quantity = summary
        .iter()
        .try_fold(0u64, |acc, s| acc.checked_add(s.total_quantity))
        .ok_or_else(|| TallyError::Overflow("total quantity".to_string()))?;
    println!(
        "{} {}  ({quantity} units, {} products)\n",
        "Total sales:".bold(),
        won(total).green().bold(),
        summary.len()
    );
    println!("{}", format_summary(&summary));
    Ok(())
}
