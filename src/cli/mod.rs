pub mod analyze;
pub mod config;
pub mod demo;
pub mod init;
pub mod report;
#[cfg(feature = "xlsx")]
pub mod show;

use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;

use crate::settings::{FeeConfig, RoundingMode};

#[derive(Parser)]
#[command(
    name = "ordertally",
    about = "Revenue and margin calculator for marketplace order exports."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a settings file with the default fee rates and column labels.
    Init {
        /// Overwrite an existing settings file
        #[arg(long)]
        force: bool,
    },
    /// Print the effective settings as JSON.
    Config,
    /// Analyze an order export (XLSX or CSV).
    Analyze {
        /// Path to the order export
        file: String,
        #[command(flatten)]
        args: AnalyzeArgs,
    },
    /// Analyze a built-in sample order set.
    Demo {
        #[command(flatten)]
        args: AnalyzeArgs,
    },
    /// Print a product summary previously written with --output.
    #[cfg(feature = "xlsx")]
    Show {
        /// Path to the summary XLSX
        file: String,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct AnalyzeArgs {
    /// Compute cost, fee, net profit and margin for every line
    #[arg(long)]
    pub precise: bool,
    /// CSV/XLSX mapping product names to unit costs
    #[arg(long, requires = "precise")]
    pub costs: Option<String>,
    /// Write the product summary to this XLSX file
    #[arg(long)]
    pub output: Option<String>,
    /// Append computed rows to this CSV file (overrides settings)
    #[arg(long)]
    pub append: Option<String>,
    /// Category fee rate in percent
    #[arg(long = "category-fee", requires = "precise")]
    pub category_fee: Option<Decimal>,
    /// Payment fee rate in percent
    #[arg(long = "payment-fee", requires = "precise")]
    pub payment_fee: Option<Decimal>,
    /// Do not apply the VAT multiplier to fees
    #[arg(long = "no-vat", requires = "precise")]
    pub no_vat: bool,
    /// Unit cost for products with no known cost
    #[arg(long = "fallback-cost", requires = "precise")]
    pub fallback_cost: Option<Decimal>,
    /// Fee rounding for display: truncate or nearest
    #[arg(long, value_enum, requires = "precise")]
    pub rounding: Option<RoundingMode>,
}

impl AnalyzeArgs {
    /// Settings fees with any command-line overrides applied.
    pub fn fee_config(&self, base: &FeeConfig) -> FeeConfig {
        let mut fees = base.clone();
        if let Some(rate) = self.category_fee {
            fees.category_fee_rate = rate;
        }
        if let Some(rate) = self.payment_fee {
            fees.payment_fee_rate = rate;
        }
        if self.no_vat {
            fees.vat_inclusive = false;
        }
        if let Some(mode) = self.rounding {
            fees.rounding = mode;
        }
        fees
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_analyze_flags() {
        let cli = Cli::try_parse_from([
            "ordertally",
            "analyze",
            "orders.xlsx",
            "--precise",
            "--category-fee",
            "8.8",
            "--no-vat",
            "--rounding",
            "truncate",
        ])
        .unwrap();
        let Commands::Analyze { file, args } = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(file, "orders.xlsx");
        assert!(args.precise);
        let fees = args.fee_config(&FeeConfig::default());
        assert_eq!(fees.category_fee_rate, Decimal::new(88, 1));
        assert_eq!(fees.payment_fee_rate, Decimal::new(29, 1));
        assert!(!fees.vat_inclusive);
        assert_eq!(fees.rounding, RoundingMode::Truncate);
    }

    #[test]
    fn test_precise_only_flags_require_precise() {
        let cases: [&[&str]; 6] = [
            &["--costs", "costs.csv"],
            &["--category-fee", "8.8"],
            &["--payment-fee", "3"],
            &["--no-vat"],
            &["--fallback-cost", "5000"],
            &["--rounding", "truncate"],
        ];
        for flags in cases {
            let mut argv = vec!["ordertally", "analyze", "orders.csv"];
            argv.extend_from_slice(flags);
            assert!(Cli::try_parse_from(argv.clone()).is_err(), "{flags:?} accepted without --precise");
            argv.push("--precise");
            assert!(Cli::try_parse_from(argv).is_ok(), "{flags:?} rejected with --precise");
        }
        assert!(Cli::try_parse_from(["ordertally", "demo", "--no-vat"]).is_err());
    }

    #[test]
    fn test_fee_config_without_overrides_matches_settings() {
        let base = FeeConfig::default();
        assert_eq!(AnalyzeArgs::default().fee_config(&base), base);
    }
}
