use std::path::PathBuf;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TallyError};
use crate::models::ColumnMap;

/// How fee estimates are rounded to whole currency units for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    /// Drop the fractional part (toward zero).
    Truncate,
    /// Round half away from zero.
    #[default]
    Nearest,
}

impl RoundingMode {
    pub fn apply(&self, value: Decimal) -> Decimal {
        match self {
            Self::Truncate => value.trunc(),
            Self::Nearest => value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero),
        }
    }
}

/// Platform fee rates, in percent of revenue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeConfig {
    #[serde(default = "default_category_fee_rate")]
    pub category_fee_rate: Decimal,
    #[serde(default = "default_payment_fee_rate")]
    pub payment_fee_rate: Decimal,
    #[serde(default = "default_vat_inclusive")]
    pub vat_inclusive: bool,
    #[serde(default = "default_vat_multiplier")]
    pub vat_multiplier: Decimal,
    #[serde(default)]
    pub rounding: RoundingMode,
}

fn default_category_fee_rate() -> Decimal {
    Decimal::new(105, 1)
}

fn default_payment_fee_rate() -> Decimal {
    Decimal::new(29, 1)
}

fn default_vat_inclusive() -> bool {
    true
}

fn default_vat_multiplier() -> Decimal {
    Decimal::new(11, 1)
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            category_fee_rate: default_category_fee_rate(),
            payment_fee_rate: default_payment_fee_rate(),
            vat_inclusive: default_vat_inclusive(),
            vat_multiplier: default_vat_multiplier(),
            rounding: RoundingMode::default(),
        }
    }
}

impl FeeConfig {
    /// Combined fee rate in percent, VAT applied when configured.
    pub fn effective_rate(&self) -> Decimal {
        let rate = self.category_fee_rate + self.payment_fee_rate;
        if self.vat_inclusive {
            rate * self.vat_multiplier
        } else {
            rate
        }
    }

    pub fn display_fee(&self, fee: Decimal) -> Decimal {
        self.rounding.apply(fee)
    }

    /// Rates must lie in 0..=100 and the VAT multiplier in 1..=2.
    pub fn validate(&self) -> Result<()> {
        let hundred = Decimal::ONE_HUNDRED;
        for (name, rate) in [
            ("category_fee_rate", self.category_fee_rate),
            ("payment_fee_rate", self.payment_fee_rate),
        ] {
            if rate.is_sign_negative() || rate > hundred {
                return Err(TallyError::Settings(format!(
                    "{name} must be between 0 and 100, got {rate}"
                )));
            }
        }
        if self.vat_multiplier < Decimal::ONE || self.vat_multiplier > Decimal::TWO {
            return Err(TallyError::Settings(format!(
                "vat_multiplier must be between 1 and 2, got {}",
                self.vat_multiplier
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub columns: ColumnMap,
    #[serde(default)]
    pub fees: FeeConfig,
    #[serde(default = "default_fallback_unit_cost")]
    pub fallback_unit_cost: Decimal,
    #[serde(default)]
    pub sink_path: Option<String>,
    #[serde(default = "default_export_dir")]
    pub export_dir: String,
}

fn default_fallback_unit_cost() -> Decimal {
    Decimal::new(10000, 0)
}

fn default_export_dir() -> String {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("ordertally")
        .join("exports")
        .to_string_lossy()
        .to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            columns: ColumnMap::default(),
            fees: FeeConfig::default(),
            fallback_unit_cost: default_fallback_unit_cost(),
            sink_path: None,
            export_dir: default_export_dir(),
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("ordertally")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if !path.exists() {
        return Settings::default();
    }
    let content = std::fs::read_to_string(&path).unwrap_or_default();
    match serde_json::from_str(&content) {
        Ok(settings) => settings,
        Err(e) => {
            log::warn!("ignoring malformed {}: {e}", path.display());
            Settings::default()
        }
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    std::fs::create_dir_all(config_dir())?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| TallyError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

pub fn settings_file_exists() -> bool {
    settings_path().exists()
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}
