//! # Pricing Configuration
//!
//! Builds the engine's `GlobalParameters` from a TOML file and the
//! environment.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Command line (highest priority, applied in main)                   │
//! │     --regime lucro_real --margin 12                                    │
//! │                                                                         │
//! │  2. Environment Variables                                              │
//! │     PRECIFICA_REGIME=simples                                           │
//! │     PRECIFICA_PROFIT_MARGIN=9.5                                        │
//! │                                                                         │
//! │  3. TOML Config File                                                   │
//! │     --config <path>, else                                              │
//! │     ~/.config/precifica/pricing.toml (Linux)                           │
//! │     ~/Library/Application Support/br.precifica.precifica/pricing.toml  │
//! │                                                                         │
//! │  4. Default Values (lowest priority)                                   │
//! │     Lucro Presumido, IRPJ 1.2%, CSLL 1.08%, Simples 4%                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [pricing]
//! regime = "lucro_presumido"
//! profit_margin = 9.5
//! loss_percentage = 2.0
//! total_stock_units = 1000
//! payroll = 200.0
//!
//! [rates]
//! simples_nacional = 4.0
//! simples_nacional_remanescente = 2.5
//! irpj = 1.2
//! csll = 1.08
//!
//! [[fixed_expenses]]
//! name = "Aluguel"
//! amount = 1500.0
//!
//! [[variable_expenses]]
//! name = "Cartão"
//! rate = 2.5
//!
//! [comparison]
//! candidates = ["simples_nacional_standard", "lucro_presumido", "lucro_real"]
//! ```

use precifica_core::validation::validate_parameters;
use precifica_core::{GlobalParameters, Money, NamedAmount, NamedRate, Percent, TaxRegime};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::error::{CliError, CliResult};

// =============================================================================
// Sections
// =============================================================================

/// `[pricing]`: scenario-level settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingSection {
    pub regime: TaxRegime,
    /// Target profit margin (0-100).
    pub profit_margin: f64,
    /// Shrinkage/breakage (0-100).
    pub loss_percentage: f64,
    /// Commercial units in stock, the base for fixed-cost allocation.
    pub total_stock_units: f64,
    pub payroll: f64,
}

impl Default for PricingSection {
    fn default() -> Self {
        let defaults = GlobalParameters::default();
        PricingSection {
            regime: defaults.tax_regime,
            profit_margin: defaults.target_profit_margin.percentage(),
            loss_percentage: defaults.loss_percentage.percentage(),
            total_stock_units: defaults.total_stock_units,
            payroll: defaults.payroll.value(),
        }
    }
}

/// `[rates]`: regime rates, all in the 0-100 domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatesSection {
    pub simples_nacional: f64,
    pub simples_nacional_remanescente: f64,
    pub irpj: f64,
    pub csll: f64,
    /// Lucro Real IRPJ; falls back to `irpj`.
    pub lucro_real_irpj: Option<f64>,
    /// Lucro Real CSLL; falls back to `csll`.
    pub lucro_real_csll: Option<f64>,
}

impl Default for RatesSection {
    fn default() -> Self {
        let defaults = GlobalParameters::default();
        RatesSection {
            simples_nacional: defaults.simples_nacional_rate.percentage(),
            simples_nacional_remanescente: defaults
                .simples_nacional_remanescente_rate
                .percentage(),
            irpj: defaults.irpj_rate.percentage(),
            csll: defaults.csll_rate.percentage(),
            lucro_real_irpj: None,
            lucro_real_csll: None,
        }
    }
}

/// `[comparison]`: regimes ranked by the compare commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonSection {
    pub candidates: Vec<TaxRegime>,
}

impl Default for ComparisonSection {
    fn default() -> Self {
        ComparisonSection {
            candidates: TaxRegime::DEFAULT_CANDIDATES.to_vec(),
        }
    }
}

// =============================================================================
// Main Pricing Configuration
// =============================================================================

/// Complete pricing configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    #[serde(default)]
    pub pricing: PricingSection,

    #[serde(default)]
    pub rates: RatesSection,

    #[serde(default)]
    pub fixed_expenses: Vec<NamedAmount>,

    #[serde(default)]
    pub variable_expenses: Vec<NamedRate>,

    #[serde(default)]
    pub comparison: ComparisonSection,
}

impl PricingConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (pricing.toml)
    /// 3. Environment variables
    ///
    /// An explicit `config_path` must exist; the platform default path is
    /// optional.
    pub fn load(config_path: Option<PathBuf>) -> CliResult<Self> {
        let mut config = match config_path {
            Some(path) => {
                info!(?path, "Loading pricing config from file");
                Self::from_file(&path)?
            }
            None => match Self::default_config_path() {
                Some(path) if path.exists() => {
                    info!(?path, "Loading pricing config from file");
                    Self::from_file(&path)?
                }
                path => {
                    debug!(?path, "Config file not found, using defaults");
                    Self::default()
                }
            },
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    fn from_file(path: &std::path::Path) -> CliResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            CliError::ConfigLoadFailed(format!("{}: {}", path.display(), e))
        })?;
        Self::from_toml(&contents)
    }

    /// Parses a TOML document.
    pub fn from_toml(contents: &str) -> CliResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> CliResult<()> {
        if self.comparison.candidates.is_empty() {
            return Err(CliError::InvalidConfig(
                "comparison.candidates must list at least one regime".into(),
            ));
        }

        validate_parameters(&self.to_parameters())
            .map_err(|e| CliError::InvalidConfig(e.to_string()))
    }

    /// Applies environment overrides read through `lookup`.
    ///
    /// Unparseable values are logged and ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Regime
        if let Some(regime) = lookup("PRECIFICA_REGIME") {
            match regime.parse::<TaxRegime>() {
                Ok(parsed) => {
                    debug!(regime = %parsed, "Overriding regime from environment");
                    self.pricing.regime = parsed;
                }
                Err(e) => warn!(error = %e, "Ignoring PRECIFICA_REGIME"),
            }
        }

        // Numeric settings
        let overrides: [(&str, &mut f64); 3] = [
            ("PRECIFICA_PROFIT_MARGIN", &mut self.pricing.profit_margin),
            ("PRECIFICA_LOSS_PERCENTAGE", &mut self.pricing.loss_percentage),
            ("PRECIFICA_TOTAL_STOCK_UNITS", &mut self.pricing.total_stock_units),
        ];
        for (key, slot) in overrides {
            if let Some(raw) = lookup(key) {
                match raw.trim().parse::<f64>() {
                    Ok(value) => {
                        debug!(key, value, "Overriding setting from environment");
                        *slot = value;
                    }
                    Err(_) => warn!(key, value = %raw, "Ignoring non-numeric override"),
                }
            }
        }

        // Candidate list
        if let Some(list) = lookup("PRECIFICA_CANDIDATES") {
            let parsed: Result<Vec<TaxRegime>, _> = list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::parse)
                .collect();
            match parsed {
                Ok(candidates) => {
                    debug!(?candidates, "Overriding comparison candidates from environment");
                    self.comparison.candidates = candidates;
                }
                Err(e) => warn!(error = %e, "Ignoring PRECIFICA_CANDIDATES"),
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("br", "precifica", "precifica")
            .map(|dirs| dirs.config_dir().join("pricing.toml"))
    }

    // =========================================================================
    // Conversion
    // =========================================================================

    /// Engine parameters described by this configuration.
    pub fn to_parameters(&self) -> GlobalParameters {
        GlobalParameters {
            target_profit_margin: Percent::from_percentage(self.pricing.profit_margin),
            fixed_expenses: self.fixed_expenses.clone(),
            variable_expenses: self.variable_expenses.clone(),
            payroll: Money::from_reais(self.pricing.payroll),
            total_stock_units: self.pricing.total_stock_units,
            loss_percentage: Percent::from_percentage(self.pricing.loss_percentage),
            tax_regime: self.pricing.regime,
            simples_nacional_rate: Percent::from_percentage(self.rates.simples_nacional),
            simples_nacional_remanescente_rate: Percent::from_percentage(
                self.rates.simples_nacional_remanescente,
            ),
            irpj_rate: Percent::from_percentage(self.rates.irpj),
            csll_rate: Percent::from_percentage(self.rates.csll),
            lucro_real_irpj_rate: self.rates.lucro_real_irpj.map(Percent::from_percentage),
            lucro_real_csll_rate: self.rates.lucro_real_csll.map(Percent::from_percentage),
        }
    }

    /// Regimes to compare.
    pub fn candidates(&self) -> &[TaxRegime] {
        &self.comparison.candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config_matches_engine_defaults() {
        let config = PricingConfig::default();
        assert_eq!(config.to_parameters(), GlobalParameters::default());
        assert_eq!(config.candidates(), &TaxRegime::DEFAULT_CANDIDATES);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_fixture_parses() {
        let contents = include_str!("../fixtures/pricing.toml");
        let config = PricingConfig::from_toml(contents).unwrap();
        let params = config.to_parameters();

        assert_eq!(params.tax_regime, TaxRegime::LucroPresumido);
        assert_eq!(params.target_profit_margin.percentage(), 9.5);
        assert_eq!(params.fixed_costs_total().value(), 2000.0);
        assert_eq!(params.total_stock_units, 1000.0);
        assert_eq!(params.variable_expenses.len(), 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = PricingConfig::from_toml(
            r#"
            [pricing]
            regime = "simples_nacional_hybrid"

            [rates]
            simples_nacional_remanescente = 2.5
            lucro_real_irpj = 3.0
            "#,
        )
        .unwrap();
        let params = config.to_parameters();

        assert_eq!(params.tax_regime, TaxRegime::SimplesNacionalHybrid);
        assert_eq!(params.simples_nacional_remanescente_rate.percentage(), 2.5);
        assert_eq!(params.irpj_rate.percentage(), 1.2);
        assert_eq!(
            params.lucro_real_irpj_rate.map(|r| r.percentage()),
            Some(3.0)
        );
        assert!(params.lucro_real_csll_rate.is_none());
    }

    #[test]
    fn test_bad_toml_is_load_failure() {
        let err = PricingConfig::from_toml("[pricing]\nregime = \"mei\"").unwrap_err();
        assert!(matches!(err, CliError::ConfigLoadFailed(_)));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = PricingConfig::default();
        config.apply_env_overrides(env(&[
            ("PRECIFICA_REGIME", "real"),
            ("PRECIFICA_PROFIT_MARGIN", "12.5"),
            ("PRECIFICA_LOSS_PERCENTAGE", "3"),
            ("PRECIFICA_TOTAL_STOCK_UNITS", "250"),
            ("PRECIFICA_CANDIDATES", "simples, simples_hibrido"),
        ]));

        assert_eq!(config.pricing.regime, TaxRegime::LucroReal);
        assert_eq!(config.pricing.profit_margin, 12.5);
        assert_eq!(config.pricing.loss_percentage, 3.0);
        assert_eq!(config.pricing.total_stock_units, 250.0);
        assert_eq!(
            config.candidates(),
            &[
                TaxRegime::SimplesNacionalStandard,
                TaxRegime::SimplesNacionalHybrid
            ]
        );
    }

    #[test]
    fn test_bad_env_values_are_ignored() {
        let mut config = PricingConfig::default();
        config.apply_env_overrides(env(&[
            ("PRECIFICA_REGIME", "mei"),
            ("PRECIFICA_PROFIT_MARGIN", "doze"),
            ("PRECIFICA_CANDIDATES", "presumido,banana"),
        ]));
        assert_eq!(config, PricingConfig::default());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = PricingConfig::default();
        config.pricing.loss_percentage = 120.0;
        assert!(config.validate().unwrap_err().is_config_error());

        let mut config = PricingConfig::default();
        config.comparison.candidates.clear();
        assert!(matches!(
            config.validate(),
            Err(CliError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let err = PricingConfig::load(Some(PathBuf::from("/nonexistent/pricing.toml")));
        assert!(matches!(err, Err(CliError::ConfigLoadFailed(_))));
    }

    #[test]
    fn test_toml_serialization() {
        let config = PricingConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[pricing]"));
        assert!(toml_str.contains("[rates]"));
    }
}
