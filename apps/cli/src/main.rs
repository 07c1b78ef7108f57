//! # Precifica CLI
//!
//! Prices invoice line items and compares tax regimes from the command line.
//!
//! ## Usage
//! ```bash
//! # Per-item prices under the configured regime
//! precifica price --items items.json --config pricing.toml
//!
//! # Portfolio summary as Lucro Real at a 12% margin
//! precifica summary --items items.json --regime lucro_real --margin 12
//!
//! # Rank regimes, then rank them again at zero margin
//! precifica compare --items items.json
//! precifica minimum --items items.json
//! ```
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  args ──► PricingConfig::load ──► CLI overrides ──► GlobalParameters   │
//! │                                                         │               │
//! │  items.json ──► load_items ──► Scenario ◄───────────────┘               │
//! │                                   │                                     │
//! │          price / summary / compare / minimum                           │
//! │                                   │                                     │
//! │                                   ▼                                     │
//! │                        pretty JSON on stdout                            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod args;
mod config;
mod error;
mod input;

use std::io::Write;
use std::process::ExitCode;

use precifica_core::{Percent, Scenario};
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::args::{parse_args, CliArgs, Command, USAGE};
use crate::config::PricingConfig;
use crate::error::{CliError, CliResult};
use crate::input::load_items;

fn main() -> ExitCode {
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "precifica failed");
            eprintln!("error: {}", e);
            if e.is_config_error() {
                eprintln!("hint: check the --config file and PRECIFICA_* variables");
            } else if matches!(e, CliError::Usage(_)) {
                eprintln!();
                eprintln!("{}", USAGE);
            }
            ExitCode::from(e.exit_code())
        }
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=precifica_core=trace` - Show every priced item
/// - Default: INFO, DEBUG for precifica crates
///
/// Logs go to stderr so stdout carries only the report.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,precifica=debug,precifica_core=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &[String]) -> CliResult<()> {
    let args = parse_args(args)?;
    if args.command == Command::Help {
        println!("{}", USAGE);
        return Ok(());
    }

    let config = PricingConfig::load(args.config.clone())?;
    let scenario = build_scenario(&args, &config)?;
    let candidates = config.candidates();

    info!(
        command = ?args.command,
        regime = %scenario.params.tax_regime,
        items = scenario.items.len(),
        "Running"
    );

    match args.command {
        Command::Price => emit(&scenario.price_items()),
        Command::Summary => emit(&scenario.summary()),
        Command::Compare => emit(&scenario.compare(candidates)),
        Command::Minimum => emit(&scenario.minimum_viable(candidates)),
        Command::Help => Ok(()),
    }
}

/// Loads the items and applies the command-line overrides on top of the
/// configured parameters.
fn build_scenario(args: &CliArgs, config: &PricingConfig) -> CliResult<Scenario> {
    let items = load_items(args.items_path()?)?;

    let mut params = config.to_parameters();
    if let Some(regime) = args.regime {
        params = params.with_regime(regime);
    }
    if let Some(margin) = args.margin {
        params = params.with_profit_margin(Percent::from_percentage(margin));
    }
    precifica_core::validation::validate_parameters(&params)?;

    Ok(Scenario::new(items, params))
}

fn emit<T: Serialize>(value: &T) -> CliResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", json).map_err(|e| CliError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use precifica_core::TaxRegime;
    use std::path::PathBuf;

    fn fixture(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("fixtures")
            .join(name)
    }

    fn fixture_config() -> PricingConfig {
        PricingConfig::from_toml(include_str!("../fixtures/pricing.toml")).unwrap()
    }

    fn args_for(command: Command) -> CliArgs {
        CliArgs {
            command,
            items: Some(fixture("items.json")),
            config: None,
            regime: None,
            margin: None,
        }
    }

    #[test]
    fn test_scenario_from_fixtures() {
        let scenario = build_scenario(&args_for(Command::Summary), &fixture_config()).unwrap();
        assert_eq!(scenario.items.len(), 3);
        assert_eq!(scenario.params.tax_regime, TaxRegime::LucroPresumido);

        let summary = scenario.summary();
        assert!(summary.is_feasible());
        assert_eq!(summary.fixed_expenses_total.value(), 2000.0);
    }

    #[test]
    fn test_command_line_overrides() {
        let args = CliArgs {
            regime: Some(TaxRegime::LucroReal),
            margin: Some(15.0),
            ..args_for(Command::Price)
        };
        let scenario = build_scenario(&args, &fixture_config()).unwrap();
        assert_eq!(scenario.params.tax_regime, TaxRegime::LucroReal);
        assert_eq!(scenario.params.target_profit_margin.percentage(), 15.0);
    }

    #[test]
    fn test_out_of_range_margin_rejected() {
        let args = CliArgs {
            margin: Some(100.0),
            ..args_for(Command::Price)
        };
        assert!(matches!(
            build_scenario(&args, &fixture_config()),
            Err(CliError::Core(_))
        ));
    }

    #[test]
    fn test_compare_report_serializes() {
        let config = fixture_config();
        let scenario = build_scenario(&args_for(Command::Compare), &config).unwrap();
        let report = serde_json::to_value(scenario.compare(config.candidates())).unwrap();

        assert_eq!(report["scenarios"].as_array().map(Vec::len), Some(3));
        assert!(report["best"].is_string());
        assert_eq!(report["profitMargin"], 9.5);
    }
}
