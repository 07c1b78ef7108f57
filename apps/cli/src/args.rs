//! Command-line parsing.

use precifica_core::TaxRegime;
use std::path::PathBuf;

use crate::error::{CliError, CliResult};

pub const USAGE: &str = "\
Precifica - CBS/IBS retail pricing engine

Usage: precifica <COMMAND> --items <FILE> [OPTIONS]

Commands:
  price      Price every line item under the active regime
  summary    Portfolio summary under the active regime
  compare    Rank the candidate regimes by net profit
  minimum    Rank the candidate regimes at zero profit margin
  help       Show this help message

Options:
  -i, --items <FILE>     Line items JSON file
  -c, --config <FILE>    Pricing config (default: platform config dir/pricing.toml)
  -r, --regime <REGIME>  Override the active regime
  -m, --margin <PCT>     Override the target profit margin
  -h, --help             Show this help message

Logging: RUST_LOG=debug (logs go to stderr)";

/// Sub-command to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Price,
    Summary,
    Compare,
    Minimum,
    Help,
}

impl std::str::FromStr for Command {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "price" => Ok(Command::Price),
            "summary" => Ok(Command::Summary),
            "compare" => Ok(Command::Compare),
            "minimum" | "minimum-viable" => Ok(Command::Minimum),
            "help" => Ok(Command::Help),
            other => Err(CliError::Usage(format!(
                "Unknown command: '{}'. Run `precifica help` for usage.",
                other
            ))),
        }
    }
}

/// Parsed command line.
#[derive(Debug, Clone, PartialEq)]
pub struct CliArgs {
    pub command: Command,
    pub items: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub regime: Option<TaxRegime>,
    pub margin: Option<f64>,
}

impl CliArgs {
    /// Items path, required by every command except `help`.
    pub fn items_path(&self) -> CliResult<&PathBuf> {
        self.items
            .as_ref()
            .ok_or_else(|| CliError::Usage("--items <FILE> is required".into()))
    }
}

/// Parses arguments (without the program name).
pub fn parse_args(args: &[String]) -> CliResult<CliArgs> {
    let mut parsed = CliArgs {
        command: Command::Help,
        items: None,
        config: None,
        regime: None,
        margin: None,
    };
    let mut command: Option<Command> = None;

    let mut i = 0;
    while i < args.len() {
        let arg = args[i].as_str();
        match arg {
            "--items" | "-i" => parsed.items = Some(PathBuf::from(value(args, i)?)),
            "--config" | "-c" => parsed.config = Some(PathBuf::from(value(args, i)?)),
            "--regime" | "-r" => parsed.regime = Some(value(args, i)?.parse()?),
            "--margin" | "-m" => {
                let raw = value(args, i)?;
                let margin = raw.parse::<f64>().map_err(|_| {
                    CliError::Usage(format!("--margin expects a number, got '{}'", raw))
                })?;
                parsed.margin = Some(margin);
            }
            "--help" | "-h" => return Ok(CliArgs { command: Command::Help, ..parsed }),
            flag if flag.starts_with('-') => {
                return Err(CliError::Usage(format!("Unknown option: '{}'", flag)));
            }
            name => {
                if command.is_some() {
                    return Err(CliError::Usage(format!("Unexpected argument: '{}'", name)));
                }
                command = Some(name.parse()?);
                i += 1;
                continue;
            }
        }
        // Flags consume their value.
        i += 2;
    }

    parsed.command = command.unwrap_or(Command::Help);
    Ok(parsed)
}

fn value(args: &[String], i: usize) -> CliResult<&str> {
    args.get(i + 1)
        .map(String::as_str)
        .ok_or_else(|| CliError::Usage(format!("{} requires a value", args[i])))
}
