// payrec CLI - headless bulk-payment reconciliation

mod cache_file;
mod detect;
mod exit_codes;
mod run;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use payrec_engine::EngineConfig;

use exit_codes::{EXIT_CONFIG, EXIT_IO};

/// Error carrying its shell exit code.
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Parser)]
#[command(name = "payrec")]
#[command(about = "Bulk-payment reconciliation (headless)")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile a bulk report against a beneficiary list
    #[command(after_help = "\
Examples:
  payrec run BulkReport_130809.csv -b Export.xlsx
  payrec run BulkReport_130809.csv -b Export.xlsx --fees frais.xlsx --csv ledger.csv
  payrec run BulkReport_130809.csv -b Export.xlsx --json | jq .summary
  payrec run BulkReport_130809.csv -b Export.xlsx -c payrec.toml --output result.json")]
    Run(run::RunArgs),

    /// Parse a bulk report and print the detected format only
    #[command(after_help = "\
Examples:
  payrec detect BulkReport_130809.csv
  payrec detect BulkReport_130809.csv --json")]
    Detect {
        /// Bulk report CSV
        report: PathBuf,

        /// Config file (TOML)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Output JSON instead of a human summary
        #[arg(long)]
        json: bool,
    },

    /// Validate a config file without running
    #[command(after_help = "\
Examples:
  payrec validate payrec.toml")]
    Validate {
        /// Config file (TOML)
        config: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run(args) => run::cmd_run(args),
        Commands::Detect { report, config, json } => detect::cmd_detect(&report, config.as_deref(), json),
        Commands::Validate { config } => cmd_validate(&config),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("error: {}", e.message);
            if let Some(hint) = e.hint {
                eprintln!("hint: {hint}");
            }
            ExitCode::from(e.code)
        }
    }
}

fn cmd_validate(path: &Path) -> Result<u8, CliError> {
    let config_str = std::fs::read_to_string(path).map_err(|e| CliError {
        code: EXIT_IO,
        message: format!("cannot read {}: {e}", path.display()),
        hint: None,
    })?;
    EngineConfig::from_toml(&config_str).map_err(|e| CliError {
        code: EXIT_CONFIG,
        message: e.to_string(),
        hint: None,
    })?;
    eprintln!("{} is valid", path.display());
    Ok(exit_codes::EXIT_SUCCESS)
}

/// Load the engine config, defaulting when no file is given.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig, CliError> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let config_str = std::fs::read_to_string(path).map_err(|e| CliError {
        code: EXIT_IO,
        message: format!("cannot read config {}: {e}", path.display()),
        hint: None,
    })?;
    EngineConfig::from_toml(&config_str).map_err(|e| CliError {
        code: EXIT_CONFIG,
        message: e.to_string(),
        hint: Some("check the TOML against the documented keys".into()),
    })
}
