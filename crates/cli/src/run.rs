//! `payrec run` — the full reconciliation pipeline.

use std::path::PathBuf;

use clap::Args;

use payrec_core::{Grid, ReportMetadata};
use payrec_engine::{EngineError, NameCache, NoCache, ReconInput, ReconOutput};
use payrec_io::{export, text, workbook};

use crate::cache_file::JsonFileCache;
use crate::exit_codes::{EXIT_IO, EXIT_MALFORMED_INPUT, EXIT_SUCCESS, EXIT_WARNINGS};
use crate::CliError;

#[derive(Args)]
pub struct RunArgs {
    /// Bulk report CSV
    pub report: PathBuf,

    /// Beneficiary list (Excel workbook)
    #[arg(long, short = 'b')]
    pub beneficiaries: Option<PathBuf>,

    /// Fee table (Excel workbook, two numeric columns)
    #[arg(long)]
    pub fees: Option<PathBuf>,

    /// Config file (TOML)
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Print the full result as JSON to stdout
    #[arg(long)]
    pub json: bool,

    /// Write the full result as JSON to a file
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Write the ledger as CSV to a file
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Payment date for the report metadata
    #[arg(long)]
    pub date: Option<String>,

    /// Operation label for the report metadata
    #[arg(long)]
    pub label: Option<String>,

    /// Budget figure for the report metadata
    #[arg(long)]
    pub budget: Option<f64>,

    /// Project/organization name for the report metadata
    #[arg(long)]
    pub project: Option<String>,

    /// Skip the phone→name cache entirely
    #[arg(long)]
    pub no_cache: bool,

    /// Exit non-zero when the run produced warnings
    #[arg(long)]
    pub strict_warnings: bool,
}

pub fn cmd_run(args: RunArgs) -> Result<u8, CliError> {
    let config = crate::load_config(args.config.as_deref())?;

    let report_text = text::read_to_utf8(&args.report)
        .map_err(|e| io_err(e.to_string()))?;

    let beneficiary_grids: Vec<Grid> = match &args.beneficiaries {
        Some(path) => workbook::load_grids(path).map_err(|e| io_err(e.to_string()))?,
        None => Vec::new(),
    };

    let fee_grid: Option<Grid> = match &args.fees {
        Some(path) => Some(workbook::load_first_grid(path).map_err(|e| io_err(e.to_string()))?),
        None => None,
    };

    let metadata = ReportMetadata {
        payment_date: args.date.clone().unwrap_or_default(),
        label: args.label.clone().unwrap_or_default(),
        budget: args.budget.unwrap_or(0.0),
        project_name: args.project.clone().unwrap_or_else(|| config.sender_label.clone()),
    };

    let input = ReconInput {
        report_text: &report_text,
        beneficiary_grids: &beneficiary_grids,
        fee_grid: fee_grid.as_ref(),
        metadata,
    };

    // Cache: file-backed unless disabled by flag or config.
    let use_cache = config.cache.enabled && !args.no_cache;
    let mut file_cache = use_cache.then(|| {
        let path = config
            .cache
            .file
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(JsonFileCache::default_path);
        JsonFileCache::open(path)
    });
    let mut no_cache = NoCache;
    let cache: &mut dyn NameCache = match file_cache.as_mut() {
        Some(c) => c,
        None => &mut no_cache,
    };

    let output = payrec_engine::run(&config, &input, cache).map_err(|e| match e {
        EngineError::MalformedInput { .. } => CliError {
            code: EXIT_MALFORMED_INPUT,
            message: e.to_string(),
            hint: Some("the file has no recognizable transaction rows; retrying will not help".into()),
        },
        other => CliError {
            code: crate::exit_codes::EXIT_CONFIG,
            message: other.to_string(),
            hint: None,
        },
    })?;

    if let Some(cache) = file_cache.as_mut() {
        if let Err(e) = cache.save() {
            eprintln!("warning: cache not saved ({e})");
        }
    }

    write_outputs(&args, &output)?;
    print_summary(&output);

    if args.strict_warnings && !output.warnings.is_empty() {
        return Ok(EXIT_WARNINGS);
    }
    Ok(EXIT_SUCCESS)
}

fn write_outputs(args: &RunArgs, output: &ReconOutput) -> Result<(), CliError> {
    if args.json || args.output.is_some() {
        let json_str = serde_json::to_string_pretty(output)
            .map_err(|e| io_err(format!("JSON serialization error: {e}")))?;

        if let Some(path) = &args.output {
            std::fs::write(path, &json_str)
                .map_err(|e| io_err(format!("cannot write {}: {e}", path.display())))?;
            eprintln!("wrote {}", path.display());
        }
        if args.json {
            println!("{json_str}");
        }
    }

    if let Some(path) = &args.csv {
        export::write_ledger_csv(path, &output.rows, &output.summary)
            .map_err(|e| io_err(e.to_string()))?;
        eprintln!("wrote {}", path.display());
    }

    Ok(())
}

/// Human summary to stderr; stdout stays clean for --json.
fn print_summary(output: &ReconOutput) {
    let s = &output.summary;
    eprintln!(
        "{} transaction(s) — total {:.0}, fees {}, {} unique beneficiar{} — strategy {}, format {}",
        s.transaction_count,
        s.total_amount,
        s.total_fees,
        s.unique_beneficiary_count,
        if s.unique_beneficiary_count == 1 { "y" } else { "ies" },
        output.meta.strategy,
        if output.format.fee_interleaved {
            format!("fee-interleaved ({}% confidence)", output.format.confidence)
        } else {
            "plain".to_string()
        },
    );
    for warning in &output.warnings {
        eprintln!("warning: {warning}");
    }
}

fn io_err(message: String) -> CliError {
    CliError { code: EXIT_IO, message, hint: None }
}
