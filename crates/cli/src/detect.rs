//! `payrec detect` — format detection without reconciliation.

use std::path::Path;

use payrec_engine::{classify, parser, EngineError};
use payrec_io::text;

use crate::exit_codes::{EXIT_IO, EXIT_MALFORMED_INPUT, EXIT_SUCCESS};
use crate::CliError;

pub fn cmd_detect(report: &Path, config: Option<&Path>, json: bool) -> Result<u8, CliError> {
    let config = crate::load_config(config)?;

    let report_text = text::read_to_utf8(report).map_err(|e| CliError {
        code: EXIT_IO,
        message: e.to_string(),
        hint: None,
    })?;

    let parsed = parser::parse_report(&report_text, &config).map_err(|e| CliError {
        code: match e {
            EngineError::MalformedInput { .. } => EXIT_MALFORMED_INPUT,
            _ => EXIT_IO,
        },
        message: e.to_string(),
        hint: None,
    })?;

    let format_report = classify::classify(&parsed.records);

    if json {
        let json_str = serde_json::to_string_pretty(&format_report).map_err(|e| CliError {
            code: EXIT_IO,
            message: format!("JSON serialization error: {e}"),
            hint: None,
        })?;
        println!("{json_str}");
    } else {
        eprintln!(
            "{} parsed row(s): {} ({}% confidence), {} principal transaction(s)",
            parsed.records.len(),
            if format_report.fee_interleaved { "fee-interleaved" } else { "plain" },
            format_report.confidence,
            format_report.principal_count,
        );
        for line in &format_report.evidence {
            eprintln!("  - {line}");
        }
    }

    Ok(EXIT_SUCCESS)
}
