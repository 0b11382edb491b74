//! Pipeline orchestration.
//!
//! PARSING → CLASSIFYING → FILTERING → RESOLVING_BENEFICIARIES →
//! COMPUTING_FEES → VALIDATING → DONE. Every stage is a pure function of
//! the previous stage's output; the only fatal exit is a report that no
//! parse strategy can read.

use payrec_core::{ReconWarning, ReconciledRow};

use crate::cache::NameCache;
use crate::classify;
use crate::columns;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::fees::FeeTable;
use crate::model::{ReconInput, ReconOutput, RunMeta};
use crate::parser;
use crate::resolver;
use crate::summary::compute_summary;
use crate::time::format_ledger_date;

/// Run one reconciliation. Input order is preserved end to end; the
/// ledger length equals the classifier's principal count.
pub fn run(
    config: &EngineConfig,
    input: &ReconInput,
    cache: &mut dyn NameCache,
) -> Result<ReconOutput, EngineError> {
    let mut warnings: Vec<ReconWarning> = Vec::new();

    // PARSING
    let parsed = parser::parse_report(input.report_text, config)?;
    if parsed.used_fallback {
        warnings.push(ReconWarning::ParseFallback);
    }
    if parsed.dropped > 0 {
        warnings.push(ReconWarning::RowsDropped { count: parsed.dropped });
    }

    // CLASSIFYING + FILTERING
    let format = classify::classify(&parsed.records);
    let principal = classify::apply_filter(parsed.records, &format);

    // RESOLVING_BENEFICIARIES
    let extraction = columns::extract_entries(input.beneficiary_grids);
    let entries = extraction.as_ref().map(|e| e.entries.as_slice()).unwrap_or(&[]);
    let resolution = resolver::resolve(&principal, entries, cache);
    warnings.extend(resolution.warnings.iter().cloned());

    // COMPUTING_FEES
    let fee_table = input.fee_grid.map(FeeTable::from_grid).unwrap_or_default();
    if fee_table.is_empty() {
        warnings.push(ReconWarning::FeeTableInvalid);
    }

    let rows: Vec<ReconciledRow> = principal
        .iter()
        .zip(&resolution.names)
        .map(|(record, name)| ReconciledRow {
            date: format_ledger_date(&record.transaction_timestamp),
            transaction_id: record.transaction_id.clone(),
            kind: config.transaction_kind.clone(),
            status: clean_status(&record.status),
            amount: record.amount,
            recipient_number: record.recipient_number.clone(),
            sender_label: config.sender_label.clone(),
            beneficiary_name: name.clone(),
            fee: fee_table.fee_for(record.amount, config.default_fee_rate),
        })
        .collect();

    // VALIDATING
    let summary = compute_summary(&rows);
    if summary.total_amount > 0.0 {
        let ratio = summary.total_fees as f64 / summary.total_amount;
        if ratio > config.fee_ratio_alert {
            warnings.push(ReconWarning::HighFeeRatio { ratio });
        }
    }

    Ok(ReconOutput {
        meta: RunMeta {
            config_name: config.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            strategy: resolution.strategy,
        },
        format,
        rows,
        summary,
        metadata: input.metadata.clone(),
        preamble: parsed.preamble,
        warnings,
    })
}

/// Trim the status; the feed writes "Succes" and sometimes nothing.
fn clean_status(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        "Succes".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_status_defaults() {
        assert_eq!(clean_status("  "), "Succes");
        assert_eq!(clean_status(" Success "), "Success");
    }
}
