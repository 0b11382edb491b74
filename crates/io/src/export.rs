// Ledger CSV export — the hand-off format for the rendering layer

use std::path::Path;

use payrec_core::{ReconciledRow, ReportSummary};

use crate::error::IoError;

const HEADERS: [&str; 9] = [
    "Date",
    "N° Transaction",
    "Type",
    "Statut",
    "Montant",
    "Frais",
    "De",
    "Vers",
    "Bénéficiaire",
];

/// Write the reconciled ledger as CSV: one header row, one row per
/// transaction, one trailing total row.
pub fn write_ledger_csv(
    path: &Path,
    rows: &[ReconciledRow],
    summary: &ReportSummary,
) -> Result<(), IoError> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| IoError::Csv(e.to_string()))?;

    writer
        .write_record(HEADERS)
        .map_err(|e| IoError::Csv(e.to_string()))?;

    for row in rows {
        let amount = format_amount(row.amount);
        let fee = row.fee.to_string();
        writer
            .write_record([
                row.date.as_str(),
                row.transaction_id.as_str(),
                row.kind.as_str(),
                row.status.as_str(),
                amount.as_str(),
                fee.as_str(),
                row.sender_label.as_str(),
                row.recipient_number.as_str(),
                row.beneficiary_name.as_str(),
            ])
            .map_err(|e| IoError::Csv(e.to_string()))?;
    }

    let total_amount = format_amount(summary.total_amount);
    let total_fees = summary.total_fees.to_string();
    writer
        .write_record([
            "",
            "",
            "",
            "TOTAL",
            total_amount.as_str(),
            total_fees.as_str(),
            "",
            "",
            "",
        ])
        .map_err(|e| IoError::Csv(e.to_string()))?;

    writer.flush().map_err(|e| IoError::Csv(e.to_string()))?;
    Ok(())
}

fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("{}", amount as i64)
    } else {
        format!("{amount:.2}")
    }
}
