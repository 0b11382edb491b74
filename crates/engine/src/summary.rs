use std::collections::BTreeSet;

use payrec_core::{ReconciledRow, ReportSummary};

/// Compute summary statistics over the final ledger.
pub fn compute_summary(rows: &[ReconciledRow]) -> ReportSummary {
    let total_amount: f64 = rows.iter().map(|r| r.amount).sum();
    let total_fees: i64 = rows.iter().map(|r| r.fee).sum();
    let unique: BTreeSet<&str> = rows.iter().map(|r| r.beneficiary_name.as_str()).collect();

    let (min_amount, max_amount) = rows.iter().fold((f64::MAX, f64::MIN), |(lo, hi), r| {
        (lo.min(r.amount), hi.max(r.amount))
    });

    ReportSummary {
        transaction_count: rows.len(),
        total_amount,
        total_fees,
        unique_beneficiary_count: unique.len(),
        average_amount: if rows.is_empty() { 0.0 } else { total_amount / rows.len() as f64 },
        min_amount: if rows.is_empty() { 0.0 } else { min_amount },
        max_amount: if rows.is_empty() { 0.0 } else { max_amount },
    }
}
