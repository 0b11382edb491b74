use serde::Serialize;

// ---------------------------------------------------------------------------
// Bulk report rows
// ---------------------------------------------------------------------------

/// Canonical column count of the bulk report schema.
pub const RECORD_FIELD_COUNT: usize = 14;

/// One parsed row of the bulk-payment report.
///
/// Immutable after parsing: enrichment (beneficiary name, computed fee)
/// produces a [`ReconciledRow`], it never writes back into the record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionRecord {
    pub record_no: String,
    pub validation_result: String,
    pub recipient_number: String,
    pub transaction_timestamp: String,
    pub finished_timestamp: String,
    pub transaction_id: String,
    pub details: String,
    pub amount: f64,
    pub fee_charge: f64,
    pub extra_fee_charge: f64,
    pub tax: f64,
    pub status: String,
    pub error_code: String,
    pub error_message: String,
}

// ---------------------------------------------------------------------------
// Beneficiary table
// ---------------------------------------------------------------------------

/// One usable row of the beneficiary table. `display_name` is non-empty
/// after trimming; rows with a blank name are dropped during extraction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BeneficiaryEntry {
    pub display_name: String,
    pub phone_number: Option<String>,
}

// ---------------------------------------------------------------------------
// Fee table
// ---------------------------------------------------------------------------

/// Fee of a banded rule: a flat amount or a rate applied to the transaction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BandFee {
    Amount(f64),
    Rate(f64),
}

/// One row of the fee table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeRule {
    Exact { amount: f64, fee: f64 },
    Banded { min_amount: f64, max_amount: f64, fee: BandFee },
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// One line of the reconciled ledger handed to the rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciledRow {
    pub date: String,
    pub transaction_id: String,
    pub kind: String,
    pub status: String,
    pub amount: f64,
    pub recipient_number: String,
    pub sender_label: String,
    pub beneficiary_name: String,
    pub fee: i64,
}

/// Report-level metadata, supplied by the caller. File contents only ever
/// provide defaults (see [`ReportPreamble`]), never overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportMetadata {
    pub payment_date: String,
    pub label: String,
    pub budget: f64,
    pub project_name: String,
}

/// Optional defaults scraped from the bulk report's preamble lines.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportPreamble {
    pub plan_name: Option<String>,
    pub organization: Option<String>,
}

/// Aggregate statistics over the final ledger.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub transaction_count: usize,
    pub total_amount: f64,
    pub total_fees: i64,
    pub unique_beneficiary_count: usize,
    pub average_amount: f64,
    pub min_amount: f64,
    pub max_amount: f64,
}
