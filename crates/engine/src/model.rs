use serde::Serialize;

use payrec_core::{
    Grid, ReconWarning, ReconciledRow, ReportMetadata, ReportPreamble, ReportSummary,
};

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Pre-loaded inputs for one reconciliation run. The io crate (or a test)
/// materializes these; the engine never touches the filesystem.
pub struct ReconInput<'a> {
    /// Decoded text of the bulk-payment report.
    pub report_text: &'a str,
    /// Sheets of the beneficiary workbook, in workbook order.
    pub beneficiary_grids: &'a [Grid],
    /// Fee table sheet, when a fee file was provided.
    pub fee_grid: Option<&'a Grid>,
    /// Caller-supplied report metadata.
    pub metadata: ReportMetadata,
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Outcome of format detection over the parsed rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormatReport {
    pub fee_interleaved: bool,
    /// Rows that are real payments (fee pseudo-rows excluded).
    pub principal_count: usize,
    /// 0–100.
    pub confidence: u8,
    pub evidence: Vec<String>,
}

// ---------------------------------------------------------------------------
// Beneficiary mapping
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingStrategy {
    /// No transactions to map.
    None,
    /// No beneficiary data; placeholders only.
    Fallback,
    /// Equal counts; pair by position.
    OneToOne,
    /// More beneficiaries than transactions; match on phone number.
    ByPhone,
    /// More transactions than beneficiaries, but few unique recipients;
    /// every transaction sharing a phone gets that phone's name.
    WithDuplication,
    /// More transactions than beneficiaries; names recycle by index.
    Partial,
}

impl std::fmt::Display for MappingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Fallback => write!(f, "fallback"),
            Self::OneToOne => write!(f, "one_to_one"),
            Self::ByPhone => write!(f, "by_phone"),
            Self::WithDuplication => write!(f, "with_duplication"),
            Self::Partial => write!(f, "partial"),
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct RunMeta {
    pub config_name: String,
    pub engine_version: String,
    pub strategy: MappingStrategy,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconOutput {
    pub meta: RunMeta,
    pub format: FormatReport,
    pub rows: Vec<ReconciledRow>,
    pub summary: ReportSummary,
    pub metadata: ReportMetadata,
    pub preamble: ReportPreamble,
    pub warnings: Vec<ReconWarning>,
}
