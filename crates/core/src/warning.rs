use std::fmt;

use serde::Serialize;

/// Non-fatal anomalies observed during a run. Carried in the engine output;
/// the caller decides whether to proceed, prompt a human, or abort.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReconWarning {
    /// Strict line parsing found nothing; the relaxed CSV path was used.
    ParseFallback,
    /// Rows dropped because the amount did not parse or was non-positive.
    RowsDropped { count: usize },
    /// Beneficiary table empty or unreadable; placeholder names assigned.
    NoBeneficiaryData,
    /// A duplication or recycling strategy was engaged.
    AmbiguousMapping { strategy: String, detail: String },
    /// Placeholder beneficiary names were emitted.
    PlaceholdersUsed { count: usize },
    /// Fee table missing, empty, or malformed; default rate applied.
    FeeTableInvalid,
    /// Total fees exceed the alert share of the total amount.
    HighFeeRatio { ratio: f64 },
    /// The beneficiary table maps one phone number to conflicting names.
    ConflictingDuplicate { phone: String },
}

impl fmt::Display for ReconWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ParseFallback => write!(f, "strict parse found no rows; relaxed CSV fallback used"),
            Self::RowsDropped { count } => {
                write!(f, "{count} row(s) dropped (unparseable or non-positive amount)")
            }
            Self::NoBeneficiaryData => write!(f, "no beneficiary data; placeholders assigned"),
            Self::AmbiguousMapping { strategy, detail } => {
                write!(f, "ambiguous mapping ({strategy}): {detail}")
            }
            Self::PlaceholdersUsed { count } => {
                write!(f, "{count} placeholder beneficiary name(s) emitted")
            }
            Self::FeeTableInvalid => write!(f, "fee table missing or invalid; default rate used"),
            Self::HighFeeRatio { ratio } => {
                write!(f, "total fees are {:.1}% of total amount", ratio * 100.0)
            }
            Self::ConflictingDuplicate { phone } => {
                write!(f, "phone {phone} maps to conflicting beneficiary names")
            }
        }
    }
}
