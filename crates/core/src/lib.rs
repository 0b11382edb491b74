//! `payrec-core` — Core types shared by the io, engine, and cli crates.
//!
//! Plain value types only: no file IO, no parsing logic.

pub mod grid;
pub mod model;
pub mod warning;

pub use grid::Grid;
pub use model::{
    BandFee, BeneficiaryEntry, FeeRule, ReconciledRow, ReportMetadata, ReportPreamble,
    ReportSummary, TransactionRecord, RECORD_FIELD_COUNT,
};
pub use warning::ReconWarning;
