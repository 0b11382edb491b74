use std::fmt;

#[derive(Debug)]
pub enum IoError {
    /// File could not be read.
    Read { path: String, source: String },
    /// Workbook could not be opened or a sheet could not be ranged.
    Workbook { path: String, source: String },
    /// CSV write error.
    Csv(String),
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, source } => write!(f, "cannot read {path}: {source}"),
            Self::Workbook { path, source } => write!(f, "cannot open workbook {path}: {source}"),
            Self::Csv(msg) => write!(f, "CSV write error: {msg}"),
        }
    }
}

impl std::error::Error for IoError {}
