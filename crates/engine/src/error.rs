use std::fmt;

#[derive(Debug)]
pub enum EngineError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad rate, zero field minimum, etc.).
    ConfigValidation(String),
    /// The bulk report yielded zero usable rows on every parse path.
    MalformedInput { detail: String },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::MalformedInput { detail } => {
                write!(f, "bulk report is unusable: {detail}")
            }
        }
    }
}

impl std::error::Error for EngineError {}
