use std::fmt;

use support_console_io::LoadError;

/// Hard failures. Per-document load problems are not errors at this level;
/// they travel as warnings inside a successful result.
#[derive(Debug)]
pub enum TokenError {
    /// Prefix or pattern configuration that cannot be used for matching.
    InvalidPattern(String),
    /// Preset name not present in the config.
    UnknownPreset(String),
    /// No documents were supplied.
    NoInput,
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad hex length, blank field name, etc.).
    ConfigValidation(String),
    /// The log sorter was given a document without rows and columns.
    NotTabular { document: String },
    /// Single-document operation whose only input failed to load.
    Load(LoadError),
    /// Export rendering failure.
    Export(String),
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPattern(msg) => write!(f, "invalid pattern: {msg}"),
            Self::UnknownPreset(name) => write!(f, "unknown preset: {name}"),
            Self::NoInput => write!(f, "no input documents provided"),
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::NotTabular { document } => {
                write!(f, "'{document}' is not a tabular file (expected .csv, .tsv, .xlsx or .xls)")
            }
            Self::Load(err) => write!(f, "{err}"),
            Self::Export(msg) => write!(f, "export error: {msg}"),
        }
    }
}

impl std::error::Error for TokenError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Load(err) => Some(err),
            _ => None,
        }
    }
}

impl From<LoadError> for TokenError {
    fn from(err: LoadError) -> Self {
        Self::Load(err)
    }
}
