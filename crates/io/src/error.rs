use std::fmt;

/// A document that could not be turned into rows or lines.
///
/// Always scoped to one document: callers downgrade it to a warning and keep
/// processing the rest of the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// Tabular document with no header row at all.
    Empty { document: String },
    /// Delimited-text parse failure.
    Csv { document: String, message: String },
    /// Spreadsheet container or sheet could not be read.
    Spreadsheet { document: String, message: String },
    /// Reading the file from disk failed.
    Io { path: String, message: String },
}

impl LoadError {
    /// Name of the document (or path) the error belongs to.
    pub fn document(&self) -> &str {
        match self {
            Self::Empty { document }
            | Self::Csv { document, .. }
            | Self::Spreadsheet { document, .. } => document,
            Self::Io { path, .. } => path,
        }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { document } => write!(f, "'{document}': no columns to parse"),
            Self::Csv { document, message } => {
                write!(f, "'{document}': cannot parse delimited text: {message}")
            }
            Self::Spreadsheet { document, message } => {
                write!(f, "'{document}': cannot read spreadsheet: {message}")
            }
            Self::Io { path, message } => write!(f, "IO error reading '{path}': {message}"),
        }
    }
}

impl std::error::Error for LoadError {}
