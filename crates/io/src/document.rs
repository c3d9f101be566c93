use std::path::Path;

use serde::Serialize;

use crate::decode::decode_bytes;
use crate::error::LoadError;

// ---------------------------------------------------------------------------
// Records + tables
// ---------------------------------------------------------------------------

/// One row of a tabular source: ordered field-name → raw text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    /// Whether a field with this exact name exists (empty or not).
    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|(k, _)| k == name)
    }

    /// Raw value of the first field with this exact name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Trimmed value of a field, or `None` when the field is absent or blank.
    pub fn non_empty(&self, name: &str) -> Option<&str> {
        self.get(name).map(str::trim).filter(|v| !v.is_empty())
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(_, v)| v.as_str())
    }

    /// All values joined with single spaces; the string token matching runs on.
    pub fn search_text(&self) -> String {
        self.values().collect::<Vec<_>>().join(" ")
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Header row plus data rows. Every record carries one field per header, in
/// header order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub records: Vec<Record>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            records: Vec::new(),
        }
    }

    /// Append a row of raw cells. Missing trailing cells become empty strings;
    /// cells beyond the header width get `Unnamed: N` columns.
    pub fn push_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut cells: Vec<String> = cells.into_iter().map(Into::into).collect();
        while self.headers.len() < cells.len() {
            let idx = self.headers.len();
            self.headers.push(format!("Unnamed: {idx}"));
            for record in &mut self.records {
                record.push(format!("Unnamed: {idx}"), String::new());
            }
        }
        cells.resize(self.headers.len(), String::new());

        self.records.push(Record {
            fields: self.headers.iter().cloned().zip(cells).collect(),
        });
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Make header names unique and non-blank: blanks become `Unnamed: N`,
/// repeats get `.1`, `.2`, ... suffixes.
pub fn unique_headers<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for (idx, name) in raw.into_iter().enumerate() {
        let name = name.as_ref().trim();
        let base = if name.is_empty() {
            format!("Unnamed: {idx}")
        } else {
            name.to_string()
        };

        let mut candidate = base.clone();
        let mut n = 1;
        while out.contains(&candidate) {
            candidate = format!("{base}.{n}");
            n += 1;
        }
        out.push(candidate);
    }
    out
}

// ---------------------------------------------------------------------------
// Source documents
// ---------------------------------------------------------------------------

/// An uploaded document: a display name and its raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl SourceDocument {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk; the document name is the file name.
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let bytes = std::fs::read(path).map_err(|e| LoadError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { name, bytes })
    }

    pub fn kind(&self) -> DocumentKind {
        DocumentKind::from_name(&self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpreadsheetFormat {
    Xlsx,
    Xls,
}

/// How a document is read, decided by its file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Delimited text. `None` means sniff the delimiter.
    Delimited(Option<u8>),
    Spreadsheet(SpreadsheetFormat),
    /// Anything else is scanned line by line.
    Text,
}

impl DocumentKind {
    pub fn from_name(name: &str) -> Self {
        let ext = Path::new(name)
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "csv" => Self::Delimited(None),
            "tsv" => Self::Delimited(Some(b'\t')),
            "xlsx" | "xlsm" => Self::Spreadsheet(SpreadsheetFormat::Xlsx),
            "xls" => Self::Spreadsheet(SpreadsheetFormat::Xls),
            _ => Self::Text,
        }
    }

    pub fn is_tabular(&self) -> bool {
        !matches!(self, Self::Text)
    }
}

/// Parsed document contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentContent {
    Table(Table),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub name: String,
    pub content: DocumentContent,
}

impl Document {
    pub fn as_table(&self) -> Option<&Table> {
        match &self.content {
            DocumentContent::Table(t) => Some(t),
            DocumentContent::Text(_) => None,
        }
    }
}

/// Decode and parse one uploaded document according to its kind.
pub fn load(source: &SourceDocument) -> Result<Document, LoadError> {
    let content = match source.kind() {
        DocumentKind::Delimited(delimiter) => {
            let decoded = decode_bytes(&source.bytes);
            let delimiter = delimiter.unwrap_or_else(|| crate::csv::sniff_delimiter(&decoded.text));
            let table = crate::csv::import_from_string(&decoded.text, delimiter).map_err(|message| {
                LoadError::Csv {
                    document: source.name.clone(),
                    message,
                }
            })?;
            if table.headers.is_empty() {
                return Err(LoadError::Empty {
                    document: source.name.clone(),
                });
            }
            DocumentContent::Table(table)
        }
        DocumentKind::Spreadsheet(format) => {
            let table = crate::xlsx::import_from_bytes(&source.bytes, format).map_err(|message| {
                LoadError::Spreadsheet {
                    document: source.name.clone(),
                    message,
                }
            })?;
            if table.headers.is_empty() {
                return Err(LoadError::Empty {
                    document: source.name.clone(),
                });
            }
            DocumentContent::Table(table)
        }
        DocumentKind::Text => DocumentContent::Text(decode_bytes(&source.bytes).text),
    };

    Ok(Document {
        name: source.name.clone(),
        content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_lookup_distinguishes_absent_and_blank() {
        let r = Record::from_pairs([("Date", "2024-01-02"), ("Time", "   ")]);
        assert!(r.contains("Time"));
        assert_eq!(r.get("Time"), Some("   "));
        assert_eq!(r.non_empty("Time"), None);
        assert_eq!(r.non_empty("Date"), Some("2024-01-02"));
        assert_eq!(r.get("Missing"), None);
    }

    #[test]
    fn search_text_joins_values_in_order() {
        let r = Record::from_pairs([("a", "x"), ("b", ""), ("c", "z")]);
        assert_eq!(r.search_text(), "x  z");
    }

    #[test]
    fn push_row_pads_and_widens() {
        let mut t = Table::new(vec!["a".into(), "b".into()]);
        t.push_row(["1"]);
        t.push_row(["1", "2", "3"]);
        assert_eq!(t.headers, vec!["a", "b", "Unnamed: 2"]);
        assert_eq!(t.records[0].get("b"), Some(""));
        assert_eq!(t.records[0].get("Unnamed: 2"), Some(""));
        assert_eq!(t.records[1].get("Unnamed: 2"), Some("3"));
    }

    #[test]
    fn headers_are_made_unique() {
        let h = unique_headers(["id", "", "id", "id"]);
        assert_eq!(h, vec!["id", "Unnamed: 1", "id.1", "id.2"]);
    }

    #[test]
    fn kind_from_extension() {
        assert_eq!(DocumentKind::from_name("a.CSV"), DocumentKind::Delimited(None));
        assert_eq!(DocumentKind::from_name("a.tsv"), DocumentKind::Delimited(Some(b'\t')));
        assert_eq!(
            DocumentKind::from_name("report.xlsx"),
            DocumentKind::Spreadsheet(SpreadsheetFormat::Xlsx)
        );
        assert_eq!(DocumentKind::from_name("server.log"), DocumentKind::Text);
        assert_eq!(DocumentKind::from_name("noext"), DocumentKind::Text);
        assert!(!DocumentKind::Text.is_tabular());
    }

    #[test]
    fn load_text_document() {
        let doc = load(&SourceDocument::new("app.log", "line one\nline two\n")).unwrap();
        assert_eq!(doc.name, "app.log");
        assert_eq!(doc.content, DocumentContent::Text("line one\nline two\n".into()));
        assert!(doc.as_table().is_none());
    }

    #[test]
    fn load_csv_document() {
        let doc = load(&SourceDocument::new("x.csv", "id,Date\nA,2024-01-01\n")).unwrap();
        let table = doc.as_table().unwrap();
        assert_eq!(table.headers, vec!["id", "Date"]);
        assert_eq!(table.records[0].get("id"), Some("A"));
    }

    #[test]
    fn empty_csv_is_an_error() {
        let err = load(&SourceDocument::new("empty.csv", "")).unwrap_err();
        assert_eq!(err, LoadError::Empty { document: "empty.csv".into() });
        assert_eq!(err.document(), "empty.csv");
    }

    #[test]
    fn from_path_reads_name_and_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.txt");
        std::fs::write(&path, "payout_x").unwrap();
        let doc = SourceDocument::from_path(&path).unwrap();
        assert_eq!(doc.name, "tokens.txt");
        assert_eq!(doc.bytes, b"payout_x");
    }

    #[test]
    fn from_path_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = SourceDocument::from_path(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
