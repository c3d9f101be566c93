// Delimited text (CSV/TSV) import and export

use crate::document::{unique_headers, Table};

// Ascending preference: on a full tie the last candidate wins
const DELIMITER_CANDIDATES: [u8; 4] = [b'|', b';', b'\t', b','];
const SNIFF_LINES: usize = 10;

/// Guess the field delimiter of a log export from its first non-blank lines.
///
/// A candidate only counts if it splits the header row. Among those, the one
/// whose header width is repeated by the most sample rows wins, then the
/// wider header. Falls back to comma.
pub fn sniff_delimiter(content: &str) -> u8 {
    let sample: Vec<&str> = content
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(SNIFF_LINES)
        .collect();
    let Some((header, rows)) = sample.split_first() else {
        return b',';
    };

    DELIMITER_CANDIDATES
        .iter()
        .filter_map(|&delim| {
            let width = field_count(header, delim);
            if width < 2 {
                return None;
            }
            let agreeing = rows.iter().filter(|r| field_count(r, delim) == width).count();
            Some((agreeing, width, delim))
        })
        .max_by_key(|&(agreeing, width, _)| (agreeing, width))
        .map_or(b',', |(_, _, delim)| delim)
}

fn field_count(line: &str, delimiter: u8) -> usize {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes())
        .records()
        .next()
        .and_then(|r| r.ok())
        .map(|r| r.len())
        .unwrap_or(1)
}

/// Parse delimited text into a table. The first record is the header row;
/// ragged rows are padded or widened rather than rejected.
pub fn import_from_string(content: &str, delimiter: u8) -> Result<Table, String> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = reader.records();

    let header = match records.next() {
        Some(result) => result.map_err(|e| e.to_string())?,
        None => return Ok(Table::default()),
    };
    let mut table = Table::new(unique_headers(header.iter()));

    for result in records {
        let record = result.map_err(|e| e.to_string())?;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        table.push_row(record.iter());
    }

    Ok(table)
}

/// Render a table back to delimited text, optionally with the header row.
pub fn export_to_string(table: &Table, delimiter: u8, with_header: bool) -> Result<String, String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_writer(Vec::new());

    if with_header {
        writer.write_record(&table.headers).map_err(|e| e.to_string())?;
    }
    for record in &table.records {
        writer
            .write_record(record.values())
            .map_err(|e| e.to_string())?;
    }

    let bytes = writer.into_inner().map_err(|e| e.to_string())?;
    String::from_utf8(bytes).map_err(|e| e.to_string())
}
