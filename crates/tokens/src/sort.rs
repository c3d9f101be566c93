//! Log time sorter: reorder the rows of a tabular log newest first.

use support_console_io::{load, SourceDocument, Table};

use crate::error::TokenError;
use crate::model::Timestamp;
use crate::timestamp::TimestampNormalizer;

/// Rows of a table reordered by normalized time, newest first.
#[derive(Debug, Clone, PartialEq)]
pub struct SortedTable {
    pub table: Table,
    /// Normalized time of each row, parallel to `table.records`.
    pub timestamps: Vec<Timestamp>,
}

impl SortedTable {
    pub fn unknown_count(&self) -> usize {
        self.timestamps.iter().filter(|t| !t.is_known()).count()
    }

    /// Sorted rows as CSV, original header row first.
    pub fn to_csv(&self) -> Result<String, TokenError> {
        support_console_io::csv::export_to_string(&self.table, b',', true)
            .map_err(TokenError::Export)
    }
}

/// Sort rows descending by timestamp. Rows without a resolvable time go last;
/// rows with equal times keep their original order. Columns are untouched.
pub fn sort_table(table: &Table, normalizer: &TimestampNormalizer) -> SortedTable {
    let mut keyed: Vec<(Timestamp, usize)> = table
        .records
        .iter()
        .enumerate()
        .map(|(idx, record)| (normalizer.normalize(record), idx))
        .collect();

    keyed.sort_by(|a, b| b.0.rank_cmp(&a.0));

    let mut sorted = Table::new(table.headers.clone());
    let mut timestamps = Vec::with_capacity(keyed.len());
    for (ts, idx) in keyed {
        sorted.records.push(table.records[idx].clone());
        timestamps.push(ts);
    }

    SortedTable {
        table: sorted,
        timestamps,
    }
}

/// Load a single tabular document and sort it.
pub fn sort_document(
    source: &SourceDocument,
    normalizer: &TimestampNormalizer,
) -> Result<SortedTable, TokenError> {
    if !source.kind().is_tabular() {
        return Err(TokenError::NotTabular {
            document: source.name.clone(),
        });
    }

    let doc = load(source)?;
    let table = doc.as_table().ok_or_else(|| TokenError::NotTabular {
        document: source.name.clone(),
    })?;

    let sorted = sort_table(table, normalizer);
    log::debug!(
        "sorted {} rows of '{}' ({} without a timestamp)",
        sorted.table.len(),
        source.name,
        sorted.unknown_count()
    );
    Ok(sorted)
}
