//! Renderings of an extraction or reconciliation for download and paste.

use support_console_io::csv::export_to_string;
use support_console_io::Table;

use crate::error::TokenError;
use crate::model::Extraction;

pub const TIME_COLUMN: &str = "GMT Time";
pub const TOKEN_COLUMN: &str = "token";

fn token_table(extraction: &Extraction) -> Table {
    if extraction.include_time {
        let mut table = Table::new(vec![TIME_COLUMN.to_string(), TOKEN_COLUMN.to_string()]);
        for t in &extraction.tokens {
            table.push_row([t.time.clone().unwrap_or_default(), t.token.clone()]);
        }
        table
    } else {
        let mut table = Table::new(vec![TOKEN_COLUMN.to_string()]);
        for t in &extraction.tokens {
            table.push_row([t.token.clone()]);
        }
        table
    }
}

/// CSV with a header row: `GMT Time,token` or just `token`.
pub fn to_csv(extraction: &Extraction) -> Result<String, TokenError> {
    export_to_string(&token_table(extraction), b',', true).map_err(TokenError::Export)
}

/// Plain-text download: `time|token` lines without a header when time was
/// requested, otherwise one token per line.
pub fn to_pipe_text(extraction: &Extraction) -> Result<String, TokenError> {
    if extraction.include_time {
        export_to_string(&token_table(extraction), b'|', false).map_err(TokenError::Export)
    } else {
        Ok(extraction.token_strings().collect::<Vec<_>>().join("\n"))
    }
}

/// Comma-separated SQL string literals, e.g. `'a', 'b'`, for pasting into an
/// `IN (...)` clause.
pub fn to_sql_list<'a, I>(tokens: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    tokens
        .into_iter()
        .map(|t| format!("'{}'", t.replace('\'', "''")))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn to_json<T: serde::Serialize>(value: &T) -> Result<String, TokenError> {
    serde_json::to_string_pretty(value).map_err(|e| TokenError::Export(e.to_string()))
}
